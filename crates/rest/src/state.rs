//! Application state for the Meridian API.
//!
//! This module defines the shared application state that is available to all
//! request handlers: the storage backend, configuration, and the policy
//! objects derived from it once at startup.

use std::collections::HashMap;
use std::sync::Arc;

use meridian_signature::SignatureVerifier;
use meridian_tenancy::access::{CollectionAccess, DomainPolicy};
use meridian_tenancy::core::Storage;
use meridian_tenancy::types::Collection;

use crate::config::ServerConfig;
use crate::session::SessionManager;

/// Shared application state for the API.
///
/// # Type Parameters
///
/// * `S` - The storage backend type (must implement [`Storage`])
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use meridian_rest::{AppState, ServerConfig};
/// use meridian_tenancy::backends::MemoryBackend;
///
/// let state = AppState::new(Arc::new(MemoryBackend::new()), ServerConfig::for_testing());
/// assert_eq!(state.tenant_cookie_name(), "meridian-tenant");
/// ```
pub struct AppState<S> {
    /// The storage backend.
    storage: Arc<S>,

    /// Server configuration.
    config: Arc<ServerConfig>,

    /// Per-collection access rules.
    access: Arc<HashMap<Collection, CollectionAccess>>,

    sessions: SessionManager,
    verifier: SignatureVerifier,
    domain_policy: DomainPolicy,
}

// Manually implement Clone since S is wrapped in Arc and doesn't need to be Clone
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: Arc::clone(&self.config),
            access: Arc::clone(&self.access),
            sessions: self.sessions.clone(),
            verifier: self.verifier.clone(),
            domain_policy: self.domain_policy,
        }
    }
}

impl<S: Storage> AppState<S> {
    /// Creates a new AppState with the given storage and configuration.
    ///
    /// Every collection starts with its default access rules.
    pub fn new(storage: Arc<S>, config: ServerConfig) -> Self {
        let access = Collection::ALL
            .into_iter()
            .map(|c| (c, CollectionAccess::for_collection(c)))
            .collect();

        let sessions = SessionManager::new(config.session_secret(), config.session_ttl_secs);
        let verifier = SignatureVerifier::new(config.signature_secret())
            .with_ttl(config.signature_ttl_ms)
            .with_max_skew(config.signature_max_skew_ms);
        let domain_policy = DomainPolicy {
            allow_unconfigured: config.allow_unconfigured_domains,
        };

        Self {
            storage,
            config: Arc::new(config),
            access: Arc::new(access),
            sessions,
            verifier,
            domain_policy,
        }
    }

    /// Replaces the access rules of one collection.
    pub fn with_collection_access(mut self, rules: CollectionAccess) -> Self {
        Arc::make_mut(&mut self.access).insert(rules.collection(), rules);
        self
    }

    /// Returns a reference to the storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns a clone of the storage Arc.
    pub fn storage_arc(&self) -> Arc<S> {
        Arc::clone(&self.storage)
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the access rules of a collection.
    pub fn access(&self, collection: Collection) -> CollectionAccess {
        self.access
            .get(&collection)
            .cloned()
            .unwrap_or_else(|| CollectionAccess::for_collection(collection))
    }

    /// Returns the session manager.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Returns the machine request verifier.
    pub fn verifier(&self) -> &SignatureVerifier {
        &self.verifier
    }

    /// Returns the login domain policy.
    pub fn domain_policy(&self) -> DomainPolicy {
        self.domain_policy
    }

    /// Returns the name of the tenant scope cookie.
    pub fn tenant_cookie_name(&self) -> String {
        self.config.tenant_cookie_name()
    }
}
