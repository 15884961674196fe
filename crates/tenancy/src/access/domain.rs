//! Domain-based login restriction.
//!
//! A tenant user may only sign in to the admin UI from a domain one of
//! their tenants has tagged for CMS use.

use thiserror::Error;
use tracing::{debug, warn};

use crate::tenant::{Actor, Tenant, TenantId, normalize_host};

/// Rejection produced by [`DomainPolicy::check_login`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The request host is not among the actor's CMS domains.
    #[error("login from {host} is not permitted; allowed domains: {}", .allowed.join(", "))]
    NotPermitted {
        /// Normalized request host.
        host: String,
        /// CMS domains of the actor's tenants.
        allowed: Vec<String>,
    },

    /// None of the actor's tenants has a CMS domain configured.
    #[error("no CMS domains are configured for tenants {}", join_ids(.tenants))]
    NotConfigured {
        /// The actor's tenants.
        tenants: Vec<TenantId>,
    },
}

impl DomainError {
    /// HTTP status code for this error. Both variants are forbidden.
    pub fn status_code(&self) -> u16 {
        403
    }
}

fn join_ids(ids: &[TenantId]) -> String {
    if ids.is_empty() {
        return "(none)".to_string();
    }
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Policy applied after credentials have been verified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomainPolicy {
    /// Let users in when none of their tenants has a CMS domain configured.
    /// Defaults to `false` (fail closed).
    pub allow_unconfigured: bool,
}

impl DomainPolicy {
    /// Fail-closed policy.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Policy that admits users whose tenants have no CMS domain.
    pub fn permissive() -> Self {
        Self {
            allow_unconfigured: true,
        }
    }

    /// Checks that `actor` may sign in from `host`.
    ///
    /// `tenants` are the tenant records the actor belongs to. System users
    /// and machines are exempt.
    ///
    /// # Errors
    ///
    /// - [`DomainError::NotConfigured`] when no CMS domain exists for any of
    ///   the tenants and the policy is fail-closed.
    /// - [`DomainError::NotPermitted`] when `host` is not a CMS domain of
    ///   any of the tenants.
    pub fn check_login(&self, actor: &Actor, host: &str, tenants: &[Tenant]) -> Result<(), DomainError> {
        let user = match actor {
            Actor::TenantUser(user) => user,
            Actor::SystemUser(_) | Actor::TenantMachine { .. } => return Ok(()),
        };

        let member_of = user.tenant_ids();
        let mut allowed: Vec<String> = Vec::new();
        for tenant in tenants.iter().filter(|t| member_of.contains(&t.id)) {
            for domain in tenant.cms_domains() {
                if !allowed.iter().any(|d| d == domain) {
                    allowed.push(domain.to_string());
                }
            }
        }

        if allowed.is_empty() {
            warn!(
                user = %user.email,
                tenants = ?member_of,
                allow_unconfigured = self.allow_unconfigured,
                "No CMS domains configured for user's tenants"
            );
            if self.allow_unconfigured {
                return Ok(());
            }
            return Err(DomainError::NotConfigured { tenants: member_of });
        }

        let host = normalize_host(host);
        if allowed.contains(&host) {
            debug!(user = %user.email, host = %host, "Login domain permitted");
            Ok(())
        } else {
            warn!(user = %user.email, host = %host, allowed = ?allowed, "Login from non-CMS domain rejected");
            Err(DomainError::NotPermitted { host, allowed })
        }
    }
}
