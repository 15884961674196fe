//! Storage traits.
//!
//! [`TenantStore`] holds tenants and users, [`ContentStore`] holds the
//! documents of every collection. Backends implement both; the HTTP layer
//! only sees the combined [`Storage`] bound.

use async_trait::async_trait;

use crate::access::{ListAccess, Where};
use crate::error::StorageResult;
use crate::tenant::{Tenant, TenantId, User, UserRecord};
use crate::types::{Collection, Document, DocumentPatch, Page, Pagination};

/// Tenant and user records.
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Loads a tenant by ID.
    async fn tenant(&self, id: TenantId) -> StorageResult<Option<Tenant>>;

    /// Loads every existing tenant among `ids`. Unknown IDs are skipped.
    async fn tenants_by_ids(&self, ids: &[TenantId]) -> StorageResult<Vec<Tenant>>;

    /// Finds the tenant routing `host`. The host is normalized first, so
    /// case and a `:port` suffix do not matter.
    async fn tenant_by_domain(&self, host: &str) -> StorageResult<Option<Tenant>>;

    /// Finds the tenant owning a machine API key.
    async fn tenant_by_api_key(&self, key: &str) -> StorageResult<Option<Tenant>>;

    /// Loads a user by ID.
    async fn user(&self, id: &str) -> StorageResult<Option<User>>;

    /// Loads a user and its password hash by login email (case-insensitive).
    async fn user_by_email(&self, email: &str) -> StorageResult<Option<UserRecord>>;

    /// Inserts or replaces a tenant.
    ///
    /// # Errors
    ///
    /// * `TenantError::DomainTaken` - another tenant routes one of the domains
    /// * `TenantError::ApiKeyTaken` - another tenant uses the API key
    async fn put_tenant(&self, tenant: Tenant) -> StorageResult<Tenant>;

    /// Inserts or replaces a user.
    ///
    /// # Errors
    ///
    /// * `TenantError::UnknownTenant` - a membership names a missing tenant
    async fn put_user(&self, record: UserRecord) -> StorageResult<User>;
}

/// Documents of every collection.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Returns a human-readable name for this storage backend.
    fn backend_name(&self) -> &'static str;

    /// Lists documents of a collection visible under `access`.
    ///
    /// [`ListAccess::Denied`] returns an empty page without querying the
    /// backend. With `published_only`, unpublished documents are excluded.
    async fn find(
        &self,
        collection: Collection,
        access: &ListAccess,
        published_only: bool,
        pagination: Pagination,
    ) -> StorageResult<Page<Document>> {
        let access = if published_only {
            access.clone().restrict(Where::published())
        } else {
            access.clone()
        };

        match access {
            ListAccess::Denied => Ok(Page::empty(pagination)),
            ListAccess::Unrestricted => self.query(collection, None, pagination).await,
            ListAccess::Filtered(filter) => self.query(collection, Some(&filter), pagination).await,
        }
    }

    /// Backend query behind [`find`](Self::find). Results are ordered by
    /// creation time, then ID.
    async fn query(
        &self,
        collection: Collection,
        filter: Option<&Where>,
        pagination: Pagination,
    ) -> StorageResult<Page<Document>>;

    /// Loads a document by ID.
    async fn get(&self, collection: Collection, id: &str) -> StorageResult<Option<Document>>;

    /// Stores a new document.
    ///
    /// # Errors
    ///
    /// * `DocumentError::AlreadyExists` - the ID is taken in the collection
    async fn create(&self, document: Document) -> StorageResult<Document>;

    /// Applies a patch to a stored document.
    ///
    /// # Errors
    ///
    /// * `DocumentError::NotFound` - no such document
    async fn update(&self, collection: Collection, id: &str, patch: &DocumentPatch) -> StorageResult<Document>;

    /// Removes a document.
    ///
    /// # Errors
    ///
    /// * `DocumentError::NotFound` - no such document
    async fn delete(&self, collection: Collection, id: &str) -> StorageResult<()>;
}

/// A backend providing both tenant and content storage.
pub trait Storage: TenantStore + ContentStore {}

impl<T: TenantStore + ContentStore> Storage for T {}
