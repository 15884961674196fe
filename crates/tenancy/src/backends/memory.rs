//! In-memory backend.
//!
//! Keeps every record in `parking_lot::RwLock`-guarded maps. Nothing is
//! persisted; intended for development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::access::Where;
use crate::core::{ContentStore, TenantStore};
use crate::error::{DocumentError, StorageResult, TenantError};
use crate::tenant::{Tenant, TenantId, User, UserRecord, normalize_host};
use crate::types::{Collection, Document, DocumentPatch, Page, Pagination};

/// Storage backend holding all data in process memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tenants: RwLock<HashMap<TenantId, Tenant>>,
    users: RwLock<HashMap<String, UserRecord>>,
    documents: RwLock<HashMap<(Collection, String), Document>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TenantStore for MemoryBackend {
    async fn tenant(&self, id: TenantId) -> StorageResult<Option<Tenant>> {
        Ok(self.tenants.read().get(&id).cloned())
    }

    async fn tenants_by_ids(&self, ids: &[TenantId]) -> StorageResult<Vec<Tenant>> {
        let tenants = self.tenants.read();
        Ok(ids.iter().filter_map(|id| tenants.get(id).cloned()).collect())
    }

    async fn tenant_by_domain(&self, host: &str) -> StorageResult<Option<Tenant>> {
        let host = normalize_host(host);
        if host.is_empty() {
            return Ok(None);
        }
        Ok(self
            .tenants
            .read()
            .values()
            .find(|t| t.domains.iter().any(|d| d.domain == host))
            .cloned())
    }

    async fn tenant_by_api_key(&self, key: &str) -> StorageResult<Option<Tenant>> {
        Ok(self
            .tenants
            .read()
            .values()
            .find(|t| t.api_key.as_deref() == Some(key))
            .cloned())
    }

    async fn user(&self, id: &str) -> StorageResult<Option<User>> {
        Ok(self.users.read().get(id).map(|r| r.user.clone()))
    }

    async fn user_by_email(&self, email: &str) -> StorageResult<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|r| r.user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn put_tenant(&self, tenant: Tenant) -> StorageResult<Tenant> {
        let mut tenants = self.tenants.write();
        for other in tenants.values().filter(|t| t.id != tenant.id) {
            if let Some(taken) = tenant
                .domains
                .iter()
                .find(|d| other.domains.iter().any(|o| o.domain == d.domain))
            {
                return Err(TenantError::DomainTaken {
                    domain: taken.domain.clone(),
                    owner: other.id,
                }
                .into());
            }
            if tenant.api_key.is_some() && tenant.api_key == other.api_key {
                return Err(TenantError::ApiKeyTaken { owner: other.id }.into());
            }
        }
        tenants.insert(tenant.id, tenant.clone());
        Ok(tenant)
    }

    async fn put_user(&self, record: UserRecord) -> StorageResult<User> {
        {
            let tenants = self.tenants.read();
            if let Some(missing) = record
                .user
                .tenants
                .iter()
                .find(|m| !tenants.contains_key(&m.tenant))
            {
                return Err(TenantError::UnknownTenant {
                    tenant_id: missing.tenant,
                }
                .into());
            }
        }
        let user = record.user.clone();
        self.users.write().insert(user.id.clone(), record);
        Ok(user)
    }
}

#[async_trait]
impl ContentStore for MemoryBackend {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn query(
        &self,
        collection: Collection,
        filter: Option<&Where>,
        pagination: Pagination,
    ) -> StorageResult<Page<Document>> {
        let documents = self.documents.read();
        let mut matching: Vec<&Document> = documents
            .values()
            .filter(|d| d.collection == collection)
            .filter(|d| filter.is_none_or(|f| f.matches(d)))
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        let total_docs = matching.len();
        let docs = matching
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.limit)
            .cloned()
            .collect();

        Ok(Page {
            docs,
            total_docs,
            limit: pagination.limit,
            page: pagination.page,
        })
    }

    async fn get(&self, collection: Collection, id: &str) -> StorageResult<Option<Document>> {
        Ok(self
            .documents
            .read()
            .get(&(collection, id.to_string()))
            .cloned())
    }

    async fn create(&self, document: Document) -> StorageResult<Document> {
        let key = (document.collection, document.id.clone());
        let mut documents = self.documents.write();
        if documents.contains_key(&key) {
            return Err(DocumentError::AlreadyExists {
                collection: document.collection,
                id: document.id,
            }
            .into());
        }
        documents.insert(key, document.clone());
        Ok(document)
    }

    async fn update(&self, collection: Collection, id: &str, patch: &DocumentPatch) -> StorageResult<Document> {
        let mut documents = self.documents.write();
        let doc = documents
            .get_mut(&(collection, id.to_string()))
            .ok_or_else(|| DocumentError::NotFound {
                collection,
                id: id.to_string(),
            })?;
        patch.apply(doc);
        Ok(doc.clone())
    }

    async fn delete(&self, collection: Collection, id: &str) -> StorageResult<()> {
        self.documents
            .write()
            .remove(&(collection, id.to_string()))
            .map(|_| ())
            .ok_or_else(|| {
                DocumentError::NotFound {
                    collection,
                    id: id.to_string(),
                }
                .into()
            })
    }
}
