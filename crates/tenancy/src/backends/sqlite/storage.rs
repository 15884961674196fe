//! Storage trait implementations for the SQLite backend.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};

use crate::access::Where;
use crate::core::{ContentStore, TenantStore};
use crate::error::{BackendError, DocumentError, StorageError, StorageResult, TenantError};
use crate::tenant::{Tenant, TenantDomain, TenantId, TenantMembership, TenantRole, User, UserRecord, normalize_host};
use crate::types::{Collection, Document, DocumentPatch, Page, Pagination};

use super::SqliteBackend;
use super::query_builder::{SqlParam, compile};

fn internal_error(message: String) -> StorageError {
    StorageError::Backend(BackendError::Internal {
        backend_name: "sqlite".to_string(),
        message,
        source: None,
    })
}

fn query_error(message: String) -> StorageError {
    StorageError::Backend(BackendError::QueryError { message })
}

fn serialization_error(message: String) -> StorageError {
    StorageError::Backend(BackendError::SerializationError { message })
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| serialization_error(format!("Invalid timestamp '{}': {}", raw, e)))
}

/// Raw `documents` row before JSON and timestamp decoding.
struct DocumentRow {
    collection: String,
    id: String,
    tenant_id: i64,
    published: bool,
    data: String,
    created_at: String,
    updated_at: String,
}

const DOCUMENT_COLUMNS: &str = "collection, id, tenant_id, published, data, created_at, updated_at";

impl DocumentRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            collection: row.get(0)?,
            id: row.get(1)?,
            tenant_id: row.get(2)?,
            published: row.get(3)?,
            data: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn into_document(self) -> StorageResult<Document> {
        let collection: Collection = self.collection.parse()?;
        let data = serde_json::from_str(&self.data)
            .map_err(|e| serialization_error(format!("Failed to deserialize document: {}", e)))?;
        Ok(Document {
            id: self.id,
            collection,
            tenant: TenantId::new(self.tenant_id),
            published: self.published,
            data,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

impl SqliteBackend {
    fn load_tenant(conn: &Connection, id: TenantId) -> StorageResult<Option<Tenant>> {
        let row = conn
            .query_row(
                "SELECT name, slug, api_key FROM tenants WHERE id = ?1",
                params![id.get()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| query_error(format!("Failed to load tenant: {}", e)))?;

        let Some((name, slug, api_key)) = row else {
            return Ok(None);
        };

        let mut stmt = conn
            .prepare("SELECT domain, cms FROM tenant_domains WHERE tenant_id = ?1 ORDER BY rowid")
            .map_err(|e| query_error(format!("Failed to prepare domain query: {}", e)))?;
        let domains = stmt
            .query_map(params![id.get()], |row| {
                Ok(TenantDomain {
                    domain: row.get(0)?,
                    cms: row.get(1)?,
                })
            })
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(|e| query_error(format!("Failed to load tenant domains: {}", e)))?;

        Ok(Some(Tenant {
            id,
            name,
            slug,
            domains,
            api_key,
        }))
    }

    fn load_user(conn: &Connection, column: &str, value: &str) -> StorageResult<Option<UserRecord>> {
        let sql = format!(
            "SELECT id, email, system_user, password_hash FROM users WHERE {} = ?1",
            column
        );
        let row = conn
            .query_row(&sql, params![value], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .optional()
            .map_err(|e| query_error(format!("Failed to load user: {}", e)))?;

        let Some((id, email, system_user, password_hash)) = row else {
            return Ok(None);
        };

        let mut stmt = conn
            .prepare("SELECT tenant_id, role FROM user_tenants WHERE user_id = ?1 ORDER BY position")
            .map_err(|e| query_error(format!("Failed to prepare membership query: {}", e)))?;
        let raw = stmt
            .query_map(params![id], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(|e| query_error(format!("Failed to load memberships: {}", e)))?;

        let mut tenants = Vec::with_capacity(raw.len());
        for (tenant, role) in raw {
            let role: TenantRole = role
                .parse()
                .map_err(|e| serialization_error(format!("Invalid stored role: {}", e)))?;
            tenants.push(TenantMembership::new(tenant, role));
        }

        Ok(Some(UserRecord {
            user: User {
                id,
                email,
                system_user,
                tenants,
            },
            password_hash,
        }))
    }

    fn load_document(conn: &Connection, collection: Collection, id: &str) -> StorageResult<Option<Document>> {
        let sql = format!(
            "SELECT {} FROM documents WHERE collection = ?1 AND id = ?2",
            DOCUMENT_COLUMNS
        );
        conn.query_row(&sql, params![collection.slug(), id], DocumentRow::from_row)
            .optional()
            .map_err(|e| query_error(format!("Failed to load document: {}", e)))?
            .map(DocumentRow::into_document)
            .transpose()
    }
}

#[async_trait]
impl TenantStore for SqliteBackend {
    async fn tenant(&self, id: TenantId) -> StorageResult<Option<Tenant>> {
        let conn = self.get_connection()?;
        Self::load_tenant(&conn, id)
    }

    async fn tenants_by_ids(&self, ids: &[TenantId]) -> StorageResult<Vec<Tenant>> {
        let conn = self.get_connection()?;
        let mut tenants = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(tenant) = Self::load_tenant(&conn, *id)? {
                tenants.push(tenant);
            }
        }
        Ok(tenants)
    }

    async fn tenant_by_domain(&self, host: &str) -> StorageResult<Option<Tenant>> {
        let host = normalize_host(host);
        if host.is_empty() {
            return Ok(None);
        }
        let conn = self.get_connection()?;
        let owner: Option<i64> = conn
            .query_row(
                "SELECT tenant_id FROM tenant_domains WHERE domain = ?1",
                params![host],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| query_error(format!("Failed to look up domain: {}", e)))?;

        match owner {
            Some(id) => Self::load_tenant(&conn, TenantId::new(id)),
            None => Ok(None),
        }
    }

    async fn tenant_by_api_key(&self, key: &str) -> StorageResult<Option<Tenant>> {
        let conn = self.get_connection()?;
        let owner: Option<i64> = conn
            .query_row("SELECT id FROM tenants WHERE api_key = ?1", params![key], |row| row.get(0))
            .optional()
            .map_err(|e| query_error(format!("Failed to look up api key: {}", e)))?;

        match owner {
            Some(id) => Self::load_tenant(&conn, TenantId::new(id)),
            None => Ok(None),
        }
    }

    async fn user(&self, id: &str) -> StorageResult<Option<User>> {
        let conn = self.get_connection()?;
        Ok(Self::load_user(&conn, "id", id)?.map(|r| r.user))
    }

    async fn user_by_email(&self, email: &str) -> StorageResult<Option<UserRecord>> {
        let conn = self.get_connection()?;
        Self::load_user(&conn, "email", email)
    }

    async fn put_tenant(&self, tenant: Tenant) -> StorageResult<Tenant> {
        let mut conn = self.get_connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| internal_error(format!("Failed to begin transaction: {}", e)))?;

        for domain in &tenant.domains {
            let owner: Option<i64> = tx
                .query_row(
                    "SELECT tenant_id FROM tenant_domains WHERE domain = ?1 AND tenant_id != ?2",
                    params![domain.domain, tenant.id.get()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| query_error(format!("Failed to check domain: {}", e)))?;
            if let Some(owner) = owner {
                return Err(TenantError::DomainTaken {
                    domain: domain.domain.clone(),
                    owner: TenantId::new(owner),
                }
                .into());
            }
        }

        if let Some(key) = &tenant.api_key {
            let owner: Option<i64> = tx
                .query_row(
                    "SELECT id FROM tenants WHERE api_key = ?1 AND id != ?2",
                    params![key, tenant.id.get()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| query_error(format!("Failed to check api key: {}", e)))?;
            if let Some(owner) = owner {
                return Err(TenantError::ApiKeyTaken {
                    owner: TenantId::new(owner),
                }
                .into());
            }
        }

        tx.execute(
            "INSERT INTO tenants (id, name, slug, api_key) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, slug = excluded.slug, api_key = excluded.api_key",
            params![tenant.id.get(), tenant.name, tenant.slug, tenant.api_key],
        )
        .map_err(|e| internal_error(format!("Failed to upsert tenant: {}", e)))?;

        tx.execute("DELETE FROM tenant_domains WHERE tenant_id = ?1", params![tenant.id.get()])
            .map_err(|e| internal_error(format!("Failed to clear tenant domains: {}", e)))?;
        for domain in &tenant.domains {
            tx.execute(
                "INSERT INTO tenant_domains (domain, tenant_id, cms) VALUES (?1, ?2, ?3)",
                params![domain.domain, tenant.id.get(), domain.cms],
            )
            .map_err(|e| internal_error(format!("Failed to insert tenant domain: {}", e)))?;
        }

        tx.commit()
            .map_err(|e| internal_error(format!("Failed to commit tenant: {}", e)))?;
        Ok(tenant)
    }

    async fn put_user(&self, record: UserRecord) -> StorageResult<User> {
        let mut conn = self.get_connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| internal_error(format!("Failed to begin transaction: {}", e)))?;

        for membership in &record.user.tenants {
            let exists: bool = tx
                .query_row(
                    "SELECT 1 FROM tenants WHERE id = ?1",
                    params![membership.tenant.get()],
                    |_| Ok(true),
                )
                .optional()
                .map_err(|e| query_error(format!("Failed to check tenant: {}", e)))?
                .unwrap_or(false);
            if !exists {
                return Err(TenantError::UnknownTenant {
                    tenant_id: membership.tenant,
                }
                .into());
            }
        }

        let user = &record.user;
        tx.execute(
            "INSERT INTO users (id, email, system_user, password_hash) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET email = excluded.email, system_user = excluded.system_user,
                 password_hash = excluded.password_hash",
            params![user.id, user.email, user.system_user, record.password_hash],
        )
        .map_err(|e| internal_error(format!("Failed to upsert user: {}", e)))?;

        tx.execute("DELETE FROM user_tenants WHERE user_id = ?1", params![user.id])
            .map_err(|e| internal_error(format!("Failed to clear memberships: {}", e)))?;
        for (position, membership) in user.tenants.iter().enumerate() {
            tx.execute(
                "INSERT INTO user_tenants (user_id, position, tenant_id, role) VALUES (?1, ?2, ?3, ?4)",
                params![user.id, position as i64, membership.tenant.get(), membership.role.as_str()],
            )
            .map_err(|e| internal_error(format!("Failed to insert membership: {}", e)))?;
        }

        tx.commit()
            .map_err(|e| internal_error(format!("Failed to commit user: {}", e)))?;
        Ok(record.user)
    }
}

#[async_trait]
impl ContentStore for SqliteBackend {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn query(
        &self,
        collection: Collection,
        filter: Option<&Where>,
        pagination: Pagination,
    ) -> StorageResult<Page<Document>> {
        let conn = self.get_connection()?;

        let mut clause = "collection = ?".to_string();
        let mut bound = vec![SqlParam::Text(collection.slug().to_string())];
        if let Some(filter) = filter {
            let fragment = compile(filter);
            clause = format!("{} AND ({})", clause, fragment.sql);
            bound.extend(fragment.params);
        }

        let total: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM documents WHERE {}", clause),
                params_from_iter(bound.iter()),
                |row| row.get(0),
            )
            .map_err(|e| query_error(format!("Failed to count documents: {}", e)))?;

        let sql = format!(
            "SELECT {} FROM documents WHERE {} ORDER BY created_at, id LIMIT ? OFFSET ?",
            DOCUMENT_COLUMNS, clause
        );
        bound.push(SqlParam::Integer(i64::try_from(pagination.limit).unwrap_or(i64::MAX)));
        bound.push(SqlParam::Integer(i64::try_from(pagination.offset()).unwrap_or(i64::MAX)));

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| query_error(format!("Failed to prepare document query: {}", e)))?;
        let rows = stmt
            .query_map(params_from_iter(bound.iter()), DocumentRow::from_row)
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(|e| query_error(format!("Failed to query documents: {}", e)))?;

        let docs = rows
            .into_iter()
            .map(DocumentRow::into_document)
            .collect::<StorageResult<Vec<_>>>()?;

        Ok(Page {
            docs,
            total_docs: total as usize,
            limit: pagination.limit,
            page: pagination.page,
        })
    }

    async fn get(&self, collection: Collection, id: &str) -> StorageResult<Option<Document>> {
        let conn = self.get_connection()?;
        Self::load_document(&conn, collection, id)
    }

    async fn create(&self, document: Document) -> StorageResult<Document> {
        let conn = self.get_connection()?;

        if Self::load_document(&conn, document.collection, &document.id)?.is_some() {
            return Err(DocumentError::AlreadyExists {
                collection: document.collection,
                id: document.id,
            }
            .into());
        }

        let data = serde_json::to_string(&document.data)
            .map_err(|e| serialization_error(format!("Failed to serialize document: {}", e)))?;

        conn.execute(
            "INSERT INTO documents (collection, id, tenant_id, published, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                document.collection.slug(),
                document.id,
                document.tenant.get(),
                document.published,
                data,
                format_timestamp(&document.created_at),
                format_timestamp(&document.updated_at),
            ],
        )
        .map_err(|e| internal_error(format!("Failed to insert document: {}", e)))?;

        Ok(document)
    }

    async fn update(&self, collection: Collection, id: &str, patch: &DocumentPatch) -> StorageResult<Document> {
        let conn = self.get_connection()?;

        let mut document = Self::load_document(&conn, collection, id)?.ok_or_else(|| DocumentError::NotFound {
            collection,
            id: id.to_string(),
        })?;
        patch.apply(&mut document);

        let data = serde_json::to_string(&document.data)
            .map_err(|e| serialization_error(format!("Failed to serialize document: {}", e)))?;

        conn.execute(
            "UPDATE documents SET published = ?1, data = ?2, updated_at = ?3
             WHERE collection = ?4 AND id = ?5",
            params![
                document.published,
                data,
                format_timestamp(&document.updated_at),
                collection.slug(),
                id,
            ],
        )
        .map_err(|e| internal_error(format!("Failed to update document: {}", e)))?;

        Ok(document)
    }

    async fn delete(&self, collection: Collection, id: &str) -> StorageResult<()> {
        let conn = self.get_connection()?;
        let removed = conn
            .execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection.slug(), id],
            )
            .map_err(|e| internal_error(format!("Failed to delete document: {}", e)))?;

        if removed == 0 {
            return Err(DocumentError::NotFound {
                collection,
                id: id.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::ListAccess;
    use serde_json::json;

    async fn seeded() -> SqliteBackend {
        let backend = SqliteBackend::in_memory().unwrap();
        backend.init_schema().unwrap();
        backend
            .put_tenant(
                Tenant::new(7, "Acme", "acme")
                    .with_domain(TenantDomain::cms("cms.acme.test"))
                    .with_domain(TenantDomain::public("acme.test"))
                    .with_api_key("acme-key"),
            )
            .await
            .unwrap();
        backend.put_tenant(Tenant::new(8, "Other", "other")).await.unwrap();
        for (tenant, slug, published) in [(7, "a", true), (7, "b", false), (8, "c", true)] {
            let mut doc = Document::new(Collection::Posts, tenant, json!({"slug": slug})).with_id(slug);
            doc.published = published;
            backend.create(doc).await.unwrap();
        }
        backend
    }

    #[tokio::test]
    async fn test_tenant_round_trip() {
        let backend = seeded().await;
        let tenant = backend.tenant(TenantId::new(7)).await.unwrap().unwrap();
        assert_eq!(tenant.slug, "acme");
        assert_eq!(tenant.domains.len(), 2);
        assert!(tenant.domains[0].cms);
        assert_eq!(tenant.api_key.as_deref(), Some("acme-key"));

        let by_host = backend.tenant_by_domain("ACME.test:8080").await.unwrap().unwrap();
        assert_eq!(by_host.id, TenantId::new(7));
        assert!(backend.tenant_by_api_key("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_domain_conflict() {
        let backend = seeded().await;
        let err = backend
            .put_tenant(Tenant::new(8, "Other", "other").with_domain(TenantDomain::cms("acme.test")))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Tenant(TenantError::DomainTaken { .. })));
    }

    #[tokio::test]
    async fn test_user_round_trip() {
        let backend = seeded().await;
        let user = User::new("u1", "Ed@Acme.test")
            .with_membership(7, TenantRole::Editor)
            .with_membership(8, TenantRole::Viewer);
        backend
            .put_user(UserRecord {
                user: user.clone(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(backend.user("u1").await.unwrap(), Some(user));
        let record = backend.user_by_email("ed@acme.test").await.unwrap().unwrap();
        assert_eq!(record.password_hash, "hash");
        assert_eq!(record.user.tenants[1].role, TenantRole::Viewer);
    }

    #[tokio::test]
    async fn test_find_with_filters() {
        let backend = seeded().await;
        let pagination = Pagination::default();

        let acme = ListAccess::Filtered(Where::tenant_in(&[TenantId::new(7)]));
        let page = backend.find(Collection::Posts, &acme, false, pagination).await.unwrap();
        assert_eq!(page.total_docs, 2);
        assert!(page.docs.iter().all(|d| d.tenant == TenantId::new(7)));

        let published = backend.find(Collection::Posts, &acme, true, pagination).await.unwrap();
        assert_eq!(published.total_docs, 1);
        assert_eq!(published.docs[0].id, "a");

        let by_slug = ListAccess::Filtered(Where::equals("slug", "c"));
        let page = backend.find(Collection::Posts, &by_slug, false, pagination).await.unwrap();
        assert_eq!(page.docs.len(), 1);
        assert_eq!(page.docs[0].tenant, TenantId::new(8));

        let other_collection = backend
            .find(Collection::Pages, &ListAccess::Unrestricted, false, pagination)
            .await
            .unwrap();
        assert_eq!(other_collection.total_docs, 0);
    }

    #[tokio::test]
    async fn test_pagination() {
        let backend = seeded().await;
        let page = backend
            .find(Collection::Posts, &ListAccess::Unrestricted, false, Pagination::new(2, 1))
            .await
            .unwrap();
        assert_eq!(page.total_docs, 3);
        assert_eq!(page.docs.len(), 2);
    }

    #[tokio::test]
    async fn test_huge_page_is_empty() {
        let backend = seeded().await;
        let page = backend
            .find(
                Collection::Posts,
                &ListAccess::Unrestricted,
                false,
                Pagination::new(100, usize::MAX),
            )
            .await
            .unwrap();
        assert!(page.docs.is_empty());
        assert_eq!(page.total_docs, 3);
        assert_eq!(page.page, usize::MAX);
    }

    #[tokio::test]
    async fn test_update_delete() {
        let backend = seeded().await;
        let patch = DocumentPatch {
            published: Some(true),
            data: Some(json!({"title": "B"})),
        };
        let updated = backend.update(Collection::Posts, "b", &patch).await.unwrap();
        assert!(updated.published);

        let stored = backend.get(Collection::Posts, "b").await.unwrap().unwrap();
        assert!(stored.published);
        assert_eq!(stored.data, json!({"slug": "b", "title": "B"}));

        backend.delete(Collection::Posts, "b").await.unwrap();
        let err = backend.update(Collection::Posts, "b", &patch).await.unwrap_err();
        assert!(matches!(err, StorageError::Document(DocumentError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.db");
        {
            let backend = SqliteBackend::open(&path).unwrap();
            backend.init_schema().unwrap();
            backend.put_tenant(Tenant::new(1, "One", "one")).await.unwrap();
        }
        let reopened = SqliteBackend::open(&path).unwrap();
        reopened.init_schema().unwrap();
        assert!(reopened.tenant(TenantId::new(1)).await.unwrap().is_some());
    }
}
