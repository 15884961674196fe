//! Meridian tenancy layer
//!
//! Tenant model, tenant-scoped access control and storage for the Meridian
//! multi-tenant content platform.
//!
//! # Architecture
//!
//! - [`tenant`] - Tenants, users, roles and the authenticated [`Actor`](tenant::Actor)
//! - [`access`] - Access predicates, list filters, collection rules, domain login policy
//! - [`types`] - Collections, documents and pagination
//! - [`error`] - Error types for storage operations
//! - [`core`] - Storage traits
//! - [`backends`] - Memory and SQLite backends
//!
//! # Access control
//!
//! Access is answered in two forms. A boolean for a single document, and a
//! filter for queries:
//!
//! ```
//! use meridian_tenancy::access::{build_list_filter, evaluate_document_access};
//! use meridian_tenancy::tenant::{Actor, TenantId, TenantRole, User};
//!
//! let admin = Actor::from_user(
//!     User::new("u1", "admin@acme.test").with_membership(7, TenantRole::Admin),
//! );
//! let roles = [TenantRole::Admin];
//!
//! assert!(evaluate_document_access(&admin, &roles, Some(TenantId::new(7))));
//! assert!(!evaluate_document_access(&admin, &roles, Some(TenantId::new(8))));
//!
//! let filter = build_list_filter(&admin, &roles);
//! assert_eq!(
//!     serde_json::to_value(&filter).unwrap(),
//!     serde_json::json!({"tenant": {"in": [7]}}),
//! );
//! ```
//!
//! # Backend Features
//!
//! - `sqlite` (default) - SQLite backend via `rusqlite` and an `r2d2` pool
//!
//! The in-memory backend is always available.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod access;
pub mod backends;
pub mod core;
pub mod error;
pub mod tenant;
pub mod types;

// Re-export commonly used types at crate root
pub use access::{CollectionAccess, DomainPolicy, ListAccess, Operation, Where};
pub use error::{StorageError, StorageResult};
pub use tenant::{Actor, Tenant, TenantId, TenantRole, User};
pub use types::{Collection, Document, Page, Pagination};

// Re-export core traits
pub use crate::core::{ContentStore, Storage, TenantStore};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
