//! Access control for tenant-owned content.
//!
//! - [`predicates`] - the two access operations, boolean and filter
//! - [`filter`] - query filters ([`Where`], [`ListAccess`])
//! - [`collection`] - per-collection rules built on the predicates
//! - [`domain`] - login restriction by CMS domain

pub mod collection;
pub mod domain;
pub mod filter;
pub mod predicates;

pub use collection::{CollectionAccess, CollectionAccessBuilder, Operation, OperationRule};
pub use domain::{DomainError, DomainPolicy};
pub use filter::{Condition, ListAccess, PUBLISHED_FIELD, TENANT_FIELD, Where};
pub use predicates::{build_list_filter, effective_tenants, evaluate_document_access};
