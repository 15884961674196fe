//! Core storage traits.
//!
//! ```text
//! TenantStore ──┐
//!               ├── Storage
//! ContentStore ─┘
//! ```
//!
//! Access decisions are made before storage is reached: a list query
//! receives the [`ListAccess`](crate::access::ListAccess) computed for the
//! actor, and single-document operations are checked by the caller.

mod storage;

pub use storage::{ContentStore, Storage, TenantStore};
