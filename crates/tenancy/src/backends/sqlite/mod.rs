//! SQLite backend implementation.
//!
//! Supports in-memory databases (tests, development) and file databases.
//! Access filters are compiled to parameterized SQL so tenant scoping is
//! applied inside the query rather than after loading.
//!
//! # Example
//!
//! ```no_run
//! use meridian_tenancy::backends::sqlite::SqliteBackend;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SqliteBackend::open("./data/meridian.db")?;
//! backend.init_schema()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE tenants (id INTEGER PRIMARY KEY, name TEXT, slug TEXT, api_key TEXT UNIQUE);
//! CREATE TABLE tenant_domains (domain TEXT PRIMARY KEY, tenant_id INTEGER, cms INTEGER);
//! CREATE TABLE users (id TEXT PRIMARY KEY, email TEXT UNIQUE COLLATE NOCASE, system_user INTEGER, password_hash TEXT);
//! CREATE TABLE user_tenants (user_id TEXT, position INTEGER, tenant_id INTEGER, role TEXT);
//! CREATE TABLE documents (
//!     collection TEXT, id TEXT, tenant_id INTEGER, published INTEGER,
//!     data TEXT,  -- JSON
//!     created_at TEXT, updated_at TEXT,
//!     PRIMARY KEY (collection, id)
//! );
//! ```

mod backend;
pub mod query_builder;
mod schema;
mod storage;

pub use backend::{SqliteBackend, SqliteBackendConfig};
pub use schema::SCHEMA_VERSION;
