//! Storage backend implementations.
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | Memory | (always) | Process-local maps, nothing persisted |
//! | SQLite | `sqlite` | Embedded database, in-memory or file based |

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryBackend;
