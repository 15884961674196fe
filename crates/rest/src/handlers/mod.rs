//! HTTP request handlers.
//!
//! - [`health`] - Health, liveness and readiness probes
//! - [`auth`] - Login and current user
//! - [`documents`] - Collection list, read, create, update and delete

pub mod auth;
pub mod documents;
pub mod health;

// Re-export handlers for convenience
pub use auth::{login_handler, me_handler};
pub use documents::{create_handler, delete_handler, list_handler, read_handler, update_handler};
pub use health::{health_handler, liveness_handler, readiness_handler};
