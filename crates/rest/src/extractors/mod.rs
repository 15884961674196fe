//! Axum extractors for the Meridian API.
//!
//! - [`Authenticated`] / [`MaybeActor`] - The actor behind the request
//! - [`SiteTenant`] - The tenant resolved from host or cookie
//! - [`RequestHost`] - The normalized request host
//! - [`ListQuery`] - List pagination parameters

pub mod actor;
pub mod host;
mod pagination;
mod tenant;

pub use actor::{Authenticated, Credentials, MaybeActor, authenticate};
pub use host::RequestHost;
pub use pagination::ListQuery;
pub use tenant::SiteTenant;
