//! HTTP middleware for the Meridian API.
//!
//! - [`tenant_cookie`] - Tenant resolution from the request host or scope cookie
//! - [`auth_compat`] - `X-Tenant-Auth` to `Authorization` fallback

pub mod auth_compat;
pub mod tenant_cookie;

pub use auth_compat::{X_TENANT_AUTH, auth_compat_middleware};
pub use tenant_cookie::{ResolvedTenant, TenantSource, tenant_cookie_middleware};
