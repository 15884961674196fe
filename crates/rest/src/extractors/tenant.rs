//! Resolved site tenant extractor.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use meridian_tenancy::tenant::TenantId;

use crate::middleware::tenant_cookie::ResolvedTenant;

/// Axum extractor for the tenant the request was resolved to by
/// [`tenant_cookie_middleware`](crate::middleware::tenant_cookie_middleware).
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteTenant(pub Option<ResolvedTenant>);

impl SiteTenant {
    /// The resolved tenant ID, if any.
    pub fn tenant_id(&self) -> Option<TenantId> {
        self.0.map(|r| r.tenant_id)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for SiteTenant {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(SiteTenant(parts.extensions.get::<ResolvedTenant>().copied()))
    }
}
