//! Host and cookie based tenant resolution.
//!
//! Every request is scoped to a tenant when possible:
//!
//! 1. the `Host` header is matched against every tenant domain (CMS and
//!    public); a match wins and refreshes the `<prefix>-tenant` cookie when
//!    it is absent or names another tenant;
//! 2. otherwise a scope cookie naming an existing tenant is used;
//! 3. a scope cookie naming no tenant is cleared.
//!
//! The outcome is stored as a [`ResolvedTenant`] request extension.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use meridian_tenancy::core::Storage;
use meridian_tenancy::tenant::TenantId;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::RestError;
use crate::extractors::host::request_host;
use crate::state::AppState;

/// Lifetime of the tenant scope cookie, in seconds.
pub const TENANT_COOKIE_MAX_AGE: u64 = 2 * 60 * 60;

/// Where a request's tenant came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantSource {
    /// The request host is a tenant domain.
    Host,
    /// The scope cookie set on an earlier request.
    Cookie,
}

/// Extension type for the tenant a request was resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTenant {
    /// The tenant.
    pub tenant_id: TenantId,
    /// How it was resolved.
    pub source: TenantSource,
}

/// Cookie change to apply to the response.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CookieUpdate {
    Keep,
    Set(TenantId),
    Clear,
}

/// Middleware resolving the request's tenant from its host or scope cookie.
pub async fn tenant_cookie_middleware<S>(
    State(state): State<AppState<S>>,
    mut request: Request,
    next: Next,
) -> Response
where
    S: Storage + 'static,
{
    let cookie_name = state.tenant_cookie_name();
    let host = request_host(request.headers(), request.uri());
    let cookie = read_cookie(request.headers(), &cookie_name);

    let (resolved, update) = match resolve(state.storage(), host.as_deref(), cookie.as_deref()).await {
        Ok(outcome) => outcome,
        Err(err) => return err.into_response(),
    };

    if let Some(resolved) = resolved {
        debug!(
            tenant = %resolved.tenant_id,
            source = ?resolved.source,
            "Resolved request tenant"
        );
        request.extensions_mut().insert(resolved);
    }

    let mut response = next.run(request).await;

    let set_cookie = match update {
        CookieUpdate::Keep => None,
        CookieUpdate::Set(tenant) => Some(tenant_cookie(&cookie_name, tenant)),
        CookieUpdate::Clear => Some(clear_tenant_cookie(&cookie_name)),
    };
    if let Some(value) = set_cookie {
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(_) => warn!(cookie = %cookie_name, "Tenant cookie is not a valid header value"),
        }
    }

    response
}

/// Decides the request tenant and the cookie update.
async fn resolve<S: Storage>(
    storage: &S,
    host: Option<&str>,
    cookie: Option<&str>,
) -> Result<(Option<ResolvedTenant>, CookieUpdate), RestError> {
    let cookie_tenant = cookie.and_then(|v| v.parse::<TenantId>().ok());

    if let Some(host) = host {
        if let Some(tenant) = storage.tenant_by_domain(host).await? {
            let update = if cookie_tenant == Some(tenant.id) {
                CookieUpdate::Keep
            } else {
                CookieUpdate::Set(tenant.id)
            };
            let resolved = ResolvedTenant {
                tenant_id: tenant.id,
                source: TenantSource::Host,
            };
            return Ok((Some(resolved), update));
        }
    }

    let Some(raw) = cookie else {
        return Ok((None, CookieUpdate::Keep));
    };

    let existing = match cookie_tenant {
        Some(id) => storage.tenant(id).await?,
        None => None,
    };
    match existing {
        Some(tenant) => Ok((
            Some(ResolvedTenant {
                tenant_id: tenant.id,
                source: TenantSource::Cookie,
            }),
            CookieUpdate::Keep,
        )),
        None => {
            debug!(cookie = %raw, "Clearing stale tenant cookie");
            Ok((None, CookieUpdate::Clear))
        }
    }
}

/// Reads a cookie value from the `Cookie` headers of a request.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
}

/// `Set-Cookie` value scoping the browser to a tenant.
pub fn tenant_cookie(name: &str, tenant: TenantId) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        name, tenant, TENANT_COOKIE_MAX_AGE
    )
}

/// `Set-Cookie` value removing the tenant scope cookie.
pub fn clear_tenant_cookie(name: &str) -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", name)
}
