//! Request host extractor.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, Uri, header, request::Parts},
};
use meridian_tenancy::tenant::normalize_host;

/// Returns the normalized request host (lower case, no port).
///
/// The `Host` header wins; absolute request URIs (HTTP/2) are the fallback.
pub fn request_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .map(normalize_host)
        .filter(|h| !h.is_empty())
}

/// Axum extractor for the normalized request host. Empty when the request
/// carries none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHost(pub String);

impl<S: Send + Sync> FromRequestParts<S> for RequestHost {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestHost(request_host(&parts.headers, &parts.uri).unwrap_or_default()))
    }
}
