//! `X-Tenant-Auth` compatibility shim.
//!
//! Some proxies in front of tenant sites strip `Authorization`. Clients
//! behind them send their credentials in `X-Tenant-Auth` instead; this
//! middleware copies that header into `Authorization` when the latter is
//! absent, before authentication runs.

use axum::{
    extract::Request,
    http::{HeaderName, header},
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Fallback credentials header.
pub static X_TENANT_AUTH: HeaderName = HeaderName::from_static("x-tenant-auth");

/// Middleware copying `X-Tenant-Auth` into a missing `Authorization` header.
pub async fn auth_compat_middleware(mut request: Request, next: Next) -> Response {
    if !request.headers().contains_key(header::AUTHORIZATION) {
        if let Some(value) = request.headers().get(&X_TENANT_AUTH).cloned() {
            debug!("Using X-Tenant-Auth as Authorization");
            request.headers_mut().insert(header::AUTHORIZATION, value);
        }
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::HeaderMap, routing::get};
    use tower::ServiceExt;

    async fn echo(headers: HeaderMap) -> String {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string()
    }

    fn app() -> Router {
        Router::new()
            .route("/", get(echo))
            .layer(axum::middleware::from_fn(auth_compat_middleware))
    }

    async fn call(request: axum::http::Request<Body>) -> String {
        let response = app().oneshot(request).await.unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_copies_when_missing() {
        let request = axum::http::Request::builder()
            .uri("/")
            .header("x-tenant-auth", "tenants API-Key abc")
            .body(Body::empty())
            .unwrap();
        assert_eq!(call(request).await, "tenants API-Key abc");
    }

    #[tokio::test]
    async fn test_existing_authorization_wins() {
        let request = axum::http::Request::builder()
            .uri("/")
            .header("authorization", "Bearer token")
            .header("x-tenant-auth", "tenants API-Key abc")
            .body(Body::empty())
            .unwrap();
        assert_eq!(call(request).await, "Bearer token");
    }
}
