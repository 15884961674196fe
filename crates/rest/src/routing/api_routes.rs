//! API route configuration.

use axum::{
    Router,
    routing::{get, post},
};
use meridian_tenancy::core::Storage;

use crate::handlers;
use crate::middleware::{auth_compat_middleware, tenant_cookie_middleware};
use crate::state::AppState;

/// Creates all API routes with tenant resolution and the auth shim applied.
///
/// # Routes
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /_liveness` - Liveness probe
/// - `GET /_readiness` - Readiness probe
///
/// ## Users
/// - `POST /api/users/login` - Log in
/// - `GET /api/users/me` - Current actor
///
/// ## Collections
/// - `GET /api/{collection}` - List
/// - `POST /api/{collection}` - Create
/// - `GET /api/{collection}/{id}` - Read
/// - `PATCH /api/{collection}/{id}` - Update
/// - `DELETE /api/{collection}/{id}` - Delete
pub fn create_routes<S>(state: AppState<S>) -> Router
where
    S: Storage + 'static,
{
    Router::new()
        // System routes
        .route("/health", get(handlers::health_handler::<S>))
        .route("/_liveness", get(handlers::liveness_handler))
        .route("/_readiness", get(handlers::readiness_handler::<S>))
        // Users
        .route("/api/users/login", post(handlers::login_handler::<S>))
        .route("/api/users/me", get(handlers::me_handler))
        // Collections
        .route(
            "/api/{collection}",
            get(handlers::list_handler::<S>).post(handlers::create_handler::<S>),
        )
        .route(
            "/api/{collection}/{id}",
            get(handlers::read_handler::<S>)
                .patch(handlers::update_handler::<S>)
                .delete(handlers::delete_handler::<S>),
        )
        // Runs before authentication so the shim is visible to extractors
        .layer(axum::middleware::from_fn(auth_compat_middleware))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            tenant_cookie_middleware::<S>,
        ))
        // State
        .with_state(state)
}
