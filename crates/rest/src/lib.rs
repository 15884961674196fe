//! # meridian-rest - HTTP API for the Meridian content platform
//!
//! This crate exposes tenant-scoped content collections over HTTP. It wires
//! the policy primitives of `meridian-tenancy` and `meridian-signature` into
//! an axum application:
//!
//! - **Tenant resolution**: the request host (or the `<prefix>-tenant`
//!   cookie) scopes anonymous reads to one tenant
//! - **Authentication**: session tokens for humans, API key plus request
//!   signature for tenant machines
//! - **Access control**: every handler consults the collection's access
//!   rules; lists are filtered, not post-processed
//! - **Login domains**: users may only log in from a CMS domain of one of
//!   their tenants
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meridian_rest::{ServerConfig, create_app_with_config};
//! use meridian_tenancy::backends::MemoryBackend;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default();
//!     let app = create_app_with_config(MemoryBackend::new(), config.clone());
//!
//!     let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Interaction | HTTP Method | URL Pattern |
//! |------------|-------------|-------------|
//! | health | GET | `/health`, `/_liveness`, `/_readiness` |
//! | login | POST | `/api/users/login` |
//! | current user | GET | `/api/users/me` |
//! | list | GET | `/api/[collection]?limit=&page=` |
//! | read | GET | `/api/[collection]/[id]` |
//! | create | POST | `/api/[collection]` |
//! | update | PATCH | `/api/[collection]/[id]` |
//! | delete | DELETE | `/api/[collection]/[id]` |
//!
//! ## HTTP Headers
//!
//! - `Authorization` - `Bearer <token>` or `tenants API-Key <key>`
//! - `X-Tenant-Auth` - Fallback for `Authorization`
//! - `X-Request-Id`, `X-Device-Id`, `X-User-Agent`, `X-Timestamp`,
//!   `X-Signature` - Machine request signature
//!
//! ## Architecture
//!
//! - [`error`] - Error types and JSON error bodies
//! - [`config`] - Server configuration
//! - [`state`] - Application state (storage, configuration, policies)
//! - [`session`] - Session tokens and password hashing
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Tenant resolution and the auth shim
//! - [`extractors`] - Actor, tenant, host and pagination extractors
//! - [`routing`] - Route configuration

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use config::{Environment, ServerConfig, StorageBackendMode};
pub use error::{RestError, RestResult};
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use meridian_tenancy::core::Storage;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application with default configuration.
///
/// This is a convenience function that creates the app with default settings.
/// For more control, use [`create_app_with_config`].
pub fn create_app<S>(storage: S) -> Router
where
    S: Storage + 'static,
{
    create_app_with_config(storage, ServerConfig::default())
}

/// Creates the Axum application with custom configuration.
///
/// This function sets up all routes, tenant resolution, tracing, the
/// request timeout and, when enabled, CORS.
pub fn create_app_with_config<S>(storage: S, config: ServerConfig) -> Router
where
    S: Storage + 'static,
{
    create_app_with_state(AppState::new(Arc::new(storage), config))
}

/// Creates the Axum application from prepared state, e.g. with custom
/// collection access rules.
pub fn create_app_with_state<S>(state: AppState<S>) -> Router
where
    S: Storage + 'static,
{
    info!(
        "Creating API server with backend: {}",
        state.storage().backend_name()
    );

    let config = state.config().clone();

    // Build the router with all API routes
    let router = routing::create_routes(state);

    // Build middleware stack
    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    // Add CORS if enabled
    let router = if config.enable_cors {
        let cors = build_cors_layer(&config);
        router.layer(cors)
    } else {
        router
    };

    // Apply remaining middleware
    router.layer(service_builder)
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    // Configure origins
    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    // Configure methods
    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = config
            .cors_methods
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    // Configure headers
    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = config
            .cors_headers
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup. `RUST_LOG` overrides
/// `level`.
///
/// # Arguments
///
/// * `level` - The log level (error, warn, info, debug, trace)
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "meridian_rest={level},meridian_tenancy={level},meridian_signature={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
