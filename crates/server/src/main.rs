//! Meridian server
//!
//! Multi-tenant content API with host-scoped sites and signed machine
//! clients.

use clap::Parser;
use meridian_rest::{ServerConfig, StorageBackendMode, create_app_with_config, init_logging};
use meridian_tenancy::backends::MemoryBackend;
use tracing::{info, warn};

#[cfg(feature = "sqlite")]
use meridian_tenancy::backends::sqlite::SqliteBackend;

/// Creates and initializes a SQLite backend from the server configuration.
#[cfg(feature = "sqlite")]
fn create_sqlite_backend(config: &ServerConfig) -> anyhow::Result<SqliteBackend> {
    let db_path = config.database_url.as_deref().unwrap_or(":memory:");
    info!(database = %db_path, "Initializing SQLite backend");

    let backend = if db_path == ":memory:" {
        SqliteBackend::in_memory()?
    } else {
        SqliteBackend::open(db_path)?
    };
    backend.init_schema()?;

    Ok(backend)
}

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        environment = %config.environment,
        storage_backend = %config.backend,
        "Starting Meridian server"
    );

    if config.allow_unconfigured_domains {
        warn!("Logins are allowed from any domain for tenants without CMS domains");
    }

    match config.backend {
        StorageBackendMode::Memory => {
            let app = create_app_with_config(MemoryBackend::new(), config.clone());
            serve(app, &config).await?;
        }
        StorageBackendMode::Sqlite => {
            start_sqlite(config).await?;
        }
    }

    Ok(())
}

/// Starts the server with the SQLite backend.
#[cfg(feature = "sqlite")]
async fn start_sqlite(config: ServerConfig) -> anyhow::Result<()> {
    let backend = create_sqlite_backend(&config)?;
    let app = create_app_with_config(backend, config.clone());
    serve(app, &config).await
}

/// Fallback when sqlite feature is not enabled.
#[cfg(not(feature = "sqlite"))]
async fn start_sqlite(_config: ServerConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "The sqlite backend requires the 'sqlite' feature. \
         Build with: cargo build -p meridian-server --features sqlite"
    )
}
