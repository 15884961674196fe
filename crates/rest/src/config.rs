//! Server configuration for the Meridian API.
//!
//! This module provides configuration types for the REST server, supporting
//! both programmatic configuration and environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MERIDIAN_PORT` | 8080 | Server port |
//! | `MERIDIAN_HOST` | 127.0.0.1 | Host to bind |
//! | `MERIDIAN_LOG_LEVEL` | info | Log level |
//! | `MERIDIAN_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `MERIDIAN_ENABLE_CORS` | true | Enable CORS |
//! | `MERIDIAN_CORS_ORIGINS` | * | Allowed origins |
//! | `MERIDIAN_DATABASE_URL` | (none) | `:memory:` or a SQLite file path |
//! | `MERIDIAN_BACKEND` | memory | Storage backend (`memory`, `sqlite`) |
//! | `MERIDIAN_SECRET` | (none) | Session signing secret |
//! | `MERIDIAN_SIGNATURE_SECRET` | (none) | Shared secret for machine request signatures |
//! | `MERIDIAN_SIGNATURE_TTL_MS` | 300000 | Maximum age of a signed request |
//! | `MERIDIAN_COOKIE_PREFIX` | meridian | Prefix of the tenant scope cookie |
//! | `MERIDIAN_SESSION_TTL_SECS` | 7200 | Lifetime of session tokens |
//! | `MERIDIAN_ENVIRONMENT` | development | `development`, `staging` or `production` |
//! | `MERIDIAN_ALLOW_UNCONFIGURED_DOMAINS` | false | Admit users whose tenants have no CMS domain |
//! | `MERIDIAN_SMTP_*` | (none) | Outgoing mail credentials (all or none) |
//! | `MERIDIAN_S3_*` | (none) | Media bucket credentials (all or none) |
//!
//! # Example
//!
//! ```rust
//! use meridian_rest::ServerConfig;
//!
//! let config = ServerConfig {
//!     port: 3000,
//!     host: "0.0.0.0".to_string(),
//!     ..ServerConfig::for_testing()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;
use std::str::FromStr;

use clap::{Parser, ValueEnum};

/// Minimum secret length accepted in production.
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Storage backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StorageBackendMode {
    /// In-process maps; nothing survives a restart.
    #[default]
    Memory,
    /// SQLite through an r2d2 pool.
    Sqlite,
}

impl fmt::Display for StorageBackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackendMode::Memory => write!(f, "memory"),
            StorageBackendMode::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for StorageBackendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackendMode::Memory),
            "sqlite" => Ok(StorageBackendMode::Sqlite),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Environment {
    /// Local development; a missing secret is tolerated.
    #[default]
    Development,
    /// Pre-production.
    Staging,
    /// Production; secrets must be long.
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Server configuration for the Meridian API.
///
/// This struct can be constructed from environment variables using [`ServerConfig::from_env`],
/// from command line arguments using [`ServerConfig::parse`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "meridian")]
#[command(about = "Multi-tenant content platform API server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "MERIDIAN_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "MERIDIAN_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "MERIDIAN_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Request timeout in seconds.
    #[arg(long, env = "MERIDIAN_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "MERIDIAN_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "MERIDIAN_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(
        long,
        env = "MERIDIAN_CORS_METHODS",
        default_value = "GET,POST,PATCH,DELETE,OPTIONS"
    )]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "MERIDIAN_CORS_HEADERS",
        default_value = "Content-Type,Authorization,X-Tenant-Auth,X-Request-Id,X-Device-Id,X-User-Agent,X-Timestamp,X-Signature"
    )]
    pub cors_headers: String,

    /// Database location: `:memory:` or a SQLite file path.
    #[arg(long, env = "MERIDIAN_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Storage backend.
    #[arg(long, env = "MERIDIAN_BACKEND", value_enum, default_value = "memory")]
    pub backend: StorageBackendMode,

    /// Secret used to sign session tokens.
    #[arg(long, env = "MERIDIAN_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Shared secret for machine request signatures. Falls back to `secret`.
    #[arg(long, env = "MERIDIAN_SIGNATURE_SECRET", hide_env_values = true)]
    pub signature_secret: Option<String>,

    /// Maximum age of a signed request in milliseconds.
    #[arg(long, env = "MERIDIAN_SIGNATURE_TTL_MS", default_value = "300000")]
    pub signature_ttl_ms: u64,

    /// How far ahead of the server clock a signed request may be stamped,
    /// in milliseconds.
    #[arg(long, env = "MERIDIAN_SIGNATURE_MAX_SKEW_MS", default_value = "300000")]
    pub signature_max_skew_ms: u64,

    /// Prefix of the tenant scope cookie (`<prefix>-tenant`).
    #[arg(long, env = "MERIDIAN_COOKIE_PREFIX", default_value = "meridian")]
    pub cookie_prefix: String,

    /// Lifetime of session tokens in seconds.
    #[arg(long, env = "MERIDIAN_SESSION_TTL_SECS", default_value = "7200")]
    pub session_ttl_secs: u64,

    /// Deployment environment.
    #[arg(long, env = "MERIDIAN_ENVIRONMENT", value_enum, default_value = "development")]
    pub environment: Environment,

    /// Admit users none of whose tenants has a CMS domain configured.
    #[arg(long, env = "MERIDIAN_ALLOW_UNCONFIGURED_DOMAINS", default_value = "false")]
    pub allow_unconfigured_domains: bool,

    /// SMTP server host.
    #[arg(long, env = "MERIDIAN_SMTP_HOST")]
    pub smtp_host: Option<String>,

    /// SMTP server port.
    #[arg(long, env = "MERIDIAN_SMTP_PORT")]
    pub smtp_port: Option<u16>,

    /// SMTP user name.
    #[arg(long, env = "MERIDIAN_SMTP_USER")]
    pub smtp_user: Option<String>,

    /// SMTP password.
    #[arg(long, env = "MERIDIAN_SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,

    /// Media bucket name.
    #[arg(long, env = "MERIDIAN_S3_BUCKET")]
    pub s3_bucket: Option<String>,

    /// Media bucket region.
    #[arg(long, env = "MERIDIAN_S3_REGION")]
    pub s3_region: Option<String>,

    /// Media bucket access key.
    #[arg(long, env = "MERIDIAN_S3_ACCESS_KEY_ID")]
    pub s3_access_key_id: Option<String>,

    /// Media bucket secret key.
    #[arg(long, env = "MERIDIAN_S3_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub s3_secret_access_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,PATCH,DELETE,OPTIONS".to_string(),
            cors_headers: "Content-Type,Authorization,X-Tenant-Auth,X-Request-Id,X-Device-Id,X-User-Agent,X-Timestamp,X-Signature".to_string(),
            database_url: None,
            backend: StorageBackendMode::Memory,
            secret: None,
            signature_secret: None,
            signature_ttl_ms: meridian_signature::DEFAULT_TTL_MS,
            signature_max_skew_ms: meridian_signature::DEFAULT_MAX_SKEW_MS,
            cookie_prefix: "meridian".to_string(),
            session_ttl_secs: 7200,
            environment: Environment::Development,
            allow_unconfigured_domains: false,
            smtp_host: None,
            smtp_port: None,
            smtp_user: None,
            smtp_password: None,
            s3_bucket: None,
            s3_region: None,
            s3_access_key_id: None,
            s3_secret_access_key: None,
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// This is a convenience method that parses environment variables without
    /// requiring command line arguments.
    pub fn from_env() -> Self {
        // Try to parse from environment, falling back to defaults
        Self::try_parse().unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Name of the tenant scope cookie.
    pub fn tenant_cookie_name(&self) -> String {
        format!("{}-tenant", self.cookie_prefix)
    }

    /// Secret used for session tokens. Empty in development when unset.
    pub fn session_secret(&self) -> &str {
        self.secret.as_deref().unwrap_or("")
    }

    /// Secret used for machine request signatures.
    pub fn signature_secret(&self) -> &str {
        self.signature_secret
            .as_deref()
            .or(self.secret.as_deref())
            .unwrap_or("")
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.signature_ttl_ms == 0 {
            errors.push("Signature TTL cannot be 0".to_string());
        }

        if self.session_ttl_secs == 0 {
            errors.push("Session TTL cannot be 0".to_string());
        }

        if self.cookie_prefix.trim().is_empty() {
            errors.push("Cookie prefix cannot be empty".to_string());
        } else if !self
            .cookie_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            errors.push("Cookie prefix may only contain letters, digits, '-' and '_'".to_string());
        }

        let secret = self.session_secret();
        if self.environment != Environment::Development && secret.is_empty() {
            errors.push(format!("MERIDIAN_SECRET is required in {}", self.environment));
        }
        if self.environment == Environment::Production && !secret.is_empty() && secret.len() < MIN_PRODUCTION_SECRET_LEN {
            errors.push(format!(
                "MERIDIAN_SECRET must be at least {} bytes in production",
                MIN_PRODUCTION_SECRET_LEN
            ));
        }

        if self.backend == StorageBackendMode::Sqlite && self.database_url.is_none() {
            errors.push("The sqlite backend requires MERIDIAN_DATABASE_URL".to_string());
        }

        check_group(
            &mut errors,
            "SMTP",
            &[
                ("MERIDIAN_SMTP_HOST", self.smtp_host.is_some()),
                ("MERIDIAN_SMTP_PORT", self.smtp_port.is_some()),
                ("MERIDIAN_SMTP_USER", self.smtp_user.is_some()),
                ("MERIDIAN_SMTP_PASSWORD", self.smtp_password.is_some()),
            ],
        );
        check_group(
            &mut errors,
            "S3",
            &[
                ("MERIDIAN_S3_BUCKET", self.s3_bucket.is_some()),
                ("MERIDIAN_S3_REGION", self.s3_region.is_some()),
                ("MERIDIAN_S3_ACCESS_KEY_ID", self.s3_access_key_id.is_some()),
                ("MERIDIAN_S3_SECRET_ACCESS_KEY", self.s3_secret_access_key.is_some()),
            ],
        );

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// This uses ephemeral port 0, a fixed secret, and disables features
    /// that might interfere with tests.
    pub fn for_testing() -> Self {
        Self {
            port: 0, // Let OS assign port
            log_level: "debug".to_string(),
            request_timeout: 5, // Shorter timeout for tests
            enable_cors: false,
            cors_origins: "*".to_string(),
            cors_methods: "*".to_string(),
            cors_headers: "*".to_string(),
            secret: Some("test-session-secret-0123456789abcdef".to_string()),
            signature_secret: Some("test-signature-secret".to_string()),
            ..Default::default()
        }
    }
}

/// Records an error when some but not all settings of a group are present.
fn check_group(errors: &mut Vec<String>, group: &str, settings: &[(&str, bool)]) {
    let present = settings.iter().filter(|(_, set)| *set).count();
    if present > 0 && present < settings.len() {
        let missing: Vec<&str> = settings
            .iter()
            .filter(|(_, set)| !*set)
            .map(|(name, _)| *name)
            .collect();
        errors.push(format!(
            "{} configuration is incomplete; missing {}",
            group,
            missing.join(", ")
        ));
    }
}
