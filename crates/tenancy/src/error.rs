//! Error types for the tenancy layer.
//!
//! Storage errors are grouped by category the same way the HTTP layer
//! reports them: document state, tenant isolation, input validation and
//! backend failures. Ordinary access denial is never an error here; the
//! access predicates return `false` or an empty filter instead.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::tenant::TenantId;
use crate::types::Collection;

/// The primary error type for all storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Document state errors
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Tenant isolation errors
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// Validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors related to document state.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The requested document was not found.
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: Collection, id: String },

    /// A document with the given ID already exists.
    #[error("document already exists: {collection}/{id}")]
    AlreadyExists { collection: Collection, id: String },
}

/// Errors related to tenant records.
#[derive(Error, Debug)]
pub enum TenantError {
    /// The referenced tenant does not exist.
    #[error("unknown tenant: {tenant_id}")]
    UnknownTenant { tenant_id: TenantId },

    /// Another tenant already routes the domain.
    #[error("domain {domain} is already assigned to tenant {owner}")]
    DomainTaken { domain: String, owner: TenantId },

    /// Another tenant already uses the API key.
    #[error("api key already assigned to tenant {owner}")]
    ApiKeyTaken { owner: TenantId },
}

/// Errors related to input validation.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The collection name is not known.
    #[error("unknown collection: {collection}")]
    UnknownCollection { collection: String },

    /// A required field is missing.
    #[error("missing required field: {field}")]
    MissingRequiredField { field: String },

    /// A field has an invalid value.
    #[error("invalid value for {field}: {message}")]
    InvalidField { field: String, message: String },
}

/// Errors originating from the database backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Schema creation failed.
    #[error("schema migration failed: {message}")]
    MigrationError { message: String },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError { message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
