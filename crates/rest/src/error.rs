//! Error types for the Meridian API.
//!
//! Every error is rendered as `{"errors": [{"message": "..."}]}` with the
//! matching status code.
//!
//! # Error Mapping
//!
//! | Source | HTTP Status |
//! |--------|-------------|
//! | Signature header validation | 400 |
//! | Expired or forged signature | 401 |
//! | Missing or invalid session | 401 |
//! | Domain login restriction | 403 |
//! | Denied write | 403 |
//! | Document not found (or not readable) | 404 |
//! | Document already exists | 409 |
//! | Unknown collection / tenant, invalid field | 400 |
//! | Backend failure | 500 |

use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use meridian_signature::SignatureFailure;
use meridian_tenancy::access::DomainError;
use meridian_tenancy::error::{BackendError, DocumentError, StorageError, TenantError, ValidationError};
use meridian_tenancy::types::Collection;
use tracing::error;

use crate::session::SessionError;

/// The primary error type for API operations.
#[derive(Debug)]
pub enum RestError {
    /// Document not found or not visible to the caller (HTTP 404).
    NotFound {
        /// The collection.
        collection: Collection,
        /// The document ID.
        id: String,
    },

    /// Document already exists (HTTP 409).
    Conflict {
        /// Description of the conflict.
        message: String,
    },

    /// Bad request (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Authentication missing or failed (HTTP 401).
    Unauthorized {
        /// Error message.
        message: String,
    },

    /// Authenticated but not permitted (HTTP 403).
    Forbidden {
        /// Error message.
        message: String,
    },

    /// Internal server error (HTTP 500).
    InternalError {
        /// Error message.
        message: String,
    },
}

impl RestError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RestError::Conflict { .. } => StatusCode::CONFLICT,
            RestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RestError::Forbidden { .. } => StatusCode::FORBIDDEN,
            RestError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Shorthand for a 403 with the given message.
    pub fn forbidden(message: impl Into<String>) -> Self {
        RestError::Forbidden {
            message: message.into(),
        }
    }

    /// Shorthand for a 401 with the given message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        RestError::Unauthorized {
            message: message.into(),
        }
    }
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::NotFound { collection, id } => {
                write!(f, "Document {}/{} not found", collection, id)
            }
            RestError::Conflict { message } => write!(f, "{}", message),
            RestError::BadRequest { message } => write!(f, "{}", message),
            RestError::Unauthorized { message } => write!(f, "{}", message),
            RestError::Forbidden { message } => write!(f, "{}", message),
            RestError::InternalError { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for RestError {}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            // Backend details stay in the log.
            RestError::InternalError { message } => {
                error!(error = %message, "Internal error");
                "Something went wrong.".to_string()
            }
            other => other.to_string(),
        };

        let body = serde_json::json!({
            "errors": [{ "message": message }]
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations.
pub type RestResult<T> = Result<T, RestError>;

impl From<StorageError> for RestError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Document(e) => e.into(),
            StorageError::Tenant(e) => e.into(),
            StorageError::Validation(e) => e.into(),
            StorageError::Backend(e) => e.into(),
        }
    }
}

impl From<DocumentError> for RestError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotFound { collection, id } => RestError::NotFound { collection, id },
            e @ DocumentError::AlreadyExists { .. } => RestError::Conflict {
                message: e.to_string(),
            },
        }
    }
}

impl From<TenantError> for RestError {
    fn from(err: TenantError) -> Self {
        match err {
            e @ TenantError::UnknownTenant { .. } => RestError::BadRequest {
                message: e.to_string(),
            },
            e @ (TenantError::DomainTaken { .. } | TenantError::ApiKeyTaken { .. }) => {
                RestError::Conflict {
                    message: e.to_string(),
                }
            }
        }
    }
}

impl From<ValidationError> for RestError {
    fn from(err: ValidationError) -> Self {
        RestError::BadRequest {
            message: err.to_string(),
        }
    }
}

impl From<BackendError> for RestError {
    fn from(err: BackendError) -> Self {
        RestError::InternalError {
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for RestError {
    fn from(err: DomainError) -> Self {
        RestError::Forbidden {
            message: err.to_string(),
        }
    }
}

impl From<SignatureFailure> for RestError {
    fn from(err: SignatureFailure) -> Self {
        if err.is_validation() {
            RestError::BadRequest {
                message: err.to_string(),
            }
        } else {
            RestError::Unauthorized {
                message: err.to_string(),
            }
        }
    }
}

impl From<SessionError> for RestError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidToken(_) => RestError::Unauthorized {
                message: "Invalid or expired session.".to_string(),
            },
            other => RestError::InternalError {
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for RestError {
    fn from(err: serde_json::Error) -> Self {
        RestError::BadRequest {
            message: format!("Invalid JSON: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_tenancy::TenantId;

    #[test]
    fn test_not_found_status() {
        let err = RestError::NotFound {
            collection: Collection::Pages,
            id: "home".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Document pages/home not found");
    }

    #[test]
    fn test_storage_error_mapping() {
        let err: RestError = StorageError::Tenant(TenantError::UnknownTenant {
            tenant_id: TenantId::new(4),
        })
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: RestError = StorageError::Document(DocumentError::AlreadyExists {
            collection: Collection::Posts,
            id: "a".to_string(),
        })
        .into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err: RestError = StorageError::Backend(BackendError::QueryError {
            message: "boom".to_string(),
        })
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_domain_error_is_forbidden() {
        let err: RestError = DomainError::NotConfigured {
            tenants: vec![TenantId::new(1)],
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_session_error_mapping() {
        let err: RestError = SessionError::InvalidToken("bad".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let err: RestError = SessionError::MissingSecret.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_details_hidden() {
        let response = RestError::InternalError {
            message: "disk on fire".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
