//! Session tokens and password hashing for human users.
//!
//! Sessions are stateless HS256 JWTs. The token only identifies the user;
//! memberships are reloaded from storage on every request.

use std::sync::OnceLock;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bcrypt cost for stored passwords.
pub const BCRYPT_COST: u32 = 12;

/// Hash checked when the account does not exist, so unknown emails cost as
/// much as wrong passwords.
static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

/// Errors raised while issuing or validating a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The token is malformed, forged or expired.
    #[error("invalid session token: {0}")]
    InvalidToken(String),

    /// No session secret is configured.
    #[error("session secret is not configured")]
    MissingSecret,

    /// The token could not be created.
    #[error("failed to issue session token: {0}")]
    Issue(String),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// JWT claims of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    /// User email at the time of login.
    pub email: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: usize,
}

/// Issues and validates session tokens.
#[derive(Clone)]
pub struct SessionManager {
    secret: String,
    ttl_secs: u64,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("secret", &"<redacted>")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl SessionManager {
    /// Creates a manager signing with `secret`.
    pub fn new(secret: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs,
        }
    }

    /// Token lifetime in seconds.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Issues a token for a user.
    pub fn issue(&self, user_id: &str, email: &str) -> Result<String, SessionError> {
        if self.secret.is_empty() {
            return Err(SessionError::MissingSecret);
        }
        let exp = Utc::now().timestamp().max(0) as u64 + self.ttl_secs;
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: exp as usize,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| SessionError::Issue(e.to_string()))
    }

    /// Validates a token and returns its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, SessionError> {
        if self.secret.is_empty() {
            return Err(SessionError::MissingSecret);
        }
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| SessionError::InvalidToken(e.to_string()))
    }
}

/// Hashes a password using bcrypt with the given cost (see [`BCRYPT_COST`]).
pub fn hash_password(password: &str, cost: u32) -> Result<String, SessionError> {
    bcrypt::hash(password, cost).map_err(|e| SessionError::Hash(e.to_string()))
}

/// Verifies a password against a bcrypt hash. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Runs a full-cost bcrypt check for an account that does not exist.
/// Always `false`.
pub fn reject_unknown_account(password: &str) -> bool {
    let dummy = DUMMY_HASH.get_or_init(|| hash_password("meridian-unknown-account", BCRYPT_COST).ok());
    if let Some(hash) = dummy {
        let _ = verify_password(password, hash);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip() {
        let sessions = SessionManager::new("test-secret", 60);
        let token = sessions.issue("user-1", "ed@acme.test").unwrap();
        let claims = sessions.validate(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "ed@acme.test");
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let token = SessionManager::new("one", 60).issue("u", "u@x.test").unwrap();
        let err = SessionManager::new("two", 60).validate(&token).unwrap_err();
        assert!(matches!(err, SessionError::InvalidToken(_)));
    }

    #[test]
    fn test_garbage_rejected() {
        let sessions = SessionManager::new("secret", 60);
        assert!(sessions.validate("invalid.token.here").is_err());
    }

    #[test]
    fn test_missing_secret() {
        let sessions = SessionManager::new("", 60);
        assert!(matches!(sessions.issue("u", "e"), Err(SessionError::MissingSecret)));
    }

    #[test]
    fn test_password_hash() {
        let hash = hash_password("correct horse", 4).unwrap();
        assert!(hash.starts_with("$2b$04$"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("correct horse", "not-a-hash"));
    }

    #[test]
    fn test_invalid_cost_is_hash_error() {
        assert!(matches!(hash_password("pw", 1), Err(SessionError::Hash(_))));
    }

    #[test]
    fn test_unknown_account_never_matches() {
        assert!(!reject_unknown_account("meridian-unknown-account"));
        assert!(DUMMY_HASH.get().is_some_and(Option::is_some));
    }
}
