//! Signature verification failures.

use std::fmt;

use thiserror::Error;

/// One problem detected while verifying a signed request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureProblem {
    /// A required header is absent.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// A required header is present but malformed.
    #[error("invalid header {name}: {reason}")]
    InvalidHeader {
        /// Lower-cased header name.
        name: &'static str,
        /// What is wrong with the value.
        reason: String,
    },

    /// The request is older than the allowed time-to-live.
    #[error("request expired: timestamp {timestamp} is older than the allowed {ttl_ms} ms")]
    Expired {
        /// The stale `x-timestamp` value.
        timestamp: i64,
        /// The TTL the request was checked against.
        ttl_ms: u64,
    },

    /// The request is stamped further in the future than the allowed
    /// clock skew.
    #[error("request timestamp {timestamp} is more than {max_skew_ms} ms in the future")]
    FromFuture {
        /// The offending `x-timestamp` value.
        timestamp: i64,
        /// The skew the request was checked against.
        max_skew_ms: u64,
    },

    /// The recomputed signature does not match `x-signature`.
    #[error("invalid signature")]
    InvalidSignature,

    /// The server has no secret to verify against.
    #[error("request signing is not configured")]
    NoSecret,
}

impl SignatureProblem {
    /// Returns `true` for header validation problems.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SignatureProblem::MissingHeader(_) | SignatureProblem::InvalidHeader { .. }
        )
    }
}

/// Failed verification, carrying every detected problem.
///
/// Displays as one human-readable message with the problems joined by
/// `"; "`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureFailure {
    problems: Vec<SignatureProblem>,
}

impl SignatureFailure {
    pub(crate) fn new(problems: Vec<SignatureProblem>) -> Self {
        debug_assert!(!problems.is_empty());
        Self { problems }
    }

    /// The detected problems, in detection order.
    pub fn problems(&self) -> &[SignatureProblem] {
        &self.problems
    }

    /// Returns `true` if the headers failed validation.
    pub fn is_validation(&self) -> bool {
        self.problems.iter().any(SignatureProblem::is_validation)
    }

    /// Returns `true` if the request was expired or stamped too far in the
    /// future.
    pub fn is_expired(&self) -> bool {
        self.problems
            .iter()
            .any(|p| matches!(p, SignatureProblem::Expired { .. } | SignatureProblem::FromFuture { .. }))
    }

    /// Returns `true` if the signature did not match.
    pub fn is_invalid_signature(&self) -> bool {
        self.problems.contains(&SignatureProblem::InvalidSignature)
    }
}

impl fmt::Display for SignatureFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, problem) in self.problems.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", problem)?;
        }
        Ok(())
    }
}

impl std::error::Error for SignatureFailure {}

impl From<SignatureProblem> for SignatureFailure {
    fn from(problem: SignatureProblem) -> Self {
        Self::new(vec![problem])
    }
}
