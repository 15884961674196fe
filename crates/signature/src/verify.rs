//! Server-side verification of signed requests.

use std::fmt;

use chrono::Utc;
use http::HeaderMap;
use tracing::{debug, warn};

use crate::error::{SignatureFailure, SignatureProblem};
use crate::headers::SignatureHeaders;
use crate::token::{compute_signature, signatures_match};

/// Default time-to-live of a signed request, in milliseconds (5 minutes).
pub const DEFAULT_TTL_MS: u64 = 300_000;

/// Default tolerance for client clocks running ahead, in milliseconds.
pub const DEFAULT_MAX_SKEW_MS: u64 = 300_000;

/// Verifies signed requests against a shared secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
    ttl_ms: u64,
    max_skew_ms: u64,
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"<redacted>")
            .field("ttl_ms", &self.ttl_ms)
            .field("max_skew_ms", &self.max_skew_ms)
            .finish()
    }
}

impl SignatureVerifier {
    /// Creates a verifier with the default TTL and clock skew.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl_ms: DEFAULT_TTL_MS,
            max_skew_ms: DEFAULT_MAX_SKEW_MS,
        }
    }

    /// Sets the TTL in milliseconds.
    pub fn with_ttl(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    /// The TTL in milliseconds.
    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    /// Sets how far ahead of the server clock a timestamp may be, in
    /// milliseconds.
    pub fn with_max_skew(mut self, max_skew_ms: u64) -> Self {
        self.max_skew_ms = max_skew_ms;
        self
    }

    /// The allowed clock skew in milliseconds.
    pub fn max_skew_ms(&self) -> u64 {
        self.max_skew_ms
    }

    /// Verifies a request against the system clock.
    ///
    /// # Errors
    ///
    /// See [`verify_at`](Self::verify_at).
    pub fn verify(&self, headers: &HeaderMap) -> Result<(), SignatureFailure> {
        self.verify_at(headers, Utc::now().timestamp_millis())
    }

    /// Verifies a request as of `now_ms` (epoch milliseconds).
    ///
    /// # Errors
    ///
    /// Header validation problems are reported alone. With valid headers,
    /// an expired timestamp and a mismatching signature are both reported,
    /// in that order.
    pub fn verify_at(&self, headers: &HeaderMap, now_ms: i64) -> Result<(), SignatureFailure> {
        let parsed = SignatureHeaders::from_header_map(headers).inspect_err(|failure| {
            warn!(error = %failure, "Rejected signed request with invalid headers");
        })?;
        self.verify_headers_at(&parsed, now_ms)
    }

    /// Verifies already parsed headers as of `now_ms`.
    ///
    /// # Errors
    ///
    /// Fails alone when the secret is empty. Otherwise expiry (or a
    /// timestamp beyond the clock skew) and signature mismatch, both
    /// reported when both apply.
    pub fn verify_headers_at(&self, headers: &SignatureHeaders, now_ms: i64) -> Result<(), SignatureFailure> {
        if self.secret.is_empty() {
            warn!(request_id = %headers.request_id, "Rejected signed request, no signing secret configured");
            return Err(SignatureProblem::NoSecret.into());
        }

        let mut problems = Vec::new();

        let age_ms = now_ms.saturating_sub(headers.timestamp);
        if age_ms > i64::try_from(self.ttl_ms).unwrap_or(i64::MAX) {
            problems.push(SignatureProblem::Expired {
                timestamp: headers.timestamp,
                ttl_ms: self.ttl_ms,
            });
        } else if age_ms.saturating_neg() > i64::try_from(self.max_skew_ms).unwrap_or(i64::MAX) {
            problems.push(SignatureProblem::FromFuture {
                timestamp: headers.timestamp,
                max_skew_ms: self.max_skew_ms,
            });
        }

        let expected = compute_signature(
            &headers.request_id,
            &headers.device_id,
            &headers.user_agent,
            headers.timestamp,
            &self.secret,
        );
        if !signatures_match(&expected, &headers.signature) {
            problems.push(SignatureProblem::InvalidSignature);
        }

        if problems.is_empty() {
            debug!(
                request_id = %headers.request_id,
                device_id = %headers.device_id,
                age_ms,
                "Verified request signature"
            );
            Ok(())
        } else {
            let failure = SignatureFailure::new(problems);
            warn!(
                request_id = %headers.request_id,
                device_id = %headers.device_id,
                error = %failure,
                "Rejected signed request"
            );
            Err(failure)
        }
    }
}

/// Verifies a request's signature headers against `secret` and `ttl_ms`
/// using the system clock.
///
/// # Errors
///
/// See [`SignatureVerifier::verify_at`].
pub fn verify_request(headers: &HeaderMap, secret: &str, ttl_ms: u64) -> Result<(), SignatureFailure> {
    SignatureVerifier::new(secret).with_ttl(ttl_ms).verify(headers)
}
