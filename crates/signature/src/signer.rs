//! Client-side request signing.

use std::fmt;

use chrono::Utc;
use http::{HeaderMap, HeaderValue, header::InvalidHeaderValue};

use crate::headers::{X_DEVICE_ID, X_REQUEST_ID, X_SIGNATURE, X_TIMESTAMP, X_USER_AGENT};
use crate::token::compute_signature;

/// Produces the signature headers for outgoing machine requests.
#[derive(Clone)]
pub struct RequestSigner {
    secret: String,
    device_id: String,
    user_agent: String,
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("secret", &"<redacted>")
            .field("device_id", &self.device_id)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// The five header values of one signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// `x-request-id`
    pub request_id: String,
    /// `x-device-id`
    pub device_id: String,
    /// `x-user-agent`
    pub user_agent: String,
    /// `x-timestamp`
    pub timestamp: i64,
    /// `x-signature`
    pub signature: String,
}

impl SignedRequest {
    /// `(name, value)` pairs, lower-cased names.
    pub fn pairs(&self) -> [(&'static str, String); 5] {
        [
            (X_REQUEST_ID, self.request_id.clone()),
            (X_DEVICE_ID, self.device_id.clone()),
            (X_USER_AGENT, self.user_agent.clone()),
            (X_TIMESTAMP, self.timestamp.to_string()),
            (X_SIGNATURE, self.signature.clone()),
        ]
    }

    /// Writes the headers into an HTTP header map.
    ///
    /// # Errors
    ///
    /// Fails when a value is not a valid header value.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<(), InvalidHeaderValue> {
        for (name, value) in self.pairs() {
            headers.insert(name, HeaderValue::from_str(&value)?);
        }
        Ok(())
    }
}

impl RequestSigner {
    /// Creates a signer for a device.
    pub fn new(secret: impl Into<String>, device_id: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            device_id: device_id.into(),
            user_agent: user_agent.into(),
        }
    }

    /// Signs a request with an explicit request ID and timestamp.
    pub fn sign(&self, request_id: impl Into<String>, timestamp: i64) -> SignedRequest {
        let request_id = request_id.into();
        let signature = compute_signature(&request_id, &self.device_id, &self.user_agent, timestamp, &self.secret);
        SignedRequest {
            request_id,
            device_id: self.device_id.clone(),
            user_agent: self.user_agent.clone(),
            timestamp,
            signature,
        }
    }

    /// Signs a request now, with a fresh UUID v4 request ID.
    pub fn sign_now(&self) -> SignedRequest {
        self.sign(uuid::Uuid::new_v4().to_string(), Utc::now().timestamp_millis())
    }

    /// Signs a request now and returns the headers as a map.
    ///
    /// # Errors
    ///
    /// Fails when the device ID or user agent is not a valid header value.
    pub fn signed_headers(&self) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        self.sign_now().apply(&mut headers)?;
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SignatureProblem;
    use crate::headers::SignatureHeaders;
    use crate::verify::SignatureVerifier;

    const NOW: i64 = 1_700_000_000_000;

    fn signer() -> RequestSigner {
        RequestSigner::new("shared-secret", "dev-1", "client/1.0")
    }

    #[test]
    fn test_round_trip() {
        let headers = signer().signed_headers().unwrap();
        assert!(SignatureVerifier::new("shared-secret").verify(&headers).is_ok());
    }

    #[test]
    fn test_request_id_is_uuid() {
        let signed = signer().sign_now();
        assert!(uuid::Uuid::parse_str(&signed.request_id).is_ok());
        assert_ne!(signed.request_id, signer().sign_now().request_id);
    }

    #[test]
    fn test_any_single_differing_input_fails() {
        let verifier = SignatureVerifier::new("shared-secret");
        let signed = signer().sign("req-1", NOW);

        let mutations: [(&str, fn(&mut SignatureHeaders)); 4] = [
            ("request_id", |h| h.request_id.push('x')),
            ("device_id", |h| h.device_id = "dev-2".to_string()),
            ("user_agent", |h| h.user_agent = "client/2.0".to_string()),
            ("timestamp", |h| h.timestamp += 1),
        ];

        for (label, mutate) in mutations {
            let mut headers = SignatureHeaders::from_pairs(signed.pairs()).unwrap();
            assert!(verifier.verify_headers_at(&headers, NOW).is_ok());
            mutate(&mut headers);
            let failure = verifier.verify_headers_at(&headers, NOW).unwrap_err();
            assert_eq!(
                failure.problems(),
                &[SignatureProblem::InvalidSignature],
                "changing {} must invalidate the signature",
                label
            );
        }

        let headers = SignatureHeaders::from_pairs(signed.pairs()).unwrap();
        assert!(SignatureVerifier::new("other").verify_headers_at(&headers, NOW).is_err());
    }

    #[test]
    fn test_invalid_header_value() {
        let bad = RequestSigner::new("s", "dev\n1", "client");
        assert!(bad.signed_headers().is_err());
    }
}
