//! Request signatures for tenant machine clients.
//!
//! A machine client signs each request with a secret it shares with the
//! server. The server checks three things, in order:
//!
//! 1. all five headers are present and well formed
//!    (`x-request-id`, `x-device-id`, `x-user-agent`, `x-timestamp`, `x-signature`);
//! 2. the timestamp is no older than the TTL;
//! 3. the signature matches HMAC-SHA256 over the first four values.
//!
//! Failure carries every detected problem in one message.
//!
//! ```
//! use meridian_signature::{RequestSigner, SignatureVerifier};
//!
//! let signer = RequestSigner::new("s3cret", "kiosk-7", "kiosk/2.1");
//! let signed = signer.sign("req-1", 1_700_000_000_000);
//!
//! let mut headers = http::HeaderMap::new();
//! signed.apply(&mut headers).unwrap();
//!
//! let verifier = SignatureVerifier::new("s3cret");
//! assert!(verifier.verify_at(&headers, 1_700_000_060_000).is_ok());
//! assert!(verifier.verify_at(&headers, 1_700_000_400_000).is_err());
//! ```

#![warn(missing_docs)]

mod error;
pub mod headers;
mod signer;
mod token;
mod verify;

pub use error::{SignatureFailure, SignatureProblem};
pub use headers::SignatureHeaders;
pub use signer::{RequestSigner, SignedRequest};
pub use token::{compute_signature, signatures_match};
pub use verify::{DEFAULT_MAX_SKEW_MS, DEFAULT_TTL_MS, SignatureVerifier, verify_request};
