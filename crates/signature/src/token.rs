//! Signature token construction.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Computes the request signature: HMAC-SHA256 keyed by `secret` over
/// `request_id ‖ device_id ‖ user_agent ‖ timestamp`, as lowercase hex.
///
/// ```
/// let sig = meridian_signature::compute_signature("req-1", "dev-1", "client/1.0", 1_700_000_000_000, "s3cret");
/// assert_eq!(sig.len(), 64);
/// ```
pub fn compute_signature(request_id: &str, device_id: &str, user_agent: &str, timestamp: i64, secret: &str) -> String {
    // new_from_slice accepts any key length for HMAC
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return String::new(),
    };
    mac.update(request_id.as_bytes());
    mac.update(device_id.as_bytes());
    mac.update(user_agent.as_bytes());
    mac.update(timestamp.to_string().as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time, byte-for-byte comparison of two signatures.
pub fn signatures_match(expected: &str, provided: &str) -> bool {
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signs_concatenation() {
        let sig = compute_signature("req-1", "dev-1", "client/1.0", 1_700_000_000_000, "key");

        let mut mac = HmacSha256::new_from_slice(b"key").unwrap();
        mac.update(b"req-1dev-1client/1.01700000000000");
        assert_eq!(sig, hex::encode(mac.finalize().into_bytes()));
    }

    #[test]
    fn test_lowercase_hex() {
        let sig = compute_signature("r", "d", "u", 1, "s");
        assert_eq!(sig.len(), 64);
        assert!(sig.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    }

    #[test]
    fn test_signatures_match() {
        let sig = compute_signature("r", "d", "u", 1, "s");
        assert!(signatures_match(&sig, &sig));
        assert!(!signatures_match(&sig, &sig.to_ascii_uppercase()));
        assert!(!signatures_match(&sig, &sig[..63]));
        assert!(!signatures_match(&sig, &compute_signature("r", "d", "u", 2, "s")));
    }
}
