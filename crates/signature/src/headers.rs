//! Signature header names and parsing.

use http::HeaderMap;

use crate::error::{SignatureFailure, SignatureProblem};

/// Client-generated request identifier.
pub const X_REQUEST_ID: &str = "x-request-id";
/// Identifier of the calling device or service instance.
pub const X_DEVICE_ID: &str = "x-device-id";
/// Client user agent, signed separately from `User-Agent`.
pub const X_USER_AGENT: &str = "x-user-agent";
/// Signing time in milliseconds since the Unix epoch.
pub const X_TIMESTAMP: &str = "x-timestamp";
/// Lowercase hex HMAC-SHA256 over the other four headers.
pub const X_SIGNATURE: &str = "x-signature";

/// All required headers, in the order problems are reported.
pub const REQUIRED_HEADERS: [&str; 5] = [X_REQUEST_ID, X_DEVICE_ID, X_USER_AGENT, X_TIMESTAMP, X_SIGNATURE];

/// Length of a hex-encoded HMAC-SHA256 digest.
pub const SIGNATURE_HEX_LEN: usize = 64;

/// The validated signature headers of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeaders {
    /// `x-request-id`
    pub request_id: String,
    /// `x-device-id`
    pub device_id: String,
    /// `x-user-agent`
    pub user_agent: String,
    /// `x-timestamp`, epoch milliseconds.
    pub timestamp: i64,
    /// `x-signature`, as sent.
    pub signature: String,
}

impl SignatureHeaders {
    /// Reads and validates the signature headers of an HTTP request.
    ///
    /// # Errors
    ///
    /// A failure listing every missing or malformed header.
    pub fn from_header_map(headers: &HeaderMap) -> Result<Self, SignatureFailure> {
        parse(|name| {
            headers.get(name).map(|value| {
                value
                    .to_str()
                    .map(str::to_string)
                    .map_err(|_| "not valid visible ASCII".to_string())
            })
        })
    }

    /// Reads and validates the signature headers from `(name, value)` pairs.
    /// Names are matched case-insensitively; the last occurrence wins.
    ///
    /// # Errors
    ///
    /// A failure listing every missing or malformed header.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, SignatureFailure>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let pairs: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.as_ref().to_string()))
            .collect();

        parse(|name| {
            pairs
                .iter()
                .rev()
                .find(|(k, _)| k == name)
                .map(|(_, v)| Ok(v.clone()))
        })
    }
}

/// Validates the five headers using `lookup`, which returns `None` for an
/// absent header and `Err(reason)` for an undecodable one.
fn parse<F>(lookup: F) -> Result<SignatureHeaders, SignatureFailure>
where
    F: Fn(&'static str) -> Option<Result<String, String>>,
{
    let mut problems = Vec::new();

    let request_id = read(&lookup, X_REQUEST_ID, &mut problems);
    let device_id = read(&lookup, X_DEVICE_ID, &mut problems);
    let user_agent = read(&lookup, X_USER_AGENT, &mut problems);

    let timestamp = read(&lookup, X_TIMESTAMP, &mut problems).and_then(|raw| match raw.parse::<i64>() {
        Ok(ts) if ts >= 0 => Some(ts),
        _ => {
            problems.push(SignatureProblem::InvalidHeader {
                name: X_TIMESTAMP,
                reason: "must be a non-negative integer of epoch milliseconds".to_string(),
            });
            None
        }
    });

    let signature = read(&lookup, X_SIGNATURE, &mut problems).and_then(|sig| {
        if sig.len() == SIGNATURE_HEX_LEN && sig.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(sig)
        } else {
            problems.push(SignatureProblem::InvalidHeader {
                name: X_SIGNATURE,
                reason: format!("must be {} hex characters", SIGNATURE_HEX_LEN),
            });
            None
        }
    });

    match (request_id, device_id, user_agent, timestamp, signature) {
        (Some(request_id), Some(device_id), Some(user_agent), Some(timestamp), Some(signature))
            if problems.is_empty() =>
        {
            Ok(SignatureHeaders {
                request_id,
                device_id,
                user_agent,
                timestamp,
                signature,
            })
        }
        _ => Err(SignatureFailure::new(problems)),
    }
}

/// Reads one header, recording a problem when it is absent, undecodable or
/// blank. Surrounding whitespace is trimmed.
fn read<F>(lookup: &F, name: &'static str, problems: &mut Vec<SignatureProblem>) -> Option<String>
where
    F: Fn(&'static str) -> Option<Result<String, String>>,
{
    match lookup(name) {
        None => {
            problems.push(SignatureProblem::MissingHeader(name));
            None
        }
        Some(Err(reason)) => {
            problems.push(SignatureProblem::InvalidHeader { name, reason });
            None
        }
        Some(Ok(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                problems.push(SignatureProblem::InvalidHeader {
                    name,
                    reason: "must not be empty".to_string(),
                });
                None
            } else {
                Some(trimmed.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    const SIG: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn complete() -> Vec<(&'static str, &'static str)> {
        vec![
            ("X-Request-Id", "req-1"),
            ("X-Device-Id", "device-1"),
            ("X-User-Agent", "meridian-client/1.0"),
            ("X-Timestamp", "1700000000000"),
            ("X-Signature", SIG),
        ]
    }

    #[test]
    fn test_parse_complete_pairs() {
        let headers = SignatureHeaders::from_pairs(complete()).unwrap();
        assert_eq!(headers.request_id, "req-1");
        assert_eq!(headers.device_id, "device-1");
        assert_eq!(headers.user_agent, "meridian-client/1.0");
        assert_eq!(headers.timestamp, 1_700_000_000_000);
        assert_eq!(headers.signature, SIG);
    }

    #[test]
    fn test_each_missing_header_named() {
        for missing in REQUIRED_HEADERS {
            let pairs: Vec<_> = complete()
                .into_iter()
                .filter(|(k, _)| !k.eq_ignore_ascii_case(missing))
                .collect();
            let failure = SignatureHeaders::from_pairs(pairs).unwrap_err();
            assert_eq!(failure.problems(), &[SignatureProblem::MissingHeader(missing)]);
            assert!(failure.to_string().contains(missing));
        }
    }

    #[test]
    fn test_all_missing_reported_together() {
        let failure = SignatureHeaders::from_pairs(Vec::<(&str, &str)>::new()).unwrap_err();
        assert_eq!(failure.problems().len(), 5);
        assert!(failure.is_validation());
    }

    #[test]
    fn test_invalid_timestamp() {
        let mut pairs = complete();
        pairs[3] = ("x-timestamp", "yesterday");
        let failure = SignatureHeaders::from_pairs(pairs).unwrap_err();
        assert!(matches!(
            failure.problems(),
            [SignatureProblem::InvalidHeader { name: X_TIMESTAMP, .. }]
        ));
    }

    #[test]
    fn test_invalid_signature_shape() {
        let mut pairs = complete();
        pairs[4] = ("x-signature", "abc");
        let failure = SignatureHeaders::from_pairs(pairs).unwrap_err();
        assert!(matches!(
            failure.problems(),
            [SignatureProblem::InvalidHeader { name: X_SIGNATURE, .. }]
        ));
    }

    #[test]
    fn test_blank_value_rejected() {
        let mut pairs = complete();
        pairs[1] = ("x-device-id", "   ");
        let failure = SignatureHeaders::from_pairs(pairs).unwrap_err();
        assert!(failure.to_string().contains("x-device-id"));
    }

    #[test]
    fn test_from_header_map() {
        let mut map = HeaderMap::new();
        for (name, value) in complete() {
            map.insert(
                http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_static(value),
            );
        }
        let headers = SignatureHeaders::from_header_map(&map).unwrap();
        assert_eq!(headers.timestamp, 1_700_000_000_000);

        map.insert(X_USER_AGENT, HeaderValue::from_bytes(b"caf\xe9").unwrap());
        let failure = SignatureHeaders::from_header_map(&map).unwrap_err();
        assert!(matches!(
            failure.problems(),
            [SignatureProblem::InvalidHeader { name: X_USER_AGENT, .. }]
        ));
    }
}
