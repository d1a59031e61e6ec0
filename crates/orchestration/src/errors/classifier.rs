//! Maps raw failure signals (status code, error text, transport fault) to an [`ErrorKind`].
//!
//! Classification is a pure function of its inputs. Rules are applied in a
//! fixed priority order, so a 503 whose body mentions an invalid API key is
//! still reported as `AuthFailed`.

use super::{ErrorKind, ProviderFailure, TransportFault};

const AUTH_MARKERS: &[&str] = &[
    "unauthorized",
    "authentication",
    "invalid api key",
    "invalid_api_key",
    "forbidden",
    "permission denied",
];

const RATE_MARKERS: &[&str] = &[
    "rate limit",
    "rate-limit",
    "rate_limit",
    "too many requests",
    "capacity exceeded",
    "quota",
];

const TIMEOUT_MARKERS: &[&str] = &["timeout", "timed out", "deadline exceeded"];

const NETWORK_MARKERS: &[&str] = &[
    "getaddrinfo",
    "dns",
    "name resolution",
    "connection refused",
    "connection reset",
    "connection error",
    "error sending request",
    "network is unreachable",
];

const INVALID_RESPONSE_MARKERS: &[&str] = &[
    "missing field",
    "invalid json",
    "expected value",
    "unexpected response",
    "malformed",
];

/// Classify a failure from its HTTP status (if any) and message.
///
/// # Examples
///
/// ```
/// use stemtutor_orchestration::errors::{classify, ErrorKind};
///
/// assert_eq!(classify(Some(401), ""), ErrorKind::AuthFailed);
/// assert_eq!(classify(Some(429), ""), ErrorKind::RateLimited);
/// assert_eq!(classify(None, "Service tier capacity exceeded"), ErrorKind::RateLimited);
/// assert_eq!(classify(Some(502), "bad gateway"), ErrorKind::ServerError);
/// assert_eq!(classify(None, "something odd"), ErrorKind::Unknown);
/// ```
pub fn classify(raw_status: Option<u16>, raw_message: &str) -> ErrorKind {
    classify_signal(raw_status, raw_message, None)
}

/// Classify a [`ProviderFailure`], taking its transport fault into account.
pub fn classify_failure(failure: &ProviderFailure) -> ErrorKind {
    classify_signal(failure.status, &failure.message, failure.fault)
}

fn classify_signal(
    status: Option<u16>,
    message: &str,
    fault: Option<TransportFault>,
) -> ErrorKind {
    let message = message.to_lowercase();
    let mentions = |markers: &[&str]| markers.iter().any(|m| message.contains(m));

    if matches!(status, Some(401) | Some(403)) || mentions(AUTH_MARKERS) {
        return ErrorKind::AuthFailed;
    }
    if status == Some(429) || mentions(RATE_MARKERS) {
        return ErrorKind::RateLimited;
    }
    if status.is_some_and(|s| s >= 500) {
        return ErrorKind::ServerError;
    }
    if fault == Some(TransportFault::Timeout) || mentions(TIMEOUT_MARKERS) {
        return ErrorKind::Timeout;
    }
    if fault == Some(TransportFault::Connect) || mentions(NETWORK_MARKERS) {
        return ErrorKind::NetworkUnreachable;
    }
    if fault == Some(TransportFault::Decode) || mentions(INVALID_RESPONSE_MARKERS) {
        return ErrorKind::InvalidResponse;
    }
    ErrorKind::Unknown
}
