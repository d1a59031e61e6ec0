use std::fmt;

use serde::{Deserialize, Serialize};

use super::RetryClass;

/// Fixed taxonomy for failed provider calls.
///
/// Every failed attempt carries exactly one kind. The kind decides both the
/// retry behavior (see [`ErrorKind::retry_class`]) and what the end user is
/// told when no provider could answer (see [`ErrorKind::disposition`]).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// HTTP 429 or a quota/capacity message.
    RateLimited,
    /// HTTP 401/403 or an invalid credential message.
    AuthFailed,
    /// DNS resolution or connection establishment failed.
    NetworkUnreachable,
    /// The request did not complete in time.
    Timeout,
    /// HTTP 5xx.
    ServerError,
    /// The provider answered, but not in the shape we expect.
    InvalidResponse,
    /// Anything we could not classify.
    Unknown,
}

/// What the caller should do with a chain's final failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Disposition {
    /// Answer with canned content instead of an error.
    Degrade,
    /// Surface an error with this user-facing message.
    Surface(&'static str),
}

impl Disposition {
    pub fn user_message(self) -> Option<&'static str> {
        match self {
            Self::Degrade => None,
            Self::Surface(message) => Some(message),
        }
    }
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 7] = [
        Self::RateLimited,
        Self::AuthFailed,
        Self::NetworkUnreachable,
        Self::Timeout,
        Self::ServerError,
        Self::InvalidResponse,
        Self::Unknown,
    ];

    /// Returns the retry classification for this kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use stemtutor_orchestration::errors::{ErrorKind, RetryClass};
    ///
    /// assert_eq!(ErrorKind::RateLimited.retry_class(), RetryClass::WithBackoff);
    /// assert_eq!(ErrorKind::AuthFailed.retry_class(), RetryClass::Never);
    /// assert_eq!(ErrorKind::Unknown.retry_class(), RetryClass::FirstAttemptOnly);
    /// ```
    pub fn retry_class(self) -> RetryClass {
        match self {
            Self::RateLimited | Self::ServerError | Self::Timeout | Self::NetworkUnreachable => {
                RetryClass::WithBackoff
            }
            Self::AuthFailed | Self::InvalidResponse => RetryClass::Never,
            Self::Unknown => RetryClass::FirstAttemptOnly,
        }
    }

    /// Whether a failure of this kind on `attempt_index` (0-based) may be retried.
    pub fn is_retryable(self, attempt_index: u32) -> bool {
        self.retry_class().allows_retry(attempt_index)
    }

    /// Maps the last observed kind of an exhausted chain to the user-visible outcome.
    pub fn disposition(self) -> Disposition {
        match self {
            Self::RateLimited => Disposition::Degrade,
            Self::AuthFailed => Disposition::Surface("Authentication failed, contact support."),
            Self::NetworkUnreachable | Self::Timeout => {
                Disposition::Surface("Service temporarily unreachable, please retry.")
            }
            Self::InvalidResponse => {
                Disposition::Surface("The AI service returned an unexpected response.")
            }
            Self::ServerError | Self::Unknown => {
                Disposition::Surface("Something went wrong, please try again later.")
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RateLimited => "RATE_LIMITED",
            Self::AuthFailed => "AUTH_FAILED",
            Self::NetworkUnreachable => "NETWORK_UNREACHABLE",
            Self::Timeout => "TIMEOUT",
            Self::ServerError => "SERVER_ERROR",
            Self::InvalidResponse => "INVALID_RESPONSE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_kinds_retry_on_every_attempt() {
        for kind in [
            ErrorKind::RateLimited,
            ErrorKind::ServerError,
            ErrorKind::Timeout,
            ErrorKind::NetworkUnreachable,
        ] {
            assert!(kind.is_retryable(0), "{kind} should retry on attempt 0");
            assert!(kind.is_retryable(1), "{kind} should retry on attempt 1");
            assert!(kind.is_retryable(5), "{kind} should retry on attempt 5");
        }
    }

    #[test]
    fn test_auth_and_invalid_response_never_retry() {
        for kind in [ErrorKind::AuthFailed, ErrorKind::InvalidResponse] {
            assert!(!kind.is_retryable(0));
            assert!(!kind.is_retryable(1));
        }
    }

    #[test]
    fn test_unknown_retries_only_after_first_attempt() {
        assert!(ErrorKind::Unknown.is_retryable(0));
        assert!(!ErrorKind::Unknown.is_retryable(1));
        assert!(!ErrorKind::Unknown.is_retryable(2));
    }

    #[test]
    fn test_rate_limited_degrades() {
        assert_eq!(ErrorKind::RateLimited.disposition(), Disposition::Degrade);
    }

    #[test]
    fn test_surfaced_messages() {
        assert_eq!(
            ErrorKind::AuthFailed.disposition(),
            Disposition::Surface("Authentication failed, contact support.")
        );
        assert_eq!(
            ErrorKind::Timeout.disposition(),
            ErrorKind::NetworkUnreachable.disposition()
        );
        assert_eq!(
            ErrorKind::ServerError.disposition(),
            ErrorKind::Unknown.disposition()
        );
        for kind in ErrorKind::ALL {
            if kind != ErrorKind::RateLimited {
                assert!(matches!(kind.disposition(), Disposition::Surface(_)));
            }
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ErrorKind::NetworkUnreachable).unwrap();
        assert_eq!(json, "\"networkUnreachable\"");
        let kind: ErrorKind = serde_json::from_str("\"rateLimited\"").unwrap();
        assert_eq!(kind, ErrorKind::RateLimited);
    }
}
