//! Error types and failure classification for provider orchestration.
//!
//! This module provides:
//! - [`ProviderFailure`]: the raw signal an adapter surfaces for one failed call
//! - [`ErrorKind`]: the fixed taxonomy every failure is classified into
//! - [`AttemptFailure`]: the failure value returned by the retry executor,
//!   the fallback dispatcher and the job poller
//! - [`RetryClass`]: how a kind of failure should be retried
//! - [`TutorError`]: request-level errors raised before any provider is called

mod classifier;
mod kind;
mod retry;

pub use classifier::{classify, classify_failure};
pub use kind::{Disposition, ErrorKind};
pub use retry::RetryClass;

use thiserror::Error;

use crate::models::Capability;

/// Result of one provider attempt, one retried provider, or a whole chain.
pub type AttemptResult<T> = Result<T, AttemptFailure>;

/// Low-level transport condition observed while talking to a provider.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransportFault {
    /// The request or read timed out.
    Timeout,
    /// DNS resolution or TCP/TLS connect failed.
    Connect,
    /// The body could not be decoded into the expected shape.
    Decode,
}

/// Raw failure surfaced by a provider adapter.
///
/// Adapters convert every transport or protocol error into this type at
/// their boundary, so nothing else in the crate has to know about
/// `reqwest` or `serde_json` errors.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ProviderFailure {
    /// HTTP status, when the provider answered at all.
    pub status: Option<u16>,
    /// Provider or transport message.
    pub message: String,
    /// Transport condition, when one was detected.
    pub fault: Option<TransportFault>,
}

impl ProviderFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            fault: None,
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            fault: None,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::with_fault(TransportFault::Timeout, message)
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self::with_fault(TransportFault::Connect, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::with_fault(TransportFault::Decode, message)
    }

    fn with_fault(fault: TransportFault, message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            fault: Some(fault),
        }
    }

    /// Classify this failure.
    pub fn kind(&self) -> ErrorKind {
        classify_failure(self)
    }
}

impl From<reqwest::Error> for ProviderFailure {
    fn from(err: reqwest::Error) -> Self {
        let fault = if err.is_timeout() {
            Some(TransportFault::Timeout)
        } else if err.is_connect() {
            Some(TransportFault::Connect)
        } else if err.is_decode() {
            Some(TransportFault::Decode)
        } else {
            None
        };

        Self {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
            fault,
        }
    }
}

impl From<serde_json::Error> for ProviderFailure {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(format!("invalid json: {}", err))
    }
}

/// Failure of an attempt, a retried provider, or a whole fallback chain.
///
/// Carries exactly one [`ErrorKind`]. `exhausted` is set by the fallback
/// dispatcher when every provider of the chain failed and this is the last
/// failure observed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{provider}: {kind} - {message}")]
pub struct AttemptFailure {
    /// Provider that produced the failure (empty when no provider was tried).
    pub provider: String,
    /// Classified kind.
    pub kind: ErrorKind,
    /// Provider or transport message.
    pub message: String,
    /// Whether the kind allowed another attempt at the point it was observed.
    pub retryable: bool,
    /// Number of calls made to the failing provider (or polls, for jobs).
    pub attempts: u32,
    /// Every provider in the chain failed.
    pub exhausted: bool,
}

impl AttemptFailure {
    pub fn new(provider: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            kind,
            message: message.into(),
            retryable: kind.is_retryable(0),
            attempts: 1,
            exhausted: false,
        }
    }

    /// Build a failure from a raw provider failure.
    pub fn from_provider(provider: impl Into<String>, failure: ProviderFailure) -> Self {
        let kind = failure.kind();
        Self::new(provider, kind, failure.message)
    }

    /// A chain with no providers: nothing was attempted.
    pub fn no_providers(capability: Capability) -> Self {
        Self {
            provider: String::new(),
            kind: ErrorKind::Unknown,
            message: format!("No providers configured for {}", capability),
            retryable: false,
            attempts: 0,
            exhausted: true,
        }
    }

    /// The caller should answer with canned content rather than an error.
    pub fn should_degrade(&self) -> bool {
        self.kind == ErrorKind::RateLimited
    }

    /// True when the failure was produced without calling any provider.
    pub fn is_unattempted(&self) -> bool {
        self.attempts == 0
    }

    pub fn disposition(&self) -> Disposition {
        self.kind.disposition()
    }
}

/// Request-level errors raised before orchestration starts.
#[derive(Error, Debug)]
pub enum TutorError {
    /// The request payload is missing or malformed.
    #[error("{0}")]
    InvalidInput(String),

    /// No provider is registered for this capability.
    #[error("No provider configured for {0}")]
    NotConfigured(Capability),
}

impl TutorError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
