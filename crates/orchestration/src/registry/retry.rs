//! Bounded retry with exponential backoff for a single provider.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::errors::{AttemptFailure, AttemptResult, ErrorKind, ProviderFailure};

/// Retry schedule applied to each provider of a chain.
///
/// The delay after a failed attempt `i` (0-based) is
/// `base_backoff × multiplier^i`.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_backoff: Duration,
    multiplier: f64,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_BASE_BACKOFF: Duration = Duration::from_secs(1);
    pub const DEFAULT_MULTIPLIER: f64 = 2.0;

    /// Create a policy. `max_attempts` is raised to 1 and a non-finite or
    /// negative multiplier is replaced by the default.
    pub fn new(max_attempts: u32, base_backoff: Duration, multiplier: f64) -> Self {
        let multiplier = if multiplier.is_finite() && multiplier >= 0.0 {
            multiplier
        } else {
            Self::DEFAULT_MULTIPLIER
        };

        Self {
            max_attempts: max_attempts.max(1),
            base_backoff,
            multiplier,
        }
    }

    /// Upper bound on calls per provider; always at least 1.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_backoff(&self) -> Duration {
        self.base_backoff
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Backoff before the attempt following `attempt_index`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use stemtutor_orchestration::registry::RetryPolicy;
    ///
    /// let policy = RetryPolicy::default();
    /// assert_eq!(policy.delay_for(0), Duration::from_secs(1));
    /// assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    /// ```
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        let exponent = i32::try_from(attempt_index).unwrap_or(i32::MAX);
        let seconds = self.base_backoff.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    }

    /// Sum of every backoff a provider can incur before giving up.
    pub fn worst_case_backoff(&self) -> Duration {
        (0..self.max_attempts.saturating_sub(1))
            .map(|i| self.delay_for(i))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            base_backoff: Self::DEFAULT_BASE_BACKOFF,
            multiplier: Self::DEFAULT_MULTIPLIER,
        }
    }
}

/// Outcome reported for one attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum AttemptOutcome<'a> {
    Succeeded,
    Failed {
        kind: ErrorKind,
        message: &'a str,
        /// Backoff before the next attempt, or `None` when this was the last one.
        retry_in: Option<Duration>,
    },
}

/// One attempt against one provider.
#[derive(Clone, Debug, PartialEq)]
pub struct AttemptEvent<'a> {
    pub provider: &'a str,
    /// 1-based attempt number.
    pub attempt: u32,
    pub max_attempts: u32,
    pub outcome: AttemptOutcome<'a>,
}

/// Hook notified of every attempt. It cannot influence retrying.
pub trait AttemptObserver: Send + Sync {
    fn on_attempt(&self, event: &AttemptEvent<'_>);
}

/// Default observer: writes each attempt to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl AttemptObserver for LogObserver {
    fn on_attempt(&self, event: &AttemptEvent<'_>) {
        match &event.outcome {
            AttemptOutcome::Succeeded => debug!(
                "Provider '{}' succeeded on attempt {}/{}",
                event.provider, event.attempt, event.max_attempts
            ),
            AttemptOutcome::Failed {
                kind,
                message,
                retry_in: Some(delay),
            } => warn!(
                "Provider '{}' attempt {}/{} failed with {}: {}, retrying in {:?}",
                event.provider, event.attempt, event.max_attempts, kind, message, delay
            ),
            AttemptOutcome::Failed {
                kind,
                message,
                retry_in: None,
            } => warn!(
                "Provider '{}' attempt {}/{} failed with {}: {}, giving up",
                event.provider, event.attempt, event.max_attempts, kind, message
            ),
        }
    }
}

/// Runs one provider operation under a [`RetryPolicy`].
#[derive(Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    observer: Arc<dyn AttemptObserver>,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_observer(policy, Arc::new(LogObserver))
    }

    pub fn with_observer(policy: RetryPolicy, observer: Arc<dyn AttemptObserver>) -> Self {
        Self { policy, observer }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Call `operation` until it succeeds, fails with a kind that must not be
    /// retried, or `max_attempts` calls have been made.
    ///
    /// Backoff sleeps only suspend the calling task.
    pub async fn execute<T, F, Fut>(&self, provider: &str, mut operation: F) -> AttemptResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderFailure>>,
    {
        let max_attempts = self.policy.max_attempts;
        let mut attempt_index: u32 = 0;

        loop {
            let attempt = attempt_index + 1;

            let failure = match operation().await {
                Ok(value) => {
                    self.observer.on_attempt(&AttemptEvent {
                        provider,
                        attempt,
                        max_attempts,
                        outcome: AttemptOutcome::Succeeded,
                    });
                    return Ok(value);
                }
                Err(failure) => failure,
            };

            let kind = failure.kind();
            let retryable = kind.is_retryable(attempt_index);
            let retry_in = (retryable && attempt < max_attempts)
                .then(|| self.policy.delay_for(attempt_index));

            self.observer.on_attempt(&AttemptEvent {
                provider,
                attempt,
                max_attempts,
                outcome: AttemptOutcome::Failed {
                    kind,
                    message: &failure.message,
                    retry_in,
                },
            });

            let Some(delay) = retry_in else {
                return Err(AttemptFailure {
                    provider: provider.to_string(),
                    kind,
                    message: failure.message,
                    retryable,
                    attempts: attempt,
                    exhausted: false,
                });
            };

            tokio::time::sleep(delay).await;
            attempt_index += 1;
        }
    }
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}
