/// Classification for retry policy.
///
/// Used by the retry executor to decide whether a failed attempt against a
/// provider should be repeated.
///
/// # Behavior Summary
///
/// | Class | Retry on attempt 0? | Retry on later attempts? |
/// |-------|---------------------|--------------------------|
/// | `Never` | No | No |
/// | `WithBackoff` | Yes | Yes (until attempts run out) |
/// | `FirstAttemptOnly` | Yes | No |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - bad credentials or a payload we cannot parse.
    /// Repeating the same request cannot produce a different answer.
    Never,

    /// Retry with exponential backoff.
    ///
    /// Used for transient conditions like rate limiting (429), 5xx responses,
    /// timeouts and connection failures.
    WithBackoff,

    /// Retry once, then give up.
    ///
    /// Used for failures we could not classify: we are optimistic the first
    /// time, but a second unexplained failure aborts the provider.
    FirstAttemptOnly,
}

impl RetryClass {
    /// Whether a failure of this class observed on `attempt_index` (0-based)
    /// may be followed by another attempt.
    pub fn allows_retry(self, attempt_index: u32) -> bool {
        match self {
            Self::Never => false,
            Self::WithBackoff => true,
            Self::FirstAttemptOnly => attempt_index == 0,
        }
    }
}
