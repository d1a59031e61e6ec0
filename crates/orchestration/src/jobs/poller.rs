//! Submit-then-poll driver for asynchronous provider jobs.

use std::future::Future;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::{sleep_until, timeout_at, Instant};

use super::state::{JobState, TranscriptionJob};
use crate::errors::{classify, AttemptFailure, AttemptResult, ErrorKind, ProviderFailure};
use crate::models::JobId;
use crate::provider::JobStatus;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_JOB_DEADLINE: Duration = Duration::from_secs(300);
/// Shorter intervals, including zero, are raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Roughly 30 years; stands in for deadlines past the clock's range.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `now + after`, saturating at a far-future instant instead of overflowing.
fn instant_after(after: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(after)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// A finished job and its result.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletedJob<T> {
    pub job_id: JobId,
    pub payload: T,
    /// Number of status polls made before completion.
    pub polls: u32,
}

/// Drives one job from submission to a terminal state, bounded by a deadline.
///
/// The deadline is enforced on our side only. Once it passes the poller
/// stops waiting and reports `Timeout`, even though the remote job may
/// still finish later.
#[derive(Clone, Debug)]
pub struct AsyncJobPoller {
    provider: String,
    poll_interval: Duration,
    deadline: Duration,
}

impl AsyncJobPoller {
    pub fn new(provider: impl Into<String>, poll_interval: Duration, deadline: Duration) -> Self {
        Self {
            provider: provider.into(),
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            deadline,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Submit a job with `submit`, then call `poll` every `poll_interval`
    /// until the job completes, fails, or the deadline passes.
    ///
    /// A submission failure returns at once without polling. A failed poll
    /// request is terminal.
    pub async fn run<T, S, SFut, P, PFut>(&self, submit: S, mut poll: P) -> AttemptResult<CompletedJob<T>>
    where
        S: FnOnce() -> SFut,
        SFut: Future<Output = Result<JobId, ProviderFailure>>,
        P: FnMut(JobId) -> PFut,
        PFut: Future<Output = Result<JobStatus<T>, ProviderFailure>>,
    {
        let deadline_at = instant_after(self.deadline);

        let job_id = match timeout_at(deadline_at, submit()).await {
            Ok(Ok(job_id)) => job_id,
            Ok(Err(failure)) => {
                warn!("Job submission to '{}' failed: {}", self.provider, failure);
                let mut failure = AttemptFailure::from_provider(&self.provider, failure);
                failure.attempts = 0;
                return Err(failure);
            }
            Err(_) => return Err(self.timed_out("submission", 0)),
        };

        let mut job = TranscriptionJob::new(job_id, deadline_at);
        info!("Job '{}' submitted to '{}'", job.job_id, self.provider);
        let mut polls: u32 = 0;

        loop {
            let wake_at = instant_after(self.poll_interval).min(job.deadline);
            sleep_until(wake_at).await;

            if job.is_expired() {
                return Err(self.timed_out(&job.job_id, polls));
            }

            polls += 1;
            let status = match timeout_at(job.deadline, poll(job.job_id.clone())).await {
                Ok(Ok(status)) => status,
                Ok(Err(failure)) => {
                    warn!("Polling job '{}' failed: {}", job.job_id, failure);
                    let mut failure = AttemptFailure::from_provider(&self.provider, failure);
                    failure.attempts = polls;
                    return Err(failure);
                }
                Err(_) => return Err(self.timed_out(&job.job_id, polls)),
            };

            if let Err(e) = job.advance(status.state) {
                warn!("Ignoring status report for job '{}': {}", job.job_id, e);
                continue;
            }

            match job.state() {
                JobState::Completed => {
                    let Some(payload) = status.payload else {
                        let mut failure = AttemptFailure::new(
                            &self.provider,
                            ErrorKind::InvalidResponse,
                            format!("job {} completed without a result", job.job_id),
                        );
                        failure.attempts = polls;
                        return Err(failure);
                    };
                    info!("Job '{}' completed after {} polls", job.job_id, polls);
                    return Ok(CompletedJob {
                        job_id: job.job_id,
                        payload,
                        polls,
                    });
                }
                JobState::Failed => {
                    let message = status
                        .error
                        .unwrap_or_else(|| "job failed without an error message".to_string());
                    let kind = match classify(None, &message) {
                        ErrorKind::Unknown => ErrorKind::ServerError,
                        specific => specific,
                    };
                    warn!("Job '{}' failed with {}: {}", job.job_id, kind, message);
                    let mut failure = AttemptFailure::new(&self.provider, kind, message);
                    failure.attempts = polls;
                    return Err(failure);
                }
                state => debug!("Job '{}' is {}", job.job_id, state),
            }
        }
    }

    fn timed_out(&self, job: &str, polls: u32) -> AttemptFailure {
        warn!(
            "Job '{}' on '{}' did not finish within {:?}",
            job, self.provider, self.deadline
        );
        let mut failure = AttemptFailure::new(
            &self.provider,
            ErrorKind::Timeout,
            format!("job {} did not finish within {}s", job, self.deadline.as_secs()),
        );
        failure.attempts = polls;
        failure
    }
}

impl Default for AsyncJobPoller {
    fn default() -> Self {
        Self::new("job", DEFAULT_POLL_INTERVAL, DEFAULT_JOB_DEADLINE)
    }
}
