//! Transcription job lifecycle.
//!
//! ```text
//! Submitted -> Queued -> Processing -> Completed
//!     \           \          \
//!      +-----------+----------+-----> Failed
//! ```
//!
//! Transitions only move forward. `Completed` and `Failed` are terminal.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;

use crate::models::JobId;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobState {
    Submitted,
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            Self::Submitted => 0,
            Self::Queued => 1,
            Self::Processing => 2,
            Self::Completed | Self::Failed => 3,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Submitted => "submitted",
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobTransitionError {
    #[error("job already finished in state {0}")]
    AlreadyTerminal(JobState),

    #[error("cannot move job back from {from} to {to}")]
    Backward { from: JobState, to: JobState },
}

/// A job owned by the poller for the duration of one request.
#[derive(Clone, Debug)]
pub struct TranscriptionJob {
    pub job_id: JobId,
    state: JobState,
    pub created_at: DateTime<Utc>,
    pub deadline: Instant,
}

impl TranscriptionJob {
    pub fn new(job_id: impl Into<JobId>, deadline: Instant) -> Self {
        Self {
            job_id: job_id.into(),
            state: JobState::Submitted,
            created_at: Utc::now(),
            deadline,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Move to `next`. Reporting the current non-terminal state again is a no-op.
    pub fn advance(&mut self, next: JobState) -> Result<(), JobTransitionError> {
        if self.state.is_terminal() {
            return Err(JobTransitionError::AlreadyTerminal(self.state));
        }
        if next.rank() < self.state.rank() {
            return Err(JobTransitionError::Backward {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}
