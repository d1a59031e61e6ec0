//! Asynchronous provider jobs (speech transcription).
//!
//! - `state` - Job lifecycle and forward-only transitions
//! - `poller` - Submit, poll at a fixed interval, enforce a deadline
//! - `enhancer` - Transcript post-processing
//! - `transcription` - Poller plus enhancement for speech-to-text

mod enhancer;
mod poller;
mod state;
mod transcription;

pub use enhancer::{PassThrough, SentenceCaseEnhancer, TranscriptEnhancer};
pub use poller::{
    AsyncJobPoller, CompletedJob, DEFAULT_JOB_DEADLINE, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL,
};
pub use state::{JobState, JobTransitionError, TranscriptionJob};
pub use transcription::{TranscriptionPipeline, DEFAULT_CONFIDENCE};
