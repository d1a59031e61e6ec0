//! Provider trait definitions.
//!
//! Two kinds of upstream services exist:
//! - [`ProviderAdapter`]: request/response services (text completion, image generation)
//! - [`JobProvider`]: asynchronous services where a job is submitted, then polled

use async_trait::async_trait;

use crate::errors::ProviderFailure;
use crate::jobs::JobState;
use crate::models::{JobId, Payload, ProviderRequest};

use super::capabilities::ProviderCapabilities;

/// Trait for synchronous AI providers.
///
/// Implement this trait to add a new upstream service. The registry uses
/// the provider's capabilities and priority to build fallback chains.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use stemtutor_orchestration::provider::{ProviderAdapter, ProviderCapabilities};
///
/// struct EchoProvider;
///
/// #[async_trait]
/// impl ProviderAdapter for EchoProvider {
///     fn id(&self) -> &'static str {
///         "echo"
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities::text()
///     }
///
///     // ... implement call and probe
/// }
/// ```
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// A short lowercase name like "mistral" or "qwen-image". Used in
    /// chain configuration, logging, health reports and `providerUsed`.
    fn id(&self) -> &'static str;

    /// Provider priority for ordering.
    ///
    /// Lower values = higher priority. Default is 10. Only used to order
    /// providers that no configured chain mentions.
    fn priority(&self) -> u8 {
        10
    }

    /// Capabilities this provider can serve.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Perform one attempt. Never retries internally.
    async fn call(&self, request: &ProviderRequest) -> Result<Payload, ProviderFailure>;

    /// Cheap availability check used by the health aggregator.
    async fn probe(&self) -> Result<(), ProviderFailure>;
}

/// Snapshot of a remote job returned by one poll.
#[derive(Clone, Debug, PartialEq)]
pub struct JobStatus<T> {
    pub state: JobState,
    /// Present once the job completed.
    pub payload: Option<T>,
    /// Provider error text, when the job failed.
    pub error: Option<String>,
}

impl<T> JobStatus<T> {
    pub fn pending(state: JobState) -> Self {
        Self {
            state,
            payload: None,
            error: None,
        }
    }

    pub fn completed(payload: T) -> Self {
        Self {
            state: JobState::Completed,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            state: JobState::Failed,
            payload: None,
            error: Some(error.into()),
        }
    }
}

/// Transcript as returned by the speech provider, before enhancement.
#[derive(Clone, Debug, PartialEq)]
pub struct RawTranscript {
    pub text: String,
    /// Provider confidence in 0..=1, when reported.
    pub confidence: Option<f64>,
}

/// Trait for asynchronous speech-to-text providers.
#[async_trait]
pub trait JobProvider: Send + Sync {
    fn id(&self) -> &'static str;

    /// Upload the audio and create a transcription job.
    async fn submit(&self, audio: &[u8]) -> Result<JobId, ProviderFailure>;

    /// Fetch the current status of a job.
    async fn poll(&self, job_id: &str) -> Result<JobStatus<RawTranscript>, ProviderFailure>;

    async fn probe(&self) -> Result<(), ProviderFailure>;
}
