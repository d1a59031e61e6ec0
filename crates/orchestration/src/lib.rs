//! STEM Tutor Orchestration Crate
//!
//! This crate routes tutoring requests (solving problems, explaining
//! concepts, formula sheets, study tips, image generation and speech
//! transcription) to external AI providers and keeps answering when those
//! providers fail.
//!
//! # Overview
//!
//! The orchestration crate supports:
//! - Classification of every provider failure into a fixed [`ErrorKind`]
//! - Bounded retries with exponential backoff per provider
//! - Ordered fallback chains per capability, with a preferred provider
//! - Canned content when every provider is rate limited
//! - Deadline-bounded polling of asynchronous transcription jobs
//! - Spoken problems: a transcription followed by a solve
//! - Concurrent health probes across all providers
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! | CapabilityRequest| --> |   TutorService   |
//! +------------------+     +------------------+
//!                            |             |
//!                            v             v
//!                  +----------------+  +------------------+
//!                  |ProviderRegistry|  |  AsyncJobPoller  |  (transcription)
//!                  +----------------+  +------------------+
//!                            |
//!                            v
//!                  +------------------+
//!                  |FallbackDispatcher|  (one provider after another)
//!                  +------------------+
//!                            |
//!                            v
//!                  +------------------+
//!                  |  RetryExecutor   |  (backoff per provider)
//!                  +------------------+
//!                            |
//!                            v
//!                  +------------------+
//!                  | ProviderAdapter  |  (Mistral, DeepSeek, Together, ...)
//!                  +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Capability`] - Operation offered to end users
//! - [`CapabilityRequest`] / [`CapabilityResponse`] - Request/response envelope
//! - [`Payload`] - Successful result (text, image, transcript)
//! - [`AttemptFailure`] - Classified failure of an attempt or chain
//! - [`HealthReport`] - Aggregated provider availability

pub mod errors;
pub mod health;
pub mod jobs;
pub mod models;
pub mod prompts;
pub mod provider;
pub mod registry;
pub mod service;
pub mod stub;

#[cfg(test)]
mod testing;

// Re-export error types
pub use errors::{
    classify, AttemptFailure, AttemptResult, Disposition, ErrorKind, ProviderFailure, RetryClass,
    TutorError,
};

// Re-export all public types from models
pub use models::{
    Capability, CapabilityInput, CapabilityRequest, CapabilityResponse, CompletionRequest,
    DiagramInput, ExplainInput, FormulaInput, IllustrationInput, ImageInput, ImageRequest, JobId,
    Payload, ProviderId, ProviderRequest, SolveInput, StudyTipsInput, TranscribeInput,
    VoiceSolveInput, VoiceSolveResponse, FALLBACK_PROVIDER,
};

// Re-export provider types
pub use provider::assemblyai::AssemblyAiProvider;
pub use provider::chat_completions::ChatCompletionsProvider;
pub use provider::hf_image::HfImageProvider;
pub use provider::together::TogetherProvider;
pub use provider::{JobProvider, JobStatus, ProviderAdapter, ProviderCapabilities, RawTranscript};

// Re-export registry types
pub use registry::{
    DispatchDiagnostics, Dispatched, FallbackChain, FallbackDispatcher, ProviderAttempt,
    ProviderRegistry, RetryExecutor, RetryPolicy,
};

pub use health::{HealthAggregator, HealthRecord, HealthReport, HealthStatus};
pub use jobs::{AsyncJobPoller, JobState, TranscriptionPipeline};
pub use service::{OrchestrationSettings, TutorService};
pub use stub::{CannedContent, StubResponder};
