//! Orchestration models
//!
//! - `capability` - Capabilities and their typed inputs
//! - `request` - Provider-level requests rendered from inputs
//! - `payload` - Successful results
//! - `response` - The request/response envelope shared by every capability
//! - `types` - Identifier aliases

mod capability;
mod payload;
mod request;
mod response;
mod types;

pub(crate) use capability::require;
pub use capability::{
    Capability, CapabilityInput, DiagramInput, ExplainInput, FormulaInput, IllustrationInput,
    ImageInput, SolveInput, StudyTipsInput, TranscribeInput, VoiceSolveInput,
};
pub use payload::Payload;
pub use request::{CompletionRequest, ImageRequest, ProviderRequest};
pub use response::{CapabilityRequest, CapabilityResponse, VoiceSolveResponse, FALLBACK_PROVIDER};
pub use types::{JobId, ProviderId};
