//! Provider abstractions and implementations.
//!
//! This module contains:
//! - The [`ProviderAdapter`] trait for request/response providers
//! - The [`JobProvider`] trait for submit-then-poll providers
//! - Concrete providers: Mistral and DeepSeek (OpenAI-compatible chat),
//!   Together.xyz, Hugging Face image models and AssemblyAI
//!
//! Adapters perform exactly one attempt per call and surface raw status
//! and message detail through [`ProviderFailure`](crate::errors::ProviderFailure).
//! Retrying and fallback live in the registry.

mod capabilities;
pub mod http;
mod traits;

pub mod assemblyai;
pub mod chat_completions;
pub mod hf_image;
pub mod together;

pub use capabilities::ProviderCapabilities;
pub use traits::{JobProvider, JobStatus, ProviderAdapter, RawTranscript};
