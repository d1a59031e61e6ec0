use serde::{Deserialize, Serialize};

/// A text completion request, already rendered from a capability input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// An image generation request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    pub prompt: String,
}

/// What a provider adapter receives for one attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum ProviderRequest {
    Completion(CompletionRequest),
    Image(ImageRequest),
}

impl ProviderRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Completion(_) => "completion",
            Self::Image(_) => "image",
        }
    }
}
