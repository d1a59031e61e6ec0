//! Together.xyz inference provider.
//!
//! Uses the legacy `/inference` endpoint with the free Llama 3.3 model.
//! Prompts are wrapped in `[INST]` instruction tags.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::ProviderFailure;
use crate::models::{CompletionRequest, Payload, ProviderRequest};
use crate::provider::http::{ensure_success, read_json};
use crate::provider::{ProviderAdapter, ProviderCapabilities};

pub const PROVIDER_ID: &str = "together";

const BASE_URL: &str = "https://api.together.xyz";
const MODEL: &str = "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free";

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    model: &'a str,
    prompt: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct InferenceResponse {
    output: InferenceOutput,
}

#[derive(Debug, Deserialize)]
struct InferenceOutput {
    choices: Vec<InferenceChoice>,
}

#[derive(Debug, Deserialize)]
struct InferenceChoice {
    text: String,
}

/// Together.xyz provider.
pub struct TogetherProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TogetherProvider {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Wrap the request in instruction tags; the system text leads the instruction.
fn format_prompt(request: &CompletionRequest) -> String {
    match request.system.as_deref() {
        Some(system) => format!("[INST]{}\n\n{}[/INST]", system, request.prompt),
        None => format!("[INST]{}[/INST]", request.prompt),
    }
}

fn extract_text(response: InferenceResponse) -> Result<String, ProviderFailure> {
    let text = response
        .output
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.text.trim().to_string())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ProviderFailure::decode("unexpected response: empty output"));
    }
    Ok(text)
}

#[async_trait]
impl ProviderAdapter for TogetherProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        3
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::text()
    }

    async fn call(&self, request: &ProviderRequest) -> Result<Payload, ProviderFailure> {
        let ProviderRequest::Completion(completion) = request else {
            return Err(ProviderFailure::new(format!(
                "{} cannot serve {} requests",
                PROVIDER_ID,
                request.kind()
            )));
        };

        let body = InferenceRequest {
            model: MODEL,
            prompt: format_prompt(completion),
            temperature: completion.temperature,
            max_tokens: completion.max_tokens,
        };

        debug!("together request: max_tokens={}", completion.max_tokens);

        let response = self
            .client
            .post(format!("{}/inference", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: InferenceResponse = read_json(response).await.inspect_err(|e| {
            warn!("together inference failed: {}", e);
        })?;
        extract_text(parsed).map(Payload::text)
    }

    async fn probe(&self) -> Result<(), ProviderFailure> {
        let response = self
            .client
            .get(format!("{}/v1/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        ensure_success(response).await.map(|_| ())
    }
}
