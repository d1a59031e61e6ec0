//! OpenAI-compatible chat completion providers.
//!
//! Both Mistral and the Hugging Face router (serving DeepSeek) expose the
//! same `/chat/completions` shape, so one adapter serves both:
//! - Mistral: https://api.mistral.ai/v1
//! - DeepSeek via Hugging Face: https://router.huggingface.co/v1

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::ProviderFailure;
use crate::models::{CompletionRequest, Payload, ProviderRequest};
use crate::provider::http::{ensure_success, read_json};
use crate::provider::{ProviderAdapter, ProviderCapabilities};

pub const MISTRAL_ID: &str = "mistral";
pub const DEEPSEEK_ID: &str = "deepseek";

const MISTRAL_BASE_URL: &str = "https://api.mistral.ai/v1";
const MISTRAL_MODEL: &str = "mistral-large-latest";
const HF_ROUTER_BASE_URL: &str = "https://router.huggingface.co/v1";
const DEEPSEEK_MODEL: &str = "deepseek-ai/DeepSeek-V3-0324";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// A chat completion provider speaking the OpenAI-compatible protocol.
pub struct ChatCompletionsProvider {
    id: &'static str,
    priority: u8,
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatCompletionsProvider {
    /// Mistral AI, the primary text provider.
    pub fn mistral(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            id: MISTRAL_ID,
            priority: 1,
            client,
            base_url: MISTRAL_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: MISTRAL_MODEL.to_string(),
        }
    }

    /// DeepSeek served through the Hugging Face inference router.
    pub fn deepseek(client: Client, hf_token: impl Into<String>) -> Self {
        Self {
            id: DEEPSEEK_ID,
            priority: 2,
            client,
            base_url: HF_ROUTER_BASE_URL.to_string(),
            api_key: hf_token.into(),
            model: DEEPSEEK_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_body<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        ChatRequest {
            model: &self.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderFailure> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!("{} request: model={} max_tokens={}", self.id, self.model, request.max_tokens);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_body(request))
            .send()
            .await?;

        let parsed: ChatResponse = read_json(response).await?;
        extract_content(parsed)
    }
}

fn extract_content(response: ChatResponse) -> Result<String, ProviderFailure> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    if content.is_empty() {
        return Err(ProviderFailure::decode("unexpected response: no completion content"));
    }
    Ok(content)
}

#[async_trait]
impl ProviderAdapter for ChatCompletionsProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::text()
    }

    async fn call(&self, request: &ProviderRequest) -> Result<Payload, ProviderFailure> {
        match request {
            ProviderRequest::Completion(completion) => {
                let content = self.complete(completion).await.inspect_err(|e| {
                    warn!("{} completion failed: {}", self.id, e);
                })?;
                Ok(Payload::text(content))
            }
            other => Err(ProviderFailure::new(format!(
                "{} cannot serve {} requests",
                self.id,
                other.kind()
            ))),
        }
    }

    async fn probe(&self) -> Result<(), ProviderFailure> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        ensure_success(response).await.map(|_| ())
    }
}
