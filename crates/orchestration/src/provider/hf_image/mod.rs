//! Hugging Face text-to-image provider.
//!
//! Calls the inference router at
//! `https://router.huggingface.co/hf-inference/models/{model}`, which answers
//! with raw image bytes. The bytes are returned as a base64 `data:` URL.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::ProviderFailure;
use crate::models::{ImageRequest, Payload, ProviderRequest};
use crate::provider::http::ensure_success;
use crate::provider::{ProviderAdapter, ProviderCapabilities};

pub const QWEN_IMAGE_ID: &str = "qwen-image";
pub const FLUX_SCHNELL_ID: &str = "flux-schnell";

const ROUTER_BASE_URL: &str = "https://router.huggingface.co";
const WHOAMI_URL: &str = "https://huggingface.co/api/whoami-v2";
const QWEN_IMAGE_MODEL: &str = "Qwen/Qwen-Image";
const FLUX_SCHNELL_MODEL: &str = "black-forest-labs/FLUX.1-schnell";
const DEFAULT_MIME: &str = "image/png";

#[derive(Debug, Serialize)]
struct TextToImageRequest<'a> {
    inputs: &'a str,
}

/// One Hugging Face hosted image model.
pub struct HfImageProvider {
    id: &'static str,
    priority: u8,
    client: Client,
    base_url: String,
    token: String,
    model: &'static str,
}

impl HfImageProvider {
    /// Qwen-Image, the primary image model.
    pub fn qwen_image(client: Client, token: impl Into<String>) -> Self {
        Self::build(QWEN_IMAGE_ID, 1, QWEN_IMAGE_MODEL, client, token.into())
    }

    /// FLUX.1 schnell, the faster fallback model.
    pub fn flux_schnell(client: Client, token: impl Into<String>) -> Self {
        Self::build(FLUX_SCHNELL_ID, 2, FLUX_SCHNELL_MODEL, client, token.into())
    }

    fn build(id: &'static str, priority: u8, model: &'static str, client: Client, token: String) -> Self {
        Self {
            id,
            priority,
            client,
            base_url: ROUTER_BASE_URL.to_string(),
            token,
            model,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &'static str {
        self.model
    }

    async fn generate(&self, request: &ImageRequest) -> Result<Payload, ProviderFailure> {
        let url = format!("{}/hf-inference/models/{}", self.base_url, self.model);
        debug!("{} request: model={}", self.id, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&TextToImageRequest {
                inputs: &request.prompt,
            })
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());
        let bytes = response.bytes().await?;

        encode_image(mime_type.as_deref(), &bytes)
    }
}

/// Encode image bytes as a data URL, rejecting bodies that are not images.
fn encode_image(content_type: Option<&str>, bytes: &[u8]) -> Result<Payload, ProviderFailure> {
    let mime_type = content_type.unwrap_or(DEFAULT_MIME);
    if !mime_type.starts_with("image/") {
        return Err(ProviderFailure::decode(format!(
            "unexpected response: content type {}",
            mime_type
        )));
    }
    if bytes.is_empty() {
        return Err(ProviderFailure::decode("unexpected response: empty image body"));
    }

    Ok(Payload::Image {
        data_url: format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes)),
        mime_type: mime_type.to_string(),
    })
}

#[async_trait]
impl ProviderAdapter for HfImageProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::image()
    }

    async fn call(&self, request: &ProviderRequest) -> Result<Payload, ProviderFailure> {
        match request {
            ProviderRequest::Image(image) => self.generate(image).await.inspect_err(|e| {
                warn!("{} image generation failed: {}", self.id, e);
            }),
            other => Err(ProviderFailure::new(format!(
                "{} cannot serve {} requests",
                self.id,
                other.kind()
            ))),
        }
    }

    async fn probe(&self) -> Result<(), ProviderFailure> {
        let response = self
            .client
            .get(WHOAMI_URL)
            .bearer_auth(&self.token)
            .send()
            .await?;
        ensure_success(response).await.map(|_| ())
    }
}
