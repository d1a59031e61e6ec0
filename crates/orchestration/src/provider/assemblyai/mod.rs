//! AssemblyAI speech-to-text provider.
//!
//! Transcription is asynchronous:
//! 1. `POST /v2/upload` with the raw audio bytes returns an `upload_url`
//! 2. `POST /v2/transcript` with `{audio_url}` returns a transcript `id`
//! 3. `GET /v2/transcript/{id}` reports `queued`, `processing`, `completed` or `error`
//!
//! API documentation: https://www.assemblyai.com/docs

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::ProviderFailure;
use crate::jobs::JobState;
use crate::models::JobId;
use crate::provider::http::{ensure_success, read_json};
use crate::provider::{JobProvider, JobStatus, RawTranscript};

pub const PROVIDER_ID: &str = "assemblyai";

const BASE_URL: &str = "https://api.assemblyai.com";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Serialize)]
struct TranscriptRequest<'a> {
    audio_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedTranscript {
    id: String,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum TranscriptStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

impl From<TranscriptStatus> for JobState {
    fn from(status: TranscriptStatus) -> Self {
        match status {
            TranscriptStatus::Queued => JobState::Queued,
            TranscriptStatus::Processing => JobState::Processing,
            TranscriptStatus::Completed => JobState::Completed,
            TranscriptStatus::Error => JobState::Failed,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    status: TranscriptStatus,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    error: Option<String>,
}

/// AssemblyAI transcription provider.
pub struct AssemblyAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AssemblyAiProvider {
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

    /// AssemblyAI expects the bare key in the authorization header.
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, &self.api_key)
    }

    async fn upload(&self, audio: &[u8]) -> Result<String, ProviderFailure> {
        let response = self
            .authorized(self.client.post(format!("{}/v2/upload", self.base_url)))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(audio.to_vec())
            .send()
            .await?;

        let uploaded: UploadResponse = read_json(response).await?;
        Ok(uploaded.upload_url)
    }
}

fn to_job_status(response: TranscriptResponse) -> JobStatus<RawTranscript> {
    match response.status {
        TranscriptStatus::Completed => JobStatus::completed(RawTranscript {
            text: response.text.unwrap_or_default(),
            confidence: response.confidence,
        }),
        TranscriptStatus::Error => JobStatus::failed(
            response
                .error
                .unwrap_or_else(|| "Unknown error".to_string()),
        ),
        pending => JobStatus::pending(pending.into()),
    }
}

#[async_trait]
impl JobProvider for AssemblyAiProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn submit(&self, audio: &[u8]) -> Result<JobId, ProviderFailure> {
        let audio_url = self.upload(audio).await.inspect_err(|e| {
            warn!("assemblyai upload failed: {}", e);
        })?;
        debug!("assemblyai audio uploaded ({} bytes)", audio.len());

        let response = self
            .authorized(self.client.post(format!("{}/v2/transcript", self.base_url)))
            .json(&TranscriptRequest {
                audio_url: &audio_url,
            })
            .send()
            .await?;

        let created: CreatedTranscript = read_json(response).await?;
        debug!("assemblyai transcript created: {}", created.id);
        Ok(created.id)
    }

    async fn poll(&self, job_id: &str) -> Result<JobStatus<RawTranscript>, ProviderFailure> {
        let response = self
            .authorized(
                self.client
                    .get(format!("{}/v2/transcript/{}", self.base_url, job_id)),
            )
            .send()
            .await?;

        let parsed: TranscriptResponse = read_json(response).await?;
        Ok(to_job_status(parsed))
    }

    async fn probe(&self) -> Result<(), ProviderFailure> {
        let response = self
            .authorized(self.client.get(format!("{}/v2/transcript", self.base_url)))
            .query(&[("limit", "1")])
            .send()
            .await?;
        ensure_success(response).await.map(|_| ())
    }
}
