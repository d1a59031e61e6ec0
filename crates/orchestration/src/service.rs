//! Entry point tying registry, dispatcher, job poller, health and stub content together.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{info, warn};

use crate::errors::TutorError;
use crate::health::{HealthAggregator, HealthReport, MAX_PROBE_TIMEOUT};
use crate::jobs::{TranscriptEnhancer, TranscriptionPipeline, DEFAULT_JOB_DEADLINE, DEFAULT_POLL_INTERVAL};
use crate::models::{
    Capability, CapabilityInput, CapabilityRequest, CapabilityResponse, Payload, TranscribeInput,
    VoiceSolveInput, VoiceSolveResponse,
};
use crate::prompts::build_request;
use crate::registry::{AttemptObserver, FallbackDispatcher, ProviderRegistry, RetryExecutor, RetryPolicy};
use crate::stub::{CannedContent, StubResponder};

/// Immutable orchestration configuration loaded at startup.
#[derive(Clone, Debug)]
pub struct OrchestrationSettings {
    pub retry_policy: RetryPolicy,
    pub probe_timeout: Duration,
    pub poll_interval: Duration,
    pub transcription_deadline: Duration,
    /// Per-capability chain order replacing the defaults.
    pub chains: HashMap<Capability, Vec<String>>,
}

impl Default for OrchestrationSettings {
    fn default() -> Self {
        Self {
            retry_policy: RetryPolicy::default(),
            probe_timeout: MAX_PROBE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            transcription_deadline: DEFAULT_JOB_DEADLINE,
            chains: HashMap::new(),
        }
    }
}

/// Handles capability and health requests.
///
/// Holds no per-request state; one instance is shared by every request.
pub struct TutorService {
    registry: Arc<ProviderRegistry>,
    dispatcher: FallbackDispatcher,
    health: HealthAggregator,
    transcription: TranscriptionPipeline,
    stub: Arc<dyn StubResponder>,
}

impl TutorService {
    pub fn new(registry: ProviderRegistry, settings: OrchestrationSettings) -> Self {
        let registry = Arc::new(registry.with_chains(settings.chains));

        Self {
            health: HealthAggregator::new(Arc::clone(&registry), settings.probe_timeout),
            registry,
            dispatcher: FallbackDispatcher::new(RetryExecutor::new(settings.retry_policy)),
            transcription: TranscriptionPipeline::new(
                settings.poll_interval,
                settings.transcription_deadline,
            ),
            stub: Arc::new(CannedContent),
        }
    }

    pub fn with_stub(mut self, stub: Arc<dyn StubResponder>) -> Self {
        self.stub = stub;
        self
    }

    pub fn with_enhancer(mut self, enhancer: Arc<dyn TranscriptEnhancer>) -> Self {
        self.transcription = self.transcription.with_enhancer(enhancer);
        self
    }

    /// Replace the attempt hook while keeping the configured retry policy.
    pub fn with_observer(mut self, observer: Arc<dyn AttemptObserver>) -> Self {
        let policy = self.dispatcher.executor().policy().clone();
        self.dispatcher = FallbackDispatcher::new(RetryExecutor::with_observer(policy, observer));
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Serve one capability request.
    ///
    /// Provider failures are reported inside the response; `Err` is only
    /// returned for invalid input or a capability nobody can serve.
    pub async fn handle(&self, request: CapabilityRequest) -> Result<CapabilityResponse, TutorError> {
        request.input.validate()?;
        let capability = request.capability();
        info!("Handling {} request", capability);

        if let CapabilityInput::Transcribe(input) = &request.input {
            return self.transcribe(input).await;
        }

        let provider_request = build_request(&request.input)?;
        let chain = self
            .registry
            .chain_for(capability, request.preferred_provider.as_deref());

        let failure = match self.dispatcher.dispatch(&chain, &provider_request).await {
            Ok(dispatched) => {
                return Ok(CapabilityResponse::answered(
                    capability,
                    dispatched.provider,
                    dispatched.payload,
                ))
            }
            Err(failure) => failure,
        };

        if failure.should_degrade() || failure.is_unattempted() {
            if let Some(payload) = self.stub.respond(&request.input) {
                warn!("Serving canned {} content after: {}", capability, failure);
                let cause = failure.should_degrade().then_some(failure.kind);
                return Ok(CapabilityResponse::degraded(capability, payload, cause));
            }
        }

        if failure.is_unattempted() {
            return Err(TutorError::NotConfigured(capability));
        }
        Ok(CapabilityResponse::failed(capability, &failure))
    }

    async fn transcribe(&self, input: &TranscribeInput) -> Result<CapabilityResponse, TutorError> {
        let audio = decode_audio(&input.audio)?;
        let provider = self
            .registry
            .job_provider()
            .ok_or(TutorError::NotConfigured(Capability::Transcribe))?;

        info!(
            "Transcribing {} bytes of {} audio with '{}'",
            audio.len(),
            input.format.as_deref().unwrap_or("unknown"),
            provider.id()
        );

        let response = match self.transcription.transcribe(provider.as_ref(), &audio).await {
            Ok(payload) => CapabilityResponse::answered(Capability::Transcribe, provider.id(), payload),
            Err(failure) => CapabilityResponse::failed(Capability::Transcribe, &failure),
        };
        Ok(response)
    }

    /// Transcribe a spoken problem, then solve the transcript.
    ///
    /// A failed transcription is reported without a solution. A transcript
    /// with no words is `InvalidInput`.
    pub async fn solve_with_voice(
        &self,
        input: VoiceSolveInput,
        preferred_provider: Option<String>,
    ) -> Result<VoiceSolveResponse, TutorError> {
        let transcription = self.transcribe(&input.transcribe_input()).await?;

        let transcript = match &transcription.result {
            Some(Payload::Transcript { text, .. }) if transcription.success => text.trim().to_string(),
            _ => {
                warn!(
                    "Voice solve stopped at transcription: {}",
                    transcription.error.as_deref().unwrap_or("no transcript")
                );
                return Ok(VoiceSolveResponse::transcription_failed(transcription));
            }
        };
        if transcript.is_empty() {
            return Err(TutorError::invalid_input("No speech detected in audio"));
        }

        let request = CapabilityRequest {
            input: CapabilityInput::Solve(input.solve_input(transcript)),
            preferred_provider,
        };
        let solution = self.handle(request).await?;
        Ok(VoiceSolveResponse::solved(transcription, solution))
    }

    /// Probe every provider.
    pub async fn health(&self) -> HealthReport {
        self.health.check().await
    }
}

/// Decode base64 audio, accepting an optional `data:` URL prefix.
fn decode_audio(encoded: &str) -> Result<Vec<u8>, TutorError> {
    let data = match encoded.split_once(',') {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded,
    };

    let audio = STANDARD
        .decode(data.trim())
        .map_err(|e| TutorError::invalid_input(format!("Audio is not valid base64: {}", e)))?;

    if audio.is_empty() {
        return Err(TutorError::invalid_input("Audio is empty"));
    }
    Ok(audio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorKind, ProviderFailure};
    use crate::models::{ImageInput, JobId, ProviderRequest, SolveInput, FALLBACK_PROVIDER};
    use crate::provider::{JobProvider, JobStatus, ProviderAdapter, RawTranscript};
    use crate::testing::MockProvider;
    use async_trait::async_trait;

    fn solve_request(problem: &str) -> CapabilityRequest {
        CapabilityRequest::new(CapabilityInput::Solve(SolveInput {
            problem: problem.to_string(),
            subject: "Mathematics".to_string(),
            difficulty: "Intermediate".to_string(),
            show_steps: true,
            include_theory: true,
            include_diagrams: true,
            temperature: None,
        }))
    }

    fn service(providers: Vec<Arc<dyn ProviderAdapter>>) -> TutorService {
        TutorService::new(
            ProviderRegistry::new(providers, Vec::new()),
            OrchestrationSettings::default(),
        )
    }

    /// Completes on the first poll with a fixed transcript, or rejects every submission.
    struct InstantSpeech {
        text: &'static str,
        reject_submit: bool,
    }

    impl InstantSpeech {
        fn saying(text: &'static str) -> Arc<Self> {
            Arc::new(Self {
                text,
                reject_submit: false,
            })
        }

        fn rejecting() -> Arc<Self> {
            Arc::new(Self {
                text: "",
                reject_submit: true,
            })
        }
    }

    #[async_trait]
    impl JobProvider for InstantSpeech {
        fn id(&self) -> &'static str {
            "assemblyai"
        }

        async fn submit(&self, _audio: &[u8]) -> Result<JobId, ProviderFailure> {
            if self.reject_submit {
                return Err(ProviderFailure::http(401, "Invalid API key"));
            }
            Ok("t-9".to_string())
        }

        async fn poll(&self, _job_id: &str) -> Result<JobStatus<RawTranscript>, ProviderFailure> {
            Ok(JobStatus::completed(RawTranscript {
                text: self.text.to_string(),
                confidence: Some(0.99),
            }))
        }

        async fn probe(&self) -> Result<(), ProviderFailure> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_answered_by_preferred_provider() {
        let mistral = Arc::new(MockProvider::succeeding("mistral", "from mistral"));
        let deepseek = Arc::new(MockProvider::succeeding("deepseek", "from deepseek"));
        let service = service(vec![mistral.clone(), deepseek.clone()]);

        let response = service
            .handle(solve_request("x + 1 = 2").prefer("deepseek"))
            .await
            .unwrap();

        assert!(response.success);
        assert!(!response.degraded);
        assert_eq!(response.provider_used.as_deref(), Some("deepseek"));
        assert_eq!(response.result, Some(Payload::text("from deepseek")));
        assert_eq!(mistral.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_chain_degrades_to_canned_content() {
        let mistral = Arc::new(MockProvider::failing("mistral", ProviderFailure::http(429, "")));
        let deepseek = Arc::new(MockProvider::failing("deepseek", ProviderFailure::http(429, "")));
        let service = service(vec![mistral.clone(), deepseek.clone()]);

        let response = service.handle(solve_request("x + 1 = 2")).await.unwrap();

        assert!(response.success);
        assert!(response.degraded);
        assert_eq!(response.provider_used.as_deref(), Some(FALLBACK_PROVIDER));
        assert_eq!(response.error_kind, Some(ErrorKind::RateLimited));
        assert!(response
            .result
            .unwrap()
            .as_text()
            .unwrap()
            .starts_with("# Solution: x + 1 = 2"));
        assert_eq!(mistral.calls(), 3);
        assert_eq!(deepseek.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_failure_is_surfaced() {
        let mistral = Arc::new(MockProvider::failing("mistral", ProviderFailure::http(401, "Unauthorized")));
        let service = service(vec![mistral]);

        let response = service.handle(solve_request("x + 1 = 2")).await.unwrap();

        assert!(!response.success);
        assert_eq!(response.error_kind, Some(ErrorKind::AuthFailed));
        assert_eq!(
            response.error.as_deref(),
            Some("Authentication failed, contact support.")
        );
    }

    #[tokio::test]
    async fn test_empty_chain_serves_canned_content() {
        let response = service(Vec::new()).handle(solve_request("x + 1 = 2")).await.unwrap();
        assert!(response.degraded);
        assert_eq!(response.error_kind, None);
    }

    #[tokio::test]
    async fn test_empty_image_chain_is_not_configured() {
        let request = CapabilityRequest::new(CapabilityInput::Image(ImageInput {
            prompt: "a lever".to_string(),
            context: String::new(),
            style: "educational".to_string(),
        }));
        let err = service(Vec::new()).handle(request).await.unwrap_err();
        assert!(matches!(err, TutorError::NotConfigured(Capability::Image)));
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_before_dispatch() {
        let mistral = Arc::new(MockProvider::succeeding("mistral", "unused"));
        let service = service(vec![mistral.clone()]);
        let err = service.handle(solve_request("  ")).await.unwrap_err();
        assert!(matches!(err, TutorError::InvalidInput(_)));
        assert_eq!(mistral.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transcription() {
        let service = TutorService::new(
            ProviderRegistry::new(Vec::new(), vec![InstantSpeech::saying("hello there")]),
            OrchestrationSettings::default(),
        );
        let request = CapabilityRequest::new(CapabilityInput::Transcribe(TranscribeInput {
            audio: "data:audio/wav;base64,UklGRg==".to_string(),
            format: Some("wav".to_string()),
        }));

        let response = service.handle(request).await.unwrap();

        assert!(response.success);
        assert_eq!(response.provider_used.as_deref(), Some("assemblyai"));
        match response.result.unwrap() {
            Payload::Transcript { text, job_id, word_count, .. } => {
                assert_eq!(text, "Hello there");
                assert_eq!(job_id, "t-9");
                assert_eq!(word_count, 2);
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transcription_without_provider() {
        let request = CapabilityRequest::new(CapabilityInput::Transcribe(TranscribeInput {
            audio: "UklGRg==".to_string(),
            format: None,
        }));
        let err = service(Vec::new()).handle(request).await.unwrap_err();
        assert!(matches!(err, TutorError::NotConfigured(Capability::Transcribe)));
    }

    fn voice_service(
        speech: Arc<InstantSpeech>,
        providers: Vec<Arc<dyn ProviderAdapter>>,
    ) -> TutorService {
        TutorService::new(
            ProviderRegistry::new(providers, vec![speech]),
            OrchestrationSettings::default(),
        )
    }

    fn voice_input() -> VoiceSolveInput {
        serde_json::from_value(serde_json::json!({
            "audio": "data:audio/webm;base64,UklGRg==",
            "subject": "Physics",
            "difficulty": "Beginner",
        }))
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_voice_solve_answers_the_transcript() {
        let mistral = Arc::new(MockProvider::succeeding("mistral", "a = F / m"));
        let service = voice_service(
            InstantSpeech::saying("what is the acceleration of a two kilogram cart"),
            vec![mistral.clone()],
        );

        let response = service.solve_with_voice(voice_input(), None).await.unwrap();

        assert!(response.success);
        assert_eq!(response.transcription.provider_used.as_deref(), Some("assemblyai"));
        let solution = response.solution.unwrap();
        assert_eq!(solution.capability, Capability::Solve);
        assert_eq!(solution.result, Some(Payload::text("a = F / m")));

        let Some(ProviderRequest::Completion(sent)) = mistral.last_request() else {
            panic!("expected a completion request");
        };
        assert!(sent
            .prompt
            .contains("PROBLEM: What is the acceleration of a two kilogram cart\n"));
        assert!(sent.prompt.contains("Beginner-level Physics"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_voice_solve_stops_when_transcription_fails() {
        let mistral = Arc::new(MockProvider::succeeding("mistral", "unused"));
        let service = voice_service(InstantSpeech::rejecting(), vec![mistral.clone()]);

        let response = service.solve_with_voice(voice_input(), None).await.unwrap();

        assert!(!response.success);
        assert!(response.solution.is_none());
        assert!(!response.transcription.success);
        assert_eq!(response.transcription.error_kind, Some(ErrorKind::AuthFailed));
        assert_eq!(mistral.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_voice_solve_rejects_silent_audio() {
        let mistral = Arc::new(MockProvider::succeeding("mistral", "unused"));
        let service = voice_service(InstantSpeech::saying("   "), vec![mistral.clone()]);

        let err = service.solve_with_voice(voice_input(), None).await.unwrap_err();

        assert!(matches!(err, TutorError::InvalidInput(_)));
        assert_eq!(err.to_string(), "No speech detected in audio");
        assert_eq!(mistral.calls(), 0);
    }

    #[tokio::test]
    async fn test_voice_solve_without_speech_provider() {
        let err = service(Vec::new())
            .solve_with_voice(voice_input(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, TutorError::NotConfigured(Capability::Transcribe)));
    }

    #[test]
    fn test_decode_audio() {
        assert_eq!(decode_audio("UklGRg==").unwrap(), b"RIFF");
        assert_eq!(decode_audio("data:audio/webm;base64,UklGRg==").unwrap(), b"RIFF");
        assert!(matches!(decode_audio("not base64!"), Err(TutorError::InvalidInput(_))));
        assert!(matches!(decode_audio(""), Err(TutorError::InvalidInput(_))));
    }
}
