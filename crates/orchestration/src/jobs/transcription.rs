//! Speech transcription: the job poller plus transcript post-processing.

use std::sync::Arc;
use std::time::Duration;

use log::info;

use super::enhancer::{SentenceCaseEnhancer, TranscriptEnhancer};
use super::poller::{AsyncJobPoller, DEFAULT_JOB_DEADLINE, DEFAULT_POLL_INTERVAL};
use crate::errors::AttemptResult;
use crate::models::Payload;
use crate::provider::{JobProvider, RawTranscript};

/// Confidence reported when the provider gives none.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

pub struct TranscriptionPipeline {
    poll_interval: Duration,
    deadline: Duration,
    enhancer: Arc<dyn TranscriptEnhancer>,
}

impl TranscriptionPipeline {
    pub fn new(poll_interval: Duration, deadline: Duration) -> Self {
        Self {
            poll_interval,
            deadline,
            enhancer: Arc::new(SentenceCaseEnhancer),
        }
    }

    pub fn with_enhancer(mut self, enhancer: Arc<dyn TranscriptEnhancer>) -> Self {
        self.enhancer = enhancer;
        self
    }

    /// Submit `audio` to `provider` and wait for the finished transcript.
    pub async fn transcribe(&self, provider: &dyn JobProvider, audio: &[u8]) -> AttemptResult<Payload> {
        let poller = AsyncJobPoller::new(provider.id(), self.poll_interval, self.deadline);

        let job = poller
            .run(
                || provider.submit(audio),
                move |job_id| async move { provider.poll(&job_id).await },
            )
            .await?;

        info!(
            "Transcription job '{}' finished after {} polls",
            job.job_id, job.polls
        );
        Ok(self.finish(job.job_id, job.payload))
    }

    fn finish(&self, job_id: String, raw: RawTranscript) -> Payload {
        let text = self.enhancer.enhance(&raw.text);
        let confidence = raw
            .confidence
            .filter(|c| *c > 0.0)
            .unwrap_or(DEFAULT_CONFIDENCE);

        Payload::Transcript {
            word_count: text.split_whitespace().count(),
            enhancement_applied: text != raw.text,
            text,
            raw_text: raw.text,
            confidence,
            job_id,
        }
    }
}

impl Default for TranscriptionPipeline {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_JOB_DEADLINE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorKind, ProviderFailure};
    use crate::jobs::{JobState, PassThrough};
    use crate::models::JobId;
    use crate::provider::JobStatus;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Completes on the second poll.
    struct FakeSpeech {
        polls: AtomicUsize,
        confidence: Option<f64>,
    }

    impl FakeSpeech {
        fn new(confidence: Option<f64>) -> Self {
            Self {
                polls: AtomicUsize::new(0),
                confidence,
            }
        }
    }

    #[async_trait]
    impl JobProvider for FakeSpeech {
        fn id(&self) -> &'static str {
            "assemblyai"
        }

        async fn submit(&self, audio: &[u8]) -> Result<JobId, ProviderFailure> {
            if audio.is_empty() {
                return Err(ProviderFailure::http(400, "audio is empty"));
            }
            Ok("t-1".to_string())
        }

        async fn poll(&self, job_id: &str) -> Result<JobStatus<RawTranscript>, ProviderFailure> {
            assert_eq!(job_id, "t-1");
            if self.polls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Ok(JobStatus::pending(JobState::Processing));
            }
            Ok(JobStatus::completed(RawTranscript {
                text: "NEWTON'S second law. force equals mass times acceleration".to_string(),
                confidence: self.confidence,
            }))
        }

        async fn probe(&self) -> Result<(), ProviderFailure> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transcribe_enhances_and_counts() {
        let provider = FakeSpeech::new(Some(0.91));
        let pipeline = TranscriptionPipeline::default();

        let payload = pipeline.transcribe(&provider, b"RIFF").await.unwrap();

        assert_eq!(
            payload,
            Payload::Transcript {
                text: "Newton's second law. Force equals mass times acceleration".to_string(),
                raw_text: "NEWTON'S second law. force equals mass times acceleration".to_string(),
                confidence: 0.91,
                word_count: 8,
                job_id: "t-1".to_string(),
                enhancement_applied: true,
            }
        );
        assert_eq!(provider.polls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_untouched_transcript_is_not_marked_enhanced() {
        let provider = FakeSpeech::new(Some(0.91));
        let payload = TranscriptionPipeline::default()
            .with_enhancer(Arc::new(PassThrough))
            .transcribe(&provider, b"RIFF")
            .await
            .unwrap();

        match payload {
            Payload::Transcript {
                text,
                raw_text,
                enhancement_applied,
                ..
            } => {
                assert_eq!(text, raw_text);
                assert!(!enhancement_applied);
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_confidence_defaults() {
        let provider = FakeSpeech::new(None);
        let payload = TranscriptionPipeline::default()
            .transcribe(&provider, b"RIFF")
            .await
            .unwrap();

        match payload {
            Payload::Transcript { confidence, .. } => assert_eq!(confidence, DEFAULT_CONFIDENCE),
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_failure_surfaces() {
        let provider = FakeSpeech::new(None);
        let failure = TranscriptionPipeline::default()
            .transcribe(&provider, b"")
            .await
            .unwrap_err();

        assert_eq!(failure.kind, ErrorKind::Unknown);
        assert_eq!(failure.provider, "assemblyai");
        assert_eq!(provider.polls.load(Ordering::SeqCst), 0);
    }
}
