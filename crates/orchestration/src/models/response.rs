use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Capability, CapabilityInput, Payload};
use crate::errors::{AttemptFailure, ErrorKind};

/// Provider name reported when a response came from canned content.
pub const FALLBACK_PROVIDER: &str = "fallback";

/// A capability invocation from the front end.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityRequest {
    #[serde(flatten)]
    pub input: CapabilityInput,
    /// Provider to try first, if it serves the capability.
    #[serde(default)]
    pub preferred_provider: Option<String>,
}

impl CapabilityRequest {
    pub fn new(input: CapabilityInput) -> Self {
        Self {
            input,
            preferred_provider: None,
        }
    }

    pub fn prefer(mut self, provider: impl Into<String>) -> Self {
        self.preferred_provider = Some(provider.into());
        self
    }

    pub fn capability(&self) -> Capability {
        self.input.capability()
    }
}

/// Uniform answer for every capability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityResponse {
    pub success: bool,
    pub capability: Capability,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub provider_used: Option<String>,
    pub degraded: bool,
    pub timestamp: DateTime<Utc>,
}

impl CapabilityResponse {
    /// A provider answered.
    pub fn answered(capability: Capability, provider: impl Into<String>, payload: Payload) -> Self {
        Self {
            success: true,
            capability,
            result: Some(payload),
            error_kind: None,
            error: None,
            provider_used: Some(provider.into()),
            degraded: false,
            timestamp: Utc::now(),
        }
    }

    /// Canned content stands in for a provider answer.
    ///
    /// `cause` is the failure that triggered degradation, if any provider was tried.
    pub fn degraded(capability: Capability, payload: Payload, cause: Option<ErrorKind>) -> Self {
        Self {
            success: true,
            capability,
            result: Some(payload),
            error_kind: cause,
            error: None,
            provider_used: Some(FALLBACK_PROVIDER.to_string()),
            degraded: true,
            timestamp: Utc::now(),
        }
    }

    /// Every provider failed and no canned content applies.
    pub fn failed(capability: Capability, failure: &AttemptFailure) -> Self {
        let message = failure
            .disposition()
            .user_message()
            .map(str::to_string)
            .unwrap_or_else(|| failure.message.clone());

        Self {
            success: false,
            capability,
            result: None,
            error_kind: Some(failure.kind),
            error: Some(message),
            provider_used: (!failure.provider.is_empty()).then(|| failure.provider.clone()),
            degraded: false,
            timestamp: Utc::now(),
        }
    }
}

/// Transcript and solution of a spoken problem.
///
/// `solution` is absent when transcription failed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSolveResponse {
    pub success: bool,
    pub transcription: CapabilityResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<CapabilityResponse>,
    pub timestamp: DateTime<Utc>,
}

impl VoiceSolveResponse {
    pub fn solved(transcription: CapabilityResponse, solution: CapabilityResponse) -> Self {
        Self {
            success: transcription.success && solution.success,
            transcription,
            solution: Some(solution),
            timestamp: Utc::now(),
        }
    }

    pub fn transcription_failed(transcription: CapabilityResponse) -> Self {
        Self {
            success: false,
            transcription,
            solution: None,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_uses_user_message() {
        let failure = AttemptFailure::new("mistral", ErrorKind::AuthFailed, "401 Unauthorized");
        let response = CapabilityResponse::failed(Capability::Solve, &failure);
        assert!(!response.success);
        assert_eq!(response.error_kind, Some(ErrorKind::AuthFailed));
        assert_eq!(
            response.error.as_deref(),
            Some("Authentication failed, contact support.")
        );
        assert_eq!(response.provider_used.as_deref(), Some("mistral"));
    }

    #[test]
    fn test_degraded_marks_fallback_provider() {
        let response = CapabilityResponse::degraded(
            Capability::Explain,
            Payload::text("canned"),
            Some(ErrorKind::RateLimited),
        );
        assert!(response.success);
        assert!(response.degraded);
        assert_eq!(response.provider_used.as_deref(), Some(FALLBACK_PROVIDER));
    }

    #[test]
    fn test_failed_without_attempts_has_no_provider() {
        let failure = AttemptFailure::no_providers(Capability::Image);
        let response = CapabilityResponse::failed(Capability::Image, &failure);
        assert_eq!(response.provider_used, None);
        assert_eq!(response.error_kind, Some(ErrorKind::Unknown));
    }

    #[test]
    fn test_request_flattens_input() {
        let request: CapabilityRequest = serde_json::from_str(
            r#"{"capability": "solve", "input": {"problem": "x+1=2"}, "preferredProvider": "deepseek"}"#,
        )
        .unwrap();
        assert_eq!(request.capability(), Capability::Solve);
        assert_eq!(request.preferred_provider.as_deref(), Some("deepseek"));
    }

    #[test]
    fn test_voice_solve_fails_with_failed_solution() {
        let transcription = CapabilityResponse::answered(
            Capability::Transcribe,
            "assemblyai",
            Payload::text("unused"),
        );
        let failure = AttemptFailure::new("mistral", ErrorKind::Timeout, "timed out");
        let response = VoiceSolveResponse::solved(
            transcription,
            CapabilityResponse::failed(Capability::Solve, &failure),
        );
        assert!(!response.success);

        let json = serde_json::to_value(
            VoiceSolveResponse::transcription_failed(response.transcription),
        )
        .unwrap();
        assert!(json.get("solution").is_none());
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = CapabilityResponse::answered(
            Capability::Formulas,
            "together",
            Payload::text("F = ma"),
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["providerUsed"], "together");
        assert_eq!(json["result"]["type"], "text");
        assert!(json.get("errorKind").is_none());
    }
}
