//! Per-request record of which providers a dispatch tried and how each ended.

use crate::errors::ErrorKind;
use crate::models::ProviderId;

/// Record of a single provider during a dispatch.
#[derive(Clone, Debug)]
pub struct ProviderAttempt {
    pub provider_id: ProviderId,
    /// Calls made to this provider, retries included.
    pub calls: u32,
    pub kind: Option<ErrorKind>,
    pub error: Option<String>,
    pub success: bool,
}

/// Detailed result of a dispatch.
#[derive(Clone, Debug, Default)]
pub struct DispatchDiagnostics {
    pub attempts: Vec<ProviderAttempt>,
}

impl DispatchDiagnostics {
    pub fn new() -> Self {
        Self {
            attempts: Vec::new(),
        }
    }

    pub fn record_error(&mut self, provider_id: ProviderId, calls: u32, kind: ErrorKind, error: String) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            calls,
            kind: Some(kind),
            error: Some(error),
            success: false,
        });
    }

    pub fn record_success(&mut self, provider_id: ProviderId) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            calls: 0,
            kind: None,
            error: None,
            success: true,
        });
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(|a| {
                if a.success {
                    format!("{}: SUCCESS", a.provider_id)
                } else if let (Some(kind), Some(err)) = (a.kind, &a.error) {
                    format!("{}: {} x{} ({})", a.provider_id, kind, a.calls, err)
                } else {
                    format!("{}: UNKNOWN", a.provider_id)
                }
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Check if any provider succeeded.
    pub fn has_success(&self) -> bool {
        self.attempts.iter().any(|a| a.success)
    }

    /// Kinds of the providers that were abandoned, in chain order.
    pub fn failure_kinds(&self) -> Vec<ErrorKind> {
        self.attempts.iter().filter_map(|a| a.kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;

    #[test]
    fn test_diagnostics_summary() {
        let mut diag = DispatchDiagnostics::new();
        diag.record_error(
            Cow::Borrowed("mistral"),
            3,
            ErrorKind::ServerError,
            "HTTP 503".to_string(),
        );
        diag.record_success(Cow::Borrowed("deepseek"));

        assert_eq!(
            diag.summary(),
            "mistral: SERVER_ERROR x3 (HTTP 503) -> deepseek: SUCCESS"
        );
    }

    #[test]
    fn test_has_success_and_kinds() {
        let mut diag = DispatchDiagnostics::new();
        diag.record_error(
            Cow::Borrowed("together"),
            3,
            ErrorKind::RateLimited,
            "429".to_string(),
        );
        assert!(!diag.has_success());
        assert_eq!(diag.failure_kinds(), vec![ErrorKind::RateLimited]);

        diag.record_success(Cow::Borrowed("mistral"));
        assert!(diag.has_success());
    }
}
