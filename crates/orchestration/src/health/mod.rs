//! Aggregated provider health.
//!
//! Every provider is probed concurrently with its own timeout. One failing
//! probe never prevents the others from running. The system counts as up
//! when at least one provider is available.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorKind, ProviderFailure};
use crate::registry::ProviderRegistry;

/// Upper bound for a single probe.
pub const MAX_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Availability of one provider at one point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub checked_at: DateTime<Utc>,
}

impl HealthRecord {
    pub fn up() -> Self {
        Self {
            available: true,
            error: None,
            error_kind: None,
            checked_at: Utc::now(),
        }
    }

    pub fn down(kind: ErrorKind, error: impl Into<String>) -> Self {
        Self {
            available: false,
            error: Some(error.into()),
            error_kind: Some(kind),
            checked_at: Utc::now(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HealthStatus {
    /// Every provider is available.
    Healthy,
    /// Some providers are down, requests are still served.
    Degraded,
    /// No provider is available.
    Unavailable,
}

/// Health of every registered provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub providers: BTreeMap<String, HealthRecord>,
    /// True when at least one provider is available.
    pub overall_status: bool,
    pub checked_at: DateTime<Utc>,
}

impl HealthReport {
    pub fn from_records(providers: BTreeMap<String, HealthRecord>) -> Self {
        let overall_status = providers.values().any(|r| r.available);
        Self {
            providers,
            overall_status,
            checked_at: Utc::now(),
        }
    }

    pub fn status(&self) -> HealthStatus {
        let up = self.providers.values().filter(|r| r.available).count();
        match up {
            0 => HealthStatus::Unavailable,
            n if n == self.providers.len() => HealthStatus::Healthy,
            _ => HealthStatus::Degraded,
        }
    }

    pub fn available_providers(&self) -> Vec<&str> {
        self.providers
            .iter()
            .filter(|(_, r)| r.available)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// Probes every provider of a registry.
pub struct HealthAggregator {
    registry: Arc<ProviderRegistry>,
    probe_timeout: Duration,
}

impl HealthAggregator {
    /// `probe_timeout` is capped at [`MAX_PROBE_TIMEOUT`].
    pub fn new(registry: Arc<ProviderRegistry>, probe_timeout: Duration) -> Self {
        Self {
            registry,
            probe_timeout: probe_timeout.min(MAX_PROBE_TIMEOUT),
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Probe all providers concurrently and build a report.
    pub async fn check(&self) -> HealthReport {
        let adapter_probes = self.registry.providers().iter().map(|provider| {
            let id = provider.id();
            async move { (id, self.probe(id, provider.probe()).await) }
        });
        let job_probes = self.registry.job_providers().iter().map(|provider| {
            let id = provider.id();
            async move { (id, self.probe(id, provider.probe()).await) }
        });

        let (adapters, jobs) = futures::join!(join_all(adapter_probes), join_all(job_probes));

        let records: BTreeMap<String, HealthRecord> = adapters
            .into_iter()
            .chain(jobs)
            .map(|(id, record)| (id.to_string(), record))
            .collect();

        let report = HealthReport::from_records(records);
        debug!(
            "Health check: {:?}, available: {:?}",
            report.status(),
            report.available_providers()
        );
        report
    }

    async fn probe<F>(&self, id: &str, probe: F) -> HealthRecord
    where
        F: Future<Output = Result<(), ProviderFailure>>,
    {
        match tokio::time::timeout(self.probe_timeout, probe).await {
            Ok(Ok(())) => HealthRecord::up(),
            Ok(Err(failure)) => {
                let kind = failure.kind();
                warn!("Health probe for '{}' failed with {}: {}", id, kind, failure);
                HealthRecord::down(kind, failure.message)
            }
            Err(_) => {
                warn!("Health probe for '{}' timed out after {:?}", id, self.probe_timeout);
                HealthRecord::down(
                    ErrorKind::Timeout,
                    format!("probe timed out after {}s", self.probe_timeout.as_secs()),
                )
            }
        }
    }
}
