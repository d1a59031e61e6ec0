use std::collections::HashMap;
use std::{net::SocketAddr, time::Duration};

use anyhow::{bail, Context};
use stemtutor_orchestration::{Capability, OrchestrationSettings};

/// API credentials; a provider is registered only when its key is present.
#[derive(Clone, Debug, Default)]
pub struct ProviderKeys {
    pub mistral: Option<String>,
    pub huggingface: Option<String>,
    pub together: Option<String>,
    pub assemblyai: Option<String>,
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub keys: ProviderKeys,
    pub orchestration: OrchestrationSettings,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("STEM_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:5000".to_string())
            .parse()
            .context("Invalid STEM_LISTEN_ADDR")?;
        let cors_allow = split_list(
            &std::env::var("STEM_CORS_ALLOW_ORIGINS").unwrap_or_else(|_| "*".into()),
        );
        let timeout_ms = env_u64("STEM_REQUEST_TIMEOUT_MS", 600_000);

        let keys = ProviderKeys {
            mistral: env_key("MISTRAL_API_KEY"),
            huggingface: env_key("HF_TOKEN").or_else(|| env_key("HUGGINGFACE_TOKEN")),
            together: env_key("TOGETHER_API_KEY"),
            assemblyai: env_key("ASSEMBLYAI_API_KEY"),
        };

        let defaults = OrchestrationSettings::default();
        let (poll_interval, transcription_deadline) = job_timing(
            env_secs("STEM_POLL_INTERVAL_SECS", defaults.poll_interval),
            env_secs("STEM_TRANSCRIBE_DEADLINE_SECS", defaults.transcription_deadline),
        )?;
        let orchestration = OrchestrationSettings {
            probe_timeout: env_secs("STEM_PROBE_TIMEOUT_SECS", defaults.probe_timeout),
            poll_interval,
            transcription_deadline,
            chains: chain_overrides(),
            ..defaults
        };

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            keys,
            orchestration,
        })
    }
}

/// Longest transcription deadline accepted from the environment.
pub const MAX_TRANSCRIBE_DEADLINE: Duration = Duration::from_secs(3600);

/// Reject a zero poll interval and cap the transcription deadline.
fn job_timing(poll_interval: Duration, deadline: Duration) -> anyhow::Result<(Duration, Duration)> {
    if poll_interval.is_zero() {
        bail!("STEM_POLL_INTERVAL_SECS must be at least 1");
    }
    if deadline > MAX_TRANSCRIBE_DEADLINE {
        tracing::warn!(
            "STEM_TRANSCRIBE_DEADLINE_SECS={} exceeds {}s; clamping",
            deadline.as_secs(),
            MAX_TRANSCRIBE_DEADLINE.as_secs()
        );
    }
    Ok((poll_interval, deadline.min(MAX_TRANSCRIBE_DEADLINE)))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_secs(name: &str, default: Duration) -> Duration {
    Duration::from_secs(env_u64(name, default.as_secs()))
}

/// `STEM_CHAIN_SOLVE=deepseek,mistral` and friends.
fn chain_overrides() -> HashMap<Capability, Vec<String>> {
    Capability::ALL
        .into_iter()
        .filter_map(|capability| {
            let name = format!("STEM_CHAIN_{}", capability.as_str().to_ascii_uppercase());
            let order = split_list(&std::env::var(name).ok()?);
            (!order.is_empty()).then_some((capability, order))
        })
        .collect()
}
