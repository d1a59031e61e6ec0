use std::sync::Arc;

use stemtutor_orchestration::provider::http::{build_client, DEFAULT_REQUEST_TIMEOUT};
use stemtutor_orchestration::{
    AssemblyAiProvider, ChatCompletionsProvider, HfImageProvider, JobProvider, ProviderAdapter,
    ProviderRegistry, TogetherProvider, TutorService,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, ProviderKeys};

pub struct AppState {
    pub tutor: TutorService,
}

pub fn init_tracing() {
    let log_format = std::env::var("STEM_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Register one adapter per configured credential.
fn build_registry(keys: &ProviderKeys) -> ProviderRegistry {
    let client = build_client(DEFAULT_REQUEST_TIMEOUT);
    let mut providers: Vec<Arc<dyn ProviderAdapter>> = Vec::new();
    let mut job_providers: Vec<Arc<dyn JobProvider>> = Vec::new();

    if let Some(key) = &keys.mistral {
        providers.push(Arc::new(ChatCompletionsProvider::mistral(client.clone(), key)));
    }
    if let Some(token) = &keys.huggingface {
        providers.push(Arc::new(ChatCompletionsProvider::deepseek(client.clone(), token)));
        providers.push(Arc::new(HfImageProvider::qwen_image(client.clone(), token)));
        providers.push(Arc::new(HfImageProvider::flux_schnell(client.clone(), token)));
    }
    if let Some(key) = &keys.together {
        providers.push(Arc::new(TogetherProvider::new(client.clone(), key)));
    }
    if let Some(key) = &keys.assemblyai {
        job_providers.push(Arc::new(AssemblyAiProvider::new(client, key)));
    }

    if providers.is_empty() && job_providers.is_empty() {
        tracing::warn!("No provider credentials configured; serving canned content only");
    }
    let ids: Vec<&str> = providers
        .iter()
        .map(|p| p.id())
        .chain(job_providers.iter().map(|p| p.id()))
        .collect();
    tracing::info!("Registered providers: {:?}", ids);

    ProviderRegistry::new(providers, job_providers)
}

pub fn build_state(config: &Config) -> Arc<AppState> {
    let registry = build_registry(&config.keys);
    let tutor = TutorService::new(registry, config.orchestration.clone());
    Arc::new(AppState { tutor })
}
