//! Provider registry: the immutable set of providers and the chain order
//! configured for each capability.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use super::dispatcher::FallbackChain;
use crate::models::Capability;
use crate::provider::chat_completions::{DEEPSEEK_ID, MISTRAL_ID};
use crate::provider::hf_image::{FLUX_SCHNELL_ID, QWEN_IMAGE_ID};
use crate::provider::{assemblyai, together, JobProvider, ProviderAdapter};

/// Default provider order for each capability.
pub fn default_chain_order() -> HashMap<Capability, Vec<String>> {
    let chain = |ids: &[&str]| ids.iter().map(|id| id.to_string()).collect::<Vec<_>>();

    HashMap::from([
        (Capability::Solve, chain(&[MISTRAL_ID, DEEPSEEK_ID])),
        (Capability::Explain, chain(&[together::PROVIDER_ID, MISTRAL_ID])),
        (Capability::Formulas, chain(&[MISTRAL_ID, together::PROVIDER_ID])),
        (Capability::Tips, chain(&[together::PROVIDER_ID, MISTRAL_ID])),
        (Capability::Image, chain(&[QWEN_IMAGE_ID, FLUX_SCHNELL_ID])),
        (Capability::Transcribe, chain(&[assemblyai::PROVIDER_ID])),
    ])
}

/// Registered providers plus per-capability chain configuration.
///
/// Read-only after construction, so one registry is shared by all requests.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn ProviderAdapter>>,
    job_providers: Vec<Arc<dyn JobProvider>>,
    chains: HashMap<Capability, Vec<String>>,
}

impl ProviderRegistry {
    /// Create a registry using [`default_chain_order`].
    pub fn new(
        providers: Vec<Arc<dyn ProviderAdapter>>,
        job_providers: Vec<Arc<dyn JobProvider>>,
    ) -> Self {
        Self {
            providers,
            job_providers,
            chains: default_chain_order(),
        }
    }

    /// Replace the chain order of the given capabilities.
    pub fn with_chains(mut self, chains: HashMap<Capability, Vec<String>>) -> Self {
        for (capability, order) in chains {
            debug!("Chain override for {}: {:?}", capability, order);
            self.chains.insert(capability, order);
        }
        self
    }

    /// Build the fallback chain for a capability.
    ///
    /// Orders providers by:
    /// 1. The preferred provider first (if registered and capable)
    /// 2. Then the configured order for the capability
    /// 3. With no configured order, every capable provider by priority
    pub fn chain_for(&self, capability: Capability, preferred: Option<&str>) -> FallbackChain {
        FallbackChain::new(capability, self.ordered_providers(capability, preferred))
    }

    fn ordered_providers(
        &self,
        capability: Capability,
        preferred: Option<&str>,
    ) -> Vec<Arc<dyn ProviderAdapter>> {
        let capable: Vec<&Arc<dyn ProviderAdapter>> = self
            .providers
            .iter()
            .filter(|p| p.capabilities().supports(capability))
            .collect();

        let mut ordered: Vec<Arc<dyn ProviderAdapter>> = Vec::with_capacity(capable.len());

        if let Some(preferred) = preferred.map(str::trim).filter(|p| !p.is_empty()) {
            match capable.iter().find(|p| p.id().eq_ignore_ascii_case(preferred)) {
                Some(provider) => ordered.push(Arc::clone(provider)),
                None => warn!(
                    "Preferred provider '{}' is not available for {}, using default order",
                    preferred, capability
                ),
            }
        }

        match self.chains.get(&capability) {
            Some(order) => {
                for id in order {
                    if let Some(provider) = capable.iter().find(|p| p.id().eq_ignore_ascii_case(id)) {
                        ordered.push(Arc::clone(provider));
                    }
                }
            }
            None => {
                let mut by_priority = capable.clone();
                by_priority.sort_by_key(|p| p.priority());
                ordered.extend(by_priority.into_iter().cloned());
            }
        }

        ordered
    }

    /// First registered job provider serving transcription.
    pub fn job_provider(&self) -> Option<&Arc<dyn JobProvider>> {
        let order = self.chains.get(&Capability::Transcribe);
        order
            .and_then(|ids| {
                ids.iter().find_map(|id| {
                    self.job_providers
                        .iter()
                        .find(|p| p.id().eq_ignore_ascii_case(id))
                })
            })
            .or_else(|| self.job_providers.first())
    }

    /// Get the list of registered providers.
    pub fn providers(&self) -> &[Arc<dyn ProviderAdapter>] {
        &self.providers
    }

    pub fn job_providers(&self) -> &[Arc<dyn JobProvider>] {
        &self.job_providers
    }

    pub fn chain_order(&self, capability: Capability) -> Option<&[String]> {
        self.chains.get(&capability).map(Vec::as_slice)
    }
}
