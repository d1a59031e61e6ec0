//! Ordered fallback across the providers of one capability.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info, warn};

use super::diagnostics::DispatchDiagnostics;
use super::retry::RetryExecutor;
use crate::errors::{AttemptFailure, AttemptResult};
use crate::models::{Capability, Payload, ProviderRequest};
use crate::provider::ProviderAdapter;

/// Ordered, duplicate-free providers for one capability.
#[derive(Clone)]
pub struct FallbackChain {
    capability: Capability,
    providers: Vec<Arc<dyn ProviderAdapter>>,
}

impl FallbackChain {
    /// Build a chain; later duplicates of a provider id are dropped.
    pub fn new(
        capability: Capability,
        providers: impl IntoIterator<Item = Arc<dyn ProviderAdapter>>,
    ) -> Self {
        let mut seen = HashSet::new();
        let providers = providers
            .into_iter()
            .filter(|p| seen.insert(p.id()))
            .collect();

        Self {
            capability,
            providers,
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn providers(&self) -> &[Arc<dyn ProviderAdapter>] {
        &self.providers
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }
}

impl std::fmt::Debug for FallbackChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackChain")
            .field("capability", &self.capability)
            .field("providers", &self.ids())
            .finish()
    }
}

/// Successful dispatch: which provider answered and with what.
#[derive(Clone, Debug, PartialEq)]
pub struct Dispatched {
    pub provider: &'static str,
    pub payload: Payload,
}

/// Walks a [`FallbackChain`], retrying each provider before moving on.
#[derive(Clone, Default)]
pub struct FallbackDispatcher {
    executor: RetryExecutor,
}

impl FallbackDispatcher {
    pub fn new(executor: RetryExecutor) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &RetryExecutor {
        &self.executor
    }

    /// Try each provider in order and stop at the first success.
    ///
    /// When every provider fails, returns the last failure with `exhausted`
    /// set. An empty chain yields [`AttemptFailure::no_providers`].
    pub async fn dispatch(
        &self,
        chain: &FallbackChain,
        request: &ProviderRequest,
    ) -> AttemptResult<Dispatched> {
        self.dispatch_with_diagnostics(chain, request).await.0
    }

    /// Same as [`dispatch`](Self::dispatch), also returning per-provider diagnostics.
    pub async fn dispatch_with_diagnostics(
        &self,
        chain: &FallbackChain,
        request: &ProviderRequest,
    ) -> (AttemptResult<Dispatched>, DispatchDiagnostics) {
        let mut diagnostics = DispatchDiagnostics::new();

        if chain.is_empty() {
            warn!("No providers available for capability: {}", chain.capability());
            return (
                Err(AttemptFailure::no_providers(chain.capability())),
                diagnostics,
            );
        }

        let mut last_failure: Option<AttemptFailure> = None;

        for provider in chain.providers() {
            let provider_id = provider.id();
            debug!("Dispatching {} to provider '{}'", chain.capability(), provider_id);

            let result = self
                .executor
                .execute(provider_id, || provider.call(request))
                .await;

            match result {
                Ok(payload) => {
                    diagnostics.record_success(Cow::Borrowed(provider_id));
                    if last_failure.is_some() {
                        info!(
                            "{} answered by fallback provider '{}' ({})",
                            chain.capability(),
                            provider_id,
                            diagnostics.summary()
                        );
                    }
                    return (
                        Ok(Dispatched {
                            provider: provider_id,
                            payload,
                        }),
                        diagnostics,
                    );
                }
                Err(failure) => {
                    info!(
                        "Provider '{}' failed with {}, trying next provider",
                        provider_id, failure.kind
                    );
                    diagnostics.record_error(
                        Cow::Borrowed(provider_id),
                        failure.attempts,
                        failure.kind,
                        failure.message.clone(),
                    );
                    last_failure = Some(failure);
                }
            }
        }

        warn!(
            "All providers failed for {}: {}",
            chain.capability(),
            diagnostics.summary()
        );

        let failure = match last_failure {
            Some(mut failure) => {
                failure.exhausted = true;
                failure
            }
            None => AttemptFailure::no_providers(chain.capability()),
        };
        (Err(failure), diagnostics)
    }
}
