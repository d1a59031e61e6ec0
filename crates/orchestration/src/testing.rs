//! Scripted providers shared by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::ProviderFailure;
use crate::models::{Capability, Payload, ProviderRequest};
use crate::provider::{ProviderAdapter, ProviderCapabilities};

/// Replays scripted results; the last one repeats forever.
pub(crate) struct MockProvider {
    id: &'static str,
    priority: u8,
    capabilities: &'static [Capability],
    results: Mutex<VecDeque<Result<Payload, ProviderFailure>>>,
    probe: Result<(), ProviderFailure>,
    calls: AtomicUsize,
    last_request: Mutex<Option<ProviderRequest>>,
}

impl MockProvider {
    pub fn scripted(id: &'static str, results: Vec<Result<Payload, ProviderFailure>>) -> Self {
        Self {
            id,
            priority: 10,
            capabilities: Capability::TEXT,
            results: Mutex::new(results.into()),
            probe: Ok(()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn succeeding(id: &'static str, content: &str) -> Self {
        Self::scripted(id, vec![Ok(Payload::text(content))])
    }

    pub fn failing(id: &'static str, failure: ProviderFailure) -> Self {
        let probe = Err(failure.clone());
        Self::scripted(id, vec![Err(failure)]).with_probe(probe)
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_capabilities(mut self, capabilities: &'static [Capability]) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_probe(mut self, probe: Result<(), ProviderFailure>) -> Self {
        self.probe = probe;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            capabilities: self.capabilities,
        }
    }

    async fn call(&self, request: &ProviderRequest) -> Result<Payload, ProviderFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        let mut results = self.results.lock().unwrap();
        if results.len() > 1 {
            results.pop_front().unwrap()
        } else {
            results
                .front()
                .cloned()
                .unwrap_or_else(|| Err(ProviderFailure::new("no scripted result")))
        }
    }

    async fn probe(&self) -> Result<(), ProviderFailure> {
        self.probe.clone()
    }
}
