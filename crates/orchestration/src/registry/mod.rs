//! Provider registry module.
//!
//! This module provides orchestration for AI providers, including:
//! - Provider registration and per-capability chain ordering
//! - Bounded retry with exponential backoff per provider
//! - Ordered fallback across providers
//! - Per-dispatch diagnostics

mod diagnostics;
mod dispatcher;
mod registry;
mod retry;

pub use diagnostics::{DispatchDiagnostics, ProviderAttempt};
pub use dispatcher::{Dispatched, FallbackChain, FallbackDispatcher};
pub use registry::{default_chain_order, ProviderRegistry};
pub use retry::{AttemptEvent, AttemptObserver, AttemptOutcome, LogObserver, RetryExecutor, RetryPolicy};
