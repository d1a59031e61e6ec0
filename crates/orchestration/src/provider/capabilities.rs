//! Provider capability descriptions.

use crate::models::Capability;

/// Describes which capabilities a provider can serve.
///
/// Used by the registry to decide which providers may appear in a
/// capability's fallback chain.
#[derive(Clone, Debug)]
pub struct ProviderCapabilities {
    pub capabilities: &'static [Capability],
}

impl ProviderCapabilities {
    /// Every text completion capability.
    pub fn text() -> Self {
        Self {
            capabilities: Capability::TEXT,
        }
    }

    pub fn image() -> Self {
        Self {
            capabilities: &[Capability::Image],
        }
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}
