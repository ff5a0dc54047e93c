//! Priority-ordered, capability-filtered provider selection. Grounded on
//! `llmspell-config::providers::ProviderManagerConfig::get_default_provider`,
//! generalized from "select by configured default name" to "select the
//! first provider, in configured priority order, that advertises the
//! required capability" (`spec.md` §4.A, §9).

use semem_core::providers::{ChatProvider, EmbeddingProvider, ProviderCapability};
use std::sync::Arc;

use crate::error::{ProviderError, Result};

/// An embedding provider entry with its advertised capabilities and
/// priority rank (lower = preferred).
pub struct EmbeddingRegistry {
    entries: Vec<Arc<dyn EmbeddingProvider>>,
}

impl EmbeddingRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register a provider at the end of the priority list.
    pub fn register(&mut self, provider: Arc<dyn EmbeddingProvider>) {
        self.entries.push(provider);
    }

    /// First registered provider — embedding providers implicitly only
    /// advertise `Embed`, so no capability filter is needed here (unlike
    /// [`ChatRegistry`], which mixes chat-only and chat+stream providers).
    pub fn select(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        self.entries
            .first()
            .cloned()
            .ok_or(ProviderError::NoProvider(ProviderCapability::Embed.as_str()))
    }

    pub fn select_by_dimension(&self, dimension: usize) -> Result<Arc<dyn EmbeddingProvider>> {
        self.entries
            .iter()
            .find(|p| p.dimension() == dimension)
            .cloned()
            .ok_or(ProviderError::NoProvider(ProviderCapability::Embed.as_str()))
    }
}

impl Default for EmbeddingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A chat/stream provider entry alongside its advertised capability set.
pub struct ChatRegistry {
    entries: Vec<Arc<dyn ChatProvider>>,
}

impl ChatRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn register(&mut self, provider: Arc<dyn ChatProvider>) {
        self.entries.push(provider);
    }

    /// Select the highest-priority provider advertising `capability`.
    pub fn select(&self, capability: ProviderCapability) -> Result<Arc<dyn ChatProvider>> {
        self.entries
            .iter()
            .find(|p| p.capabilities().contains(&capability))
            .cloned()
            .ok_or(ProviderError::NoProvider(capability.as_str()))
    }
}

impl Default for ChatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{DeterministicEmbeddingProvider, EchoChatProvider};

    #[test]
    fn embedding_registry_selects_first_registered() {
        let mut registry = EmbeddingRegistry::new();
        registry.register(Arc::new(DeterministicEmbeddingProvider::new(16)));
        registry.register(Arc::new(DeterministicEmbeddingProvider::new(32)));
        let selected = registry.select().unwrap();
        assert_eq!(selected.dimension(), 16);
    }

    #[test]
    fn embedding_registry_selects_by_dimension() {
        let mut registry = EmbeddingRegistry::new();
        registry.register(Arc::new(DeterministicEmbeddingProvider::new(16)));
        registry.register(Arc::new(DeterministicEmbeddingProvider::new(32)));
        let selected = registry.select_by_dimension(32).unwrap();
        assert_eq!(selected.dimension(), 32);
    }

    #[test]
    fn chat_registry_errors_without_providers() {
        let registry = ChatRegistry::new();
        assert!(registry.select(ProviderCapability::Chat).is_err());
    }

    #[test]
    fn chat_registry_selects_registered_provider() {
        let mut registry = ChatRegistry::new();
        registry.register(Arc::new(EchoChatProvider));
        assert!(registry.select(ProviderCapability::Chat).is_ok());
    }
}
