//! Registry of configured search providers

use super::traits::{Provider, ProviderKind};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Configured providers by kind. Read-only once built.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<ProviderKind, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any earlier one of the same kind
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.kind(), provider);
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, provider: Arc<dyn Provider>) -> Self {
        self.register(provider);
        self
    }

    /// Get a provider by kind
    pub fn get(&self, kind: ProviderKind) -> Option<&Arc<dyn Provider>> {
        self.providers.get(&kind)
    }

    /// Check if a provider is configured
    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    /// Configured provider kinds, in a stable order
    pub fn kinds(&self) -> Vec<ProviderKind> {
        self.providers.keys().copied().collect()
    }

    /// Get number of registered providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::HttpClient;
    use crate::providers::{HttpProvider, Serp, Tavily};

    #[tokio::test]
    async fn test_registry() {
        let client = HttpClient::new().unwrap();
        let registry = ProviderRegistry::new()
            .with(Arc::new(HttpProvider::new(Serp::new("s"), client.clone())))
            .with(Arc::new(HttpProvider::new(Tavily::new("t"), client)));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains(ProviderKind::Tavily));
        assert_eq!(registry.kinds(), vec![ProviderKind::Tavily, ProviderKind::Serp]);
        assert_eq!(
            registry.get(ProviderKind::Serp).map(|p| p.kind()),
            Some(ProviderKind::Serp)
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get(ProviderKind::Tavily).is_none());
    }
}
