//! Provider loader for initializing providers from configuration

use super::registry::ProviderRegistry;
use super::{HttpProvider, Serp, Tavily};
use crate::config::Settings;
use crate::network::HttpClient;
use std::sync::Arc;
use tracing::{info, warn};

/// Loader for initializing providers from configuration
pub struct ProviderLoader;

impl ProviderLoader {
    /// Register every provider that has credentials. Credentials are read
    /// here once and held for the lifetime of the registry.
    pub fn load(settings: &Settings, client: &HttpClient) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        let providers = &settings.providers;

        match providers.tavily.api_key.as_deref().filter(|_| providers.tavily.has_credentials()) {
            Some(key) => {
                let backend = Tavily::from_settings(key, &providers.tavily);
                registry.register(Arc::new(HttpProvider::new(backend, client.clone())));
                info!("Loaded provider: tavily");
            }
            None => warn!("Skipping provider tavily: no API key configured"),
        }

        match providers.serp.api_key.as_deref().filter(|_| providers.serp.has_credentials()) {
            Some(key) => {
                let backend = Serp::from_settings(key, &providers.serp);
                registry.register(Arc::new(HttpProvider::new(backend, client.clone())));
                info!("Loaded provider: serp");
            }
            None => warn!("Skipping provider serp: no API key configured"),
        }

        info!("Loaded {} providers", registry.len());
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderKind;

    #[tokio::test]
    async fn test_load_only_credentialed_providers() {
        let mut settings = Settings::default();
        settings.providers.serp.api_key = Some("serp-key".to_string());
        settings.providers.tavily.api_key = Some("   ".to_string());

        let registry = ProviderLoader::load(&settings, &HttpClient::new().unwrap());
        assert_eq!(registry.kinds(), vec![ProviderKind::Serp]);
    }

    #[tokio::test]
    async fn test_load_nothing_without_keys() {
        let registry = ProviderLoader::load(&Settings::default(), &HttpClient::new().unwrap());
        assert!(registry.is_empty());
    }
}
