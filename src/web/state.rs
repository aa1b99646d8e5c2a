//! Application state shared across handlers

use crate::config::Settings;
use crate::metrics::Metrics;
use crate::providers::{ProviderKind, ProviderRegistry};
use crate::search::Search;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Search orchestrator
    pub search: Arc<Search>,
    /// Provider metrics
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: Settings, registry: ProviderRegistry) -> Self {
        let metrics = Arc::new(Metrics::new());
        let search = Search::new(Arc::new(registry))
            .with_defaults(settings.search.clone())
            .with_metrics(metrics.clone());

        Self {
            settings: Arc::new(settings),
            search: Arc::new(search),
            metrics,
        }
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.general.instance_name
    }

    /// Check if a provider has been registered
    pub fn is_configured(&self, kind: ProviderKind) -> bool {
        self.search.registry().contains(kind)
    }
}
