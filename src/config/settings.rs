//! Settings structures for research-search configuration

use crate::routing::Strategy;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Lower bound for `search.max_results`
pub const MIN_RESULTS: usize = 1;

/// Upper bound for `search.max_results`
pub const MAX_RESULTS: usize = 50;

/// Allowed range for the per-provider timeout, in seconds
pub const TIMEOUT_RANGE: (u64, u64) = (5, 120);

/// Main settings structure, loaded from settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub search: SearchSettings,
    pub server: ServerSettings,
    pub outgoing: OutgoingSettings,
    pub providers: ProvidersSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Overlay environment variables on top of file/default values
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary lookup. Unparseable values are ignored.
    pub fn merge_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("TAVILY_API_KEY") {
            self.providers.tavily.api_key = Some(val);
        }
        if let Some(val) = lookup("SERP_API_KEY") {
            self.providers.serp.api_key = Some(val);
        }
        if let Some(val) = lookup("SEARCH_STRATEGY") {
            match val.parse() {
                Ok(strategy) => self.search.strategy = strategy,
                Err(e) => tracing::warn!("Ignoring SEARCH_STRATEGY: {}", e),
            }
        }
        if let Some(val) = lookup("MAX_SEARCH_RESULTS") {
            if let Ok(max) = val.parse() {
                self.search.max_results = max;
            }
        }
        if let Some(val) = lookup("SEARCH_TIMEOUT") {
            if let Ok(secs) = val.parse() {
                self.search.timeout = secs;
            }
        }
        if let Some(val) = lookup("PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = lookup("BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Some(val) = lookup("LOG_LEVEL") {
            self.general.log_level = val.to_lowercase();
        }
    }

    /// Check that every provider required by the configured strategy has
    /// credentials and that numeric bounds hold.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let mut problems = Vec::new();

        let strategy = self.search.strategy;
        if strategy.uses_tavily() && !self.providers.tavily.has_credentials() {
            problems.push(format!(
                "TAVILY_API_KEY is required for the {} strategy",
                strategy
            ));
        }
        if strategy.uses_serp() && !self.providers.serp.has_credentials() {
            problems.push(format!(
                "SERP_API_KEY is required for the {} strategy",
                strategy
            ));
        }

        if !(MIN_RESULTS..=MAX_RESULTS).contains(&self.search.max_results) {
            problems.push(format!(
                "search.max_results must be between {} and {}",
                MIN_RESULTS, MAX_RESULTS
            ));
        }

        let (lo, hi) = TIMEOUT_RANGE;
        if !(lo..=hi).contains(&self.search.timeout) {
            problems.push(format!(
                "search.timeout must be between {} and {} seconds",
                lo, hi
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError { problems })
        }
    }
}

/// Every configuration problem found by [`Settings::validate`]
#[derive(Debug, Clone, Error)]
#[error("configuration errors:\n{}", bullet_list(.problems))]
pub struct ConfigError {
    pub problems: Vec<String>,
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Service name reported by the API
    pub instance_name: String,
    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            instance_name: "Research Search".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Search routing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Provider routing strategy
    pub strategy: Strategy,
    /// Default number of results per query
    pub max_results: usize,
    /// Timeout per provider attempt, in seconds
    pub timeout: u64,
}

impl SearchSettings {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            strategy: Strategy::Intelligent,
            max_results: crate::DEFAULT_MAX_RESULTS,
            timeout: crate::DEFAULT_TIMEOUT,
        }
    }
}

/// HTTP API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
    /// Maximum queries accepted by one batch request
    pub batch_limit: usize,
    /// Maximum `max_results` accepted by the API
    pub max_results: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_address: "0.0.0.0".to_string(),
            batch_limit: 10,
            max_results: 20,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Pool max idle connections per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Appended to the default user agent
    pub useragent_suffix: Option<String>,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send with every request
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            pool_maxsize: 20,
            verify_ssl: true,
            useragent_suffix: None,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Per-provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersSettings {
    pub tavily: TavilySettings,
    pub serp: SerpSettings,
}

/// Tavily search API settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TavilySettings {
    /// API key
    pub api_key: Option<String>,
    /// API root; `/search` is appended
    pub base_url: String,
    /// "basic" or "advanced"
    pub search_depth: String,
    /// Ask Tavily for a generated answer
    pub include_answer: bool,
    /// Ask Tavily for scraped page content
    pub include_raw_content: bool,
    /// Restrict results to these domains
    pub include_domains: Vec<String>,
    /// Exclude results from these domains
    pub exclude_domains: Vec<String>,
}

impl TavilySettings {
    pub fn has_credentials(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

impl Default for TavilySettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.tavily.com".to_string(),
            search_depth: "advanced".to_string(),
            include_answer: true,
            include_raw_content: true,
            include_domains: vec![],
            exclude_domains: vec![],
        }
    }
}

impl fmt::Debug for TavilySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TavilySettings")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("search_depth", &self.search_depth)
            .field("include_answer", &self.include_answer)
            .field("include_raw_content", &self.include_raw_content)
            .field("include_domains", &self.include_domains)
            .field("exclude_domains", &self.exclude_domains)
            .finish()
    }
}

/// SerpAPI settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerpSettings {
    /// API key
    pub api_key: Option<String>,
    /// Search endpoint
    pub base_url: String,
    /// Google domain to query
    pub google_domain: String,
    /// Country code (gl)
    pub country: String,
    /// Interface language (hl)
    pub language: String,
    /// "off", "moderate" or "strict"
    pub safe_search: String,
    /// hour, day, week, month or year
    pub time_period: Option<String>,
}

impl SerpSettings {
    pub fn has_credentials(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

impl Default for SerpSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://serpapi.com/search".to_string(),
            google_domain: "google.com".to_string(),
            country: "us".to_string(),
            language: "en".to_string(),
            safe_search: "off".to_string(),
            time_period: None,
        }
    }
}

impl fmt::Debug for SerpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerpSettings")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("google_domain", &self.google_domain)
            .field("country", &self.country)
            .field("language", &self.language)
            .field("safe_search", &self.safe_search)
            .field("time_period", &self.time_period)
            .finish()
    }
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn redact(key: &Option<String>) -> Option<&'static str> {
    key.as_ref().map(|_| "***")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.search.strategy, Strategy::Intelligent);
        assert_eq!(settings.search.max_results, 10);
        assert_eq!(settings.search.timeout_duration(), Duration::from_secs(30));
    }

    #[test]
    fn test_merge_vars() {
        let mut settings = Settings::default();
        settings.merge_vars(lookup(&[
            ("TAVILY_API_KEY", "tvly-123"),
            ("SEARCH_STRATEGY", "serp_only"),
            ("MAX_SEARCH_RESULTS", "7"),
            ("SEARCH_TIMEOUT", "12"),
            ("PORT", "not-a-port"),
        ]));

        assert_eq!(settings.providers.tavily.api_key.as_deref(), Some("tvly-123"));
        assert_eq!(settings.search.strategy, Strategy::SerpOnly);
        assert_eq!(settings.search.max_results, 7);
        assert_eq!(settings.search.timeout, 12);
        assert_eq!(settings.server.port, 8000);
    }

    #[test]
    fn test_validate_reports_every_missing_key() {
        let settings = Settings::default();
        let err = settings.validate().unwrap_err();
        assert_eq!(err.problems.len(), 2);
        assert!(err.to_string().contains("TAVILY_API_KEY"));
        assert!(err.to_string().contains("SERP_API_KEY"));
    }

    #[test]
    fn test_validate_single_provider_strategy() {
        let mut settings = Settings::default();
        settings.search.strategy = Strategy::TavilyOnly;
        settings.providers.tavily.api_key = Some("key".to_string());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_bounds() {
        let mut settings = Settings::default();
        settings.providers.tavily.api_key = Some("a".to_string());
        settings.providers.serp.api_key = Some("b".to_string());
        settings.search.max_results = 0;
        settings.search.timeout = 500;
        let err = settings.validate().unwrap_err();
        assert_eq!(err.problems.len(), 2);
    }

    #[test]
    fn test_yaml_round_trip_keeps_defaults() {
        let yaml = "search:\n  strategy: tavily_only\nproviders:\n  serp:\n    country: de\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.search.strategy, Strategy::TavilyOnly);
        assert_eq!(settings.search.max_results, 10);
        assert_eq!(settings.providers.serp.country, "de");
        assert_eq!(settings.providers.serp.language, "en");
    }

    #[test]
    fn test_debug_redacts_api_keys() {
        let mut settings = Settings::default();
        settings.providers.tavily.api_key = Some("secret-key".to_string());
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("secret-key"));
    }
}
