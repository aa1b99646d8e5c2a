//! Result type definitions

use crate::providers::ProviderKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single normalized search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title of the result
    pub title: String,
    /// The URL of the result; always parses as an absolute URL
    pub url: String,
    /// Content snippet/body, may be empty
    pub content: String,
    /// Provider relevance score, 0 when the provider has none
    pub score: f64,
    /// Provider that returned this result
    pub provider: ProviderKind,
    /// Publication date as reported by the provider
    pub published_date: Option<String>,
}

/// Outcome of one orchestrated search. Built once, never mutated after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Whether some provider answered
    pub success: bool,
    /// Echo of the query text
    pub query: String,
    /// Results in the winning provider's relevance order
    pub results: Vec<SearchResult>,
    /// Providers actually invoked, in attempt order
    pub providers_used: Vec<ProviderKind>,
    /// Summary supplied natively by the winning provider
    pub ai_summary: Option<String>,
    /// Wall time across all attempts, in seconds
    pub search_time: f64,
    /// Attempt-ordered failure summary; present iff `success` is false
    pub error: Option<String>,
    /// Creation instant
    pub timestamp: DateTime<Utc>,
}

impl SearchResponse {
    /// Number of results
    pub fn total_results(&self) -> usize {
        self.results.len()
    }

    /// Provider whose results were returned, if any
    pub fn winning_provider(&self) -> Option<ProviderKind> {
        if self.success {
            self.providers_used.last().copied()
        } else {
            None
        }
    }

    /// Result URLs in order
    pub fn sources(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.url.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(success: bool, providers_used: Vec<ProviderKind>) -> SearchResponse {
        SearchResponse {
            success,
            query: "q".to_string(),
            results: vec![SearchResult {
                title: "Rust".to_string(),
                url: "https://www.rust-lang.org/".to_string(),
                content: String::new(),
                score: 0.0,
                provider: ProviderKind::Serp,
                published_date: None,
            }],
            providers_used,
            ai_summary: None,
            search_time: 0.5,
            error: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_winning_provider() {
        let ok = response(true, vec![ProviderKind::Tavily, ProviderKind::Serp]);
        assert_eq!(ok.winning_provider(), Some(ProviderKind::Serp));

        let failed = response(false, vec![ProviderKind::Tavily]);
        assert_eq!(failed.winning_provider(), None);
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(response(true, vec![ProviderKind::Tavily])).unwrap();
        assert_eq!(value["providers_used"], serde_json::json!(["tavily"]));
        assert_eq!(value["results"][0]["provider"], "serp");
        assert!(value["error"].is_null());
        assert!(value["timestamp"].is_string());
        assert_eq!(value["success"], true);
    }
}
