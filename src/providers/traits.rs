//! Provider traits and types

use super::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Closed set of search backends. Adding a backend means adding a variant
/// and a [`Backend`] implementation; the orchestrator does not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Tavily, AI-optimized search with a generated answer
    Tavily,
    /// SerpAPI, Google web results
    Serp,
}

impl ProviderKind {
    /// Stable identifier used in logs, provenance and error text
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tavily => "tavily",
            Self::Serp => "serp",
        }
    }

    /// Human-readable name used in messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Tavily => "Tavily",
            Self::Serp => "SerpAPI",
        }
    }

    pub fn all() -> [ProviderKind; 2] {
        [Self::Tavily, Self::Serp]
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A result as the provider returned it, before normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    pub title: String,
    pub url: String,
    pub content: String,
    /// Provider relevance score, when the provider has one
    pub score: Option<f64>,
    pub published_date: Option<String>,
}

impl RawResult {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_published_date(mut self, date: impl Into<String>) -> Self {
        self.published_date = Some(date.into());
        self
    }
}

/// Successful output of one provider call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderOutput {
    /// Results in provider relevance order
    pub results: Vec<RawResult>,
    /// Summary generated by the provider itself
    pub summary: Option<String>,
}

impl ProviderOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(results: Vec<RawResult>) -> Self {
        Self {
            results,
            summary: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Parameters for one provider call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParams {
    /// Search query string
    pub query: String,
    /// Result-count hint sent to the backend
    pub max_results: usize,
}

impl RequestParams {
    pub fn new(query: impl Into<String>, max_results: usize) -> Self {
        Self {
            query: query.into(),
            max_results,
        }
    }
}

/// HTTP request to be made for a provider
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// URL to request
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Query parameters
    pub params: HashMap<String, String>,
    /// JSON body
    pub body: Option<serde_json::Value>,
}

impl ProviderRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            headers: HashMap::new(),
            params: HashMap::new(),
            body: None,
        }
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            ..Self::get(url)
        }
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set a JSON body
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// HTTP response from a provider request
#[derive(Debug)]
pub struct ProviderResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub text: String,
}

impl ProviderResponse {
    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the body is blank
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Static description of a provider
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProviderAbout {
    /// Website URL
    pub website: Option<String>,
    /// Whether the provider can return its own natural-language summary
    pub native_summary: bool,
}

impl ProviderAbout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn website(mut self, url: impl Into<String>) -> Self {
        self.website = Some(url.into());
        self
    }

    pub fn native_summary(mut self, supported: bool) -> Self {
        self.native_summary = supported;
        self
    }
}

/// Request builder and response parser for one search backend.
///
/// Backends do no I/O; [`HttpProvider`](super::HttpProvider) performs the
/// single HTTP call and maps transport and status failures.
pub trait Backend: Send + Sync {
    /// Which provider this backend talks to
    fn kind(&self) -> ProviderKind;

    /// Provider metadata
    fn about(&self) -> ProviderAbout {
        ProviderAbout::default()
    }

    /// Build the HTTP request for a search
    fn request(&self, params: &RequestParams) -> Result<ProviderRequest, ProviderError>;

    /// Parse a 2xx response into results
    fn response(&self, response: ProviderResponse) -> Result<ProviderOutput, ProviderError>;
}

/// Adapter contract shared by every provider: one call, one outbound
/// request, no internal retries, and the timeout is a hard bound.
#[async_trait]
pub trait Provider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn about(&self) -> ProviderAbout {
        ProviderAbout::default()
    }

    /// Run one search. A call exceeding `timeout` is cancelled and
    /// reported as [`ErrorKind::Timeout`](super::ErrorKind::Timeout).
    async fn invoke(
        &self,
        params: &RequestParams,
        timeout: Duration,
    ) -> Result<ProviderOutput, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_names() {
        assert_eq!(ProviderKind::Tavily.to_string(), "tavily");
        assert_eq!(ProviderKind::Serp.display_name(), "SerpAPI");
        assert_eq!(serde_json::to_string(&ProviderKind::Serp).unwrap(), "\"serp\"");
    }

    #[test]
    fn test_request_builder() {
        let request = ProviderRequest::post("https://api.example.com/search")
            .header("Authorization", "Bearer k")
            .param("q", "rust")
            .json(serde_json::json!({"query": "rust"}));

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.headers.get("Authorization").map(String::as_str), Some("Bearer k"));
        assert_eq!(request.params.get("q").map(String::as_str), Some("rust"));
        assert!(request.body.is_some());
    }

    #[test]
    fn test_response_status() {
        let ok = ProviderResponse {
            status: 204,
            text: "  ".to_string(),
        };
        assert!(ok.is_success());
        assert!(ok.is_blank());

        let limited = ProviderResponse {
            status: 429,
            text: "{}".to_string(),
        };
        assert!(!limited.is_success());
    }
}
