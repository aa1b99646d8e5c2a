//! Tavily search API backend
//!
//! AI-optimized search: results carry a relevance score and the response can
//! include a generated answer, which becomes the native summary.

use super::error::ProviderError;
use super::traits::*;
use crate::config::TavilySettings;
use serde::Deserialize;
use serde_json::json;

/// Tavily caps `max_results` at this value
const MAX_RESULTS: usize = 50;

/// Tavily search backend
pub struct Tavily {
    api_key: String,
    base_url: String,
    search_depth: String,
    include_answer: bool,
    include_raw_content: bool,
    include_domains: Vec<String>,
    exclude_domains: Vec<String>,
}

impl Tavily {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_settings(api_key, &TavilySettings::default())
    }

    pub fn from_settings(api_key: impl Into<String>, settings: &TavilySettings) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            search_depth: settings.search_depth.clone(),
            include_answer: settings.include_answer,
            include_raw_content: settings.include_raw_content,
            include_domains: settings.include_domains.clone(),
            exclude_domains: settings.exclude_domains.clone(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_answer(mut self, include_answer: bool) -> Self {
        self.include_answer = include_answer;
        self
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    published_date: Option<String>,
}

impl Backend for Tavily {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Tavily
    }

    fn about(&self) -> ProviderAbout {
        ProviderAbout::new()
            .website("https://tavily.com")
            .native_summary(true)
    }

    fn request(&self, params: &RequestParams) -> Result<ProviderRequest, ProviderError> {
        let body = json!({
            "api_key": self.api_key,
            "query": params.query,
            "search_depth": self.search_depth,
            "include_answer": self.include_answer,
            "include_raw_content": self.include_raw_content,
            "max_results": params.max_results.min(MAX_RESULTS),
            "include_domains": self.include_domains,
            "exclude_domains": self.exclude_domains,
        });

        Ok(ProviderRequest::post(format!("{}/search", self.base_url)).json(body))
    }

    fn response(&self, response: ProviderResponse) -> Result<ProviderOutput, ProviderError> {
        if response.is_blank() {
            return Err(ProviderError::invalid_response(
                self.kind(),
                "Tavily returned an empty body",
            ));
        }

        let data: TavilyResponse = serde_json::from_str(&response.text).map_err(|e| {
            ProviderError::invalid_response(self.kind(), format!("malformed Tavily response: {}", e))
        })?;

        let results = data
            .results
            .into_iter()
            .map(|r| RawResult {
                title: r.title,
                url: r.url,
                content: r.content,
                score: r.score,
                published_date: r.published_date,
            })
            .collect();

        let summary = if self.include_answer {
            data.answer.filter(|a| !a.trim().is_empty())
        } else {
            None
        };

        Ok(ProviderOutput { results, summary })
    }
}
