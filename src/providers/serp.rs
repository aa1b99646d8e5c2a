//! SerpAPI backend (Google web results)

use super::error::{ErrorKind, ProviderError};
use super::traits::*;
use crate::config::SerpSettings;
use serde::Deserialize;

/// Google returns at most this many results per page
const MAX_RESULTS: usize = 100;

/// SerpAPI Google search backend
pub struct Serp {
    api_key: String,
    base_url: String,
    google_domain: String,
    country: String,
    language: String,
    safe_search: String,
    time_period: Option<String>,
}

impl Serp {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_settings(api_key, &SerpSettings::default())
    }

    pub fn from_settings(api_key: impl Into<String>, settings: &SerpSettings) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: settings.base_url.clone(),
            google_domain: settings.google_domain.clone(),
            country: settings.country.clone(),
            language: settings.language.clone(),
            safe_search: settings.safe_search.clone(),
            time_period: settings.time_period.clone(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Classify an `error` field returned inside a 2xx body.
    /// `None` means the "error" is really an empty result page.
    fn classify_body_error(&self, message: &str) -> Option<ProviderError> {
        let lower = message.to_lowercase();

        if lower.contains("hasn't returned any results") {
            return None;
        }

        let kind = if lower.contains("invalid api key") {
            ErrorKind::AuthFailed
        } else if lower.contains("run out of searches") || lower.contains("rate limit") {
            ErrorKind::RateLimited
        } else {
            ErrorKind::InvalidResponse
        };

        Some(ProviderError::new(
            self.kind(),
            kind,
            format!("SerpAPI error: {}", message),
        ))
    }
}

/// Map a time period name to Google's `tbs` filter
fn time_filter(period: &str) -> Option<&'static str> {
    match period {
        "hour" => Some("qdr:h"),
        "day" => Some("qdr:d"),
        "week" => Some("qdr:w"),
        "month" => Some("qdr:m"),
        "year" => Some("qdr:y"),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    organic_results: Vec<SerpResult>,
    #[serde(default)]
    answer_box: Option<AnswerBox>,
}

#[derive(Debug, Deserialize)]
struct SerpResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    position: Option<u32>,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnswerBox {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

impl AnswerBox {
    fn text(self) -> Option<String> {
        self.answer
            .or(self.snippet)
            .filter(|s| !s.trim().is_empty())
    }
}

impl Backend for Serp {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Serp
    }

    fn about(&self) -> ProviderAbout {
        ProviderAbout::new()
            .website("https://serpapi.com")
            .native_summary(true)
    }

    fn request(&self, params: &RequestParams) -> Result<ProviderRequest, ProviderError> {
        let mut request = ProviderRequest::get(&self.base_url)
            .param("api_key", &self.api_key)
            .param("engine", "google")
            .param("q", &params.query)
            .param("num", params.max_results.min(MAX_RESULTS).to_string())
            .param("google_domain", &self.google_domain)
            .param("gl", &self.country)
            .param("hl", &self.language)
            .param("safe", &self.safe_search);

        if let Some(tbs) = self.time_period.as_deref().and_then(time_filter) {
            request = request.param("tbs", tbs);
        }

        Ok(request)
    }

    fn response(&self, response: ProviderResponse) -> Result<ProviderOutput, ProviderError> {
        if response.is_blank() {
            return Err(ProviderError::invalid_response(
                self.kind(),
                "SerpAPI returned an empty body",
            ));
        }

        let data: SerpResponse = serde_json::from_str(&response.text).map_err(|e| {
            ProviderError::invalid_response(self.kind(), format!("malformed SerpAPI response: {}", e))
        })?;

        if let Some(ref message) = data.error {
            if let Some(err) = self.classify_body_error(message) {
                return Err(err);
            }
            return Ok(ProviderOutput::new());
        }

        let mut organic = data.organic_results;
        // Positions are 1-based ranks; keep Google's order when present
        organic.sort_by_key(|r| r.position.unwrap_or(u32::MAX));

        let results = organic
            .into_iter()
            .map(|r| RawResult {
                title: r.title,
                url: r.link,
                content: r.snippet,
                score: None,
                published_date: r.date,
            })
            .collect();

        Ok(ProviderOutput {
            results,
            summary: data.answer_box.and_then(AnswerBox::text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(text: &str) -> ProviderResponse {
        ProviderResponse {
            status: 200,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_serp_request() {
        let serp = Serp::new("serp-key");
        let request = serp.request(&RequestParams::new("rust vs go", 250)).unwrap();

        assert_eq!(request.method, HttpMethod::Get);
        assert!(request.url.contains("serpapi.com"));
        assert_eq!(request.params.get("api_key").map(String::as_str), Some("serp-key"));
        assert_eq!(request.params.get("q").map(String::as_str), Some("rust vs go"));
        assert_eq!(request.params.get("num").map(String::as_str), Some("100"));
        assert_eq!(request.params.get("engine").map(String::as_str), Some("google"));
        assert!(!request.params.contains_key("tbs"));
    }

    #[test]
    fn test_serp_time_period() {
        let settings = SerpSettings {
            time_period: Some("week".to_string()),
            ..Default::default()
        };
        let serp = Serp::from_settings("k", &settings);
        let request = serp.request(&RequestParams::new("news", 10)).unwrap();
        assert_eq!(request.params.get("tbs").map(String::as_str), Some("qdr:w"));
    }

    #[test]
    fn test_serp_response_parsing() {
        let serp = Serp::new("k");
        let output = serp
            .response(ok(r#"{
                "organic_results": [
                    {"position": 2, "title": "Go", "link": "https://go.dev/", "snippet": "Go lang"},
                    {"position": 1, "title": "Rust", "link": "https://www.rust-lang.org/", "snippet": "Rust lang", "date": "Mar 3, 2024"}
                ]
            }"#))
            .unwrap();

        assert_eq!(output.results.len(), 2);
        assert_eq!(output.results[0].title, "Rust");
        assert_eq!(output.results[0].content, "Rust lang");
        assert_eq!(output.results[0].score, None);
        assert_eq!(output.results[0].published_date.as_deref(), Some("Mar 3, 2024"));
        assert!(output.summary.is_none());
    }

    #[test]
    fn test_serp_answer_box_is_native_summary() {
        let serp = Serp::new("k");
        let output = serp
            .response(ok(r#"{"answer_box": {"snippet": "Rust is fast."}, "organic_results": []}"#))
            .unwrap();
        assert_eq!(output.summary.as_deref(), Some("Rust is fast."));
    }

    #[test]
    fn test_serp_body_errors() {
        let serp = Serp::new("k");

        let err = serp
            .response(ok(r#"{"error": "Invalid API key. Your API key should be here: https://serpapi.com/manage-api-key"}"#))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AuthFailed);

        let err = serp
            .response(ok(r#"{"error": "Your account has run out of searches."}"#))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::RateLimited);

        let err = serp
            .response(ok(r#"{"error": "Unsupported `xx` location."}"#))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidResponse);
    }

    #[test]
    fn test_serp_no_results_is_success() {
        let serp = Serp::new("k");
        let output = serp
            .response(ok(r#"{"error": "Google hasn't returned any results for this query."}"#))
            .unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_serp_malformed_json_is_invalid() {
        let serp = Serp::new("k");
        let err = serp.response(ok("{\"organic_results\": [")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidResponse);
    }
}
