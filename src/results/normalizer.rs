//! Normalization of raw provider output into [`SearchResult`]s

use super::types::SearchResult;
use crate::providers::{ProviderKind, RawResult};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Normalizes one provider's raw output: drops unusable entries,
/// deduplicates by normalized URL, fills missing scores and clamps the
/// result count. Provider relevance order is preserved.
#[derive(Debug, Clone)]
pub struct Normalizer {
    max_results: usize,
}

impl Normalizer {
    pub fn new(max_results: usize) -> Self {
        Self { max_results }
    }

    pub fn normalize(&self, provider: ProviderKind, raw: Vec<RawResult>) -> Vec<SearchResult> {
        let mut seen = HashSet::new();
        let mut results = Vec::with_capacity(raw.len().min(self.max_results));

        for item in raw {
            if results.len() >= self.max_results {
                break;
            }

            let url = item.url.trim();
            let Some(key) = dedup_key(url) else {
                debug!(provider = %provider, url = %url, "dropping result with unusable URL");
                continue;
            };

            // First occurrence wins; it ranks higher
            if !seen.insert(key) {
                continue;
            }

            results.push(SearchResult {
                title: item.title.trim().to_string(),
                url: url.to_string(),
                content: item.content.trim().to_string(),
                score: clean_score(item.score),
                provider,
                published_date: item
                    .published_date
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
            });
        }

        results
    }
}

/// Deduplication key: lowercased scheme, host and path. Query, fragment,
/// default port and trailing slash are dropped. `None` if the URL does not
/// parse as an absolute URL with a host.
pub fn dedup_key(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = Url::parse(trimmed).ok()?;
    let host = parsed.host_str()?.to_lowercase();

    let mut key = format!("{}://{}", parsed.scheme(), host);
    // `port()` is None for the scheme's default port
    if let Some(port) = parsed.port() {
        key.push_str(&format!(":{}", port));
    }

    let path = parsed.path().to_lowercase();
    let path = path.trim_end_matches('/');
    key.push_str(if path.is_empty() { "/" } else { path });

    Some(key)
}

fn clean_score(score: Option<f64>) -> f64 {
    match score {
        Some(s) if s.is_finite() && s > 0.0 => s,
        _ => 0.0,
    }
}
