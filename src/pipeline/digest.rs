//! Built-in summarizer that formats results without a language model

use super::{PipelineError, Summarizer};
use crate::results::SearchResult;
use async_trait::async_trait;
use std::fmt::{self, Write};

/// Produces a numbered digest of the results: title, source, snippet and
/// publication date, prefixed by the provider's own summary if any.
#[derive(Debug, Clone, Default)]
pub struct DigestSummarizer {
    snippet_len: Option<usize>,
}

impl DigestSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Truncate snippets to `len` characters
    pub fn with_snippet_len(mut self, len: usize) -> Self {
        self.snippet_len = Some(len);
        self
    }

    fn snippet<'a>(&self, content: &'a str) -> std::borrow::Cow<'a, str> {
        match self.snippet_len {
            Some(len) if content.chars().count() > len => {
                let cut: String = content.chars().take(len).collect();
                format!("{}...", cut.trim_end()).into()
            }
            _ => content.into(),
        }
    }

    fn write_digest(
        &self,
        out: &mut String,
        results: &[SearchResult],
        query: &str,
        native_summary: Option<&str>,
    ) -> fmt::Result {
        writeln!(out, "Research results for \"{}\"", query)?;

        if let Some(summary) = native_summary.filter(|s| !s.trim().is_empty()) {
            writeln!(out, "\nSummary: {}", summary.trim())?;
        }

        for (i, result) in results.iter().enumerate() {
            writeln!(out, "\n{}. {}", i + 1, result.title)?;
            writeln!(out, "   Source: {}", result.url)?;
            if !result.content.is_empty() {
                writeln!(out, "   Content: {}", self.snippet(&result.content))?;
            }
            if let Some(date) = &result.published_date {
                writeln!(out, "   Published: {}", date)?;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Summarizer for DigestSummarizer {
    async fn summarize(
        &self,
        results: &[SearchResult],
        query: &str,
        native_summary: Option<&str>,
    ) -> Result<String, PipelineError> {
        let mut out = String::new();
        self.write_digest(&mut out, results, query, native_summary)
            .map_err(|e| PipelineError::Summarizer(e.to_string()))?;
        Ok(out)
    }
}
