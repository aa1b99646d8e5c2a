//! Research pipeline
//!
//! Thin consumer of the orchestrator: search, hand the results to a
//! summarizer, and optionally turn the summary into an email draft. The
//! summarizer and the draft creator are external collaborators behind
//! traits.

mod digest;

pub use digest::DigestSummarizer;

use crate::results::{SearchResponse, SearchResult};
use crate::routing::Strategy;
use crate::search::Search;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Pipeline failures
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("search failed: {0}")]
    Search(String),
    #[error("no search results found")]
    NoResults,
    #[error("summarization failed: {0}")]
    Summarizer(String),
    #[error("draft creation failed: {0}")]
    Draft(String),
}

/// Turns search results into a summary
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        results: &[SearchResult],
        query: &str,
        native_summary: Option<&str>,
    ) -> Result<String, PipelineError>;
}

/// Creates an email draft and returns its id
#[async_trait]
pub trait DraftCreator: Send + Sync {
    async fn create_draft(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, PipelineError>;
}

/// Output of a research run
#[derive(Debug, Clone, Serialize)]
pub struct ResearchReport {
    pub response: SearchResponse,
    pub summary: String,
    pub sources: Vec<String>,
}

/// A draft handed to a [`DraftCreator`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailDraft {
    pub draft_id: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Search → summarize → (draft)
pub struct ResearchPipeline {
    search: Arc<Search>,
    summarizer: Arc<dyn Summarizer>,
    drafts: Option<Arc<dyn DraftCreator>>,
}

impl ResearchPipeline {
    pub fn new(search: Arc<Search>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            search,
            summarizer,
            drafts: None,
        }
    }

    pub fn with_draft_creator(mut self, drafts: Arc<dyn DraftCreator>) -> Self {
        self.drafts = Some(drafts);
        self
    }

    /// Search and summarize. A failed search or one with no results is an
    /// error.
    pub async fn research(
        &self,
        text: &str,
        max_results: Option<usize>,
        strategy: Option<Strategy>,
    ) -> Result<ResearchReport, PipelineError> {
        info!(query = %text, "running research");
        let response = self.search.search(text, max_results, strategy).await;

        if !response.success {
            let error = response.error.clone().unwrap_or_default();
            warn!(error = %error, "research search failed");
            return Err(PipelineError::Search(error));
        }
        if response.results.is_empty() {
            return Err(PipelineError::NoResults);
        }

        let summary = self
            .summarizer
            .summarize(&response.results, &response.query, response.ai_summary.as_deref())
            .await?;
        let sources = response.sources().into_iter().map(String::from).collect();

        info!(results = response.total_results(), "research completed");
        Ok(ResearchReport {
            response,
            summary,
            sources,
        })
    }

    /// Research, then create an email draft of the findings
    pub async fn research_and_draft(
        &self,
        text: &str,
        max_results: Option<usize>,
        strategy: Option<Strategy>,
        recipient: &str,
    ) -> Result<(ResearchReport, EmailDraft), PipelineError> {
        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(PipelineError::Draft("recipient cannot be empty".to_string()));
        }
        let drafts = self
            .drafts
            .as_ref()
            .ok_or_else(|| PipelineError::Draft("no draft creator configured".to_string()))?;

        let report = self.research(text, max_results, strategy).await?;
        let subject = format!("Research: {}", report.response.query);
        let body = draft_body(&report);

        let draft_id = drafts.create_draft(recipient, &subject, &body).await?;
        info!(draft_id = %draft_id, "email draft created");

        let draft = EmailDraft {
            draft_id,
            recipient: recipient.to_string(),
            subject,
            body,
        };
        Ok((report, draft))
    }
}

fn draft_body(report: &ResearchReport) -> String {
    let mut body = report.summary.trim_end().to_string();
    if !report.sources.is_empty() {
        body.push_str("\n\nSources:\n");
        for (i, source) in report.sources.iter().enumerate() {
            body.push_str(&format!("{}. {}\n", i + 1, source));
        }
    }
    body
}
