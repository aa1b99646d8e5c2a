//! Search execution and orchestration

use super::models::{QueryError, SearchQuery};
use crate::config::SearchSettings;
use crate::metrics::Metrics;
use crate::providers::{ProviderError, ProviderKind, ProviderOutput, ProviderRegistry, RequestParams};
use crate::results::{Normalizer, SearchResponse};
use crate::routing::{RoutingPolicy, Strategy};
use chrono::Utc;
use futures::future::join_all;
use std::future::Future;
use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Where a single orchestration currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Pending,
    Trying(ProviderKind),
    Succeeded(ProviderKind),
    Failed,
}

/// Runs a query through its route plan: providers are tried strictly in
/// order and the first one that answers wins. Provider failures never
/// escape; they end up in `SearchResponse::error`.
#[derive(Debug, Clone)]
pub struct Search {
    registry: Arc<ProviderRegistry>,
    metrics: Option<Arc<Metrics>>,
    defaults: SearchSettings,
}

impl Search {
    /// Create a new search executor with default settings
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            metrics: None,
            defaults: SearchSettings::default(),
        }
    }

    /// Use these settings for values a caller leaves unset
    pub fn with_defaults(mut self, defaults: SearchSettings) -> Self {
        self.defaults = defaults;
        self
    }

    /// Record provider outcomes into `metrics`
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn defaults(&self) -> &SearchSettings {
        &self.defaults
    }

    pub fn metrics(&self) -> Option<&Arc<Metrics>> {
        self.metrics.as_ref()
    }

    /// Build a query, filling unset values from the configured defaults
    pub fn query(
        &self,
        text: &str,
        max_results: Option<usize>,
        strategy: Option<Strategy>,
    ) -> Result<SearchQuery, QueryError> {
        SearchQuery::with_defaults(text, max_results, strategy, &self.defaults)
    }

    /// Convenience entry point. Invalid input yields a failed response
    /// rather than an error.
    pub async fn search(
        &self,
        text: &str,
        max_results: Option<usize>,
        strategy: Option<Strategy>,
    ) -> SearchResponse {
        match self.query(text, max_results, strategy) {
            Ok(query) => self.execute(&query).await,
            Err(e) => {
                warn!(error = %e, "rejected search query");
                failure(text.trim(), Vec::new(), format!("invalid query: {}", e), 0.0)
            }
        }
    }

    /// Execute a query to completion
    pub async fn execute(&self, query: &SearchQuery) -> SearchResponse {
        self.execute_with_cancel(query, std::future::pending::<()>())
            .await
    }

    /// Execute a query, abandoning it as soon as `cancel` resolves. The
    /// in-flight provider call is dropped and no further steps run.
    pub async fn execute_with_cancel<C>(&self, query: &SearchQuery, cancel: C) -> SearchResponse
    where
        C: Future<Output = ()>,
    {
        let span = info_span!(
            "search",
            id = %Uuid::new_v4(),
            strategy = %query.strategy(),
            query = %query.text(),
        );

        async {
            let response = self.run(query, cancel).await;
            if let Some(metrics) = &self.metrics {
                metrics.record_search(response.success);
            }
            if response.success {
                info!(
                    provider = ?response.winning_provider(),
                    results = response.total_results(),
                    search_time = response.search_time,
                    "search succeeded"
                );
            } else {
                info!(
                    providers_used = ?response.providers_used,
                    error = response.error.as_deref().unwrap_or_default(),
                    "search failed"
                );
            }
            response
        }
        .instrument(span)
        .await
    }

    /// Execute several independent queries concurrently, preserving order
    pub async fn execute_batch(&self, queries: &[SearchQuery]) -> Vec<SearchResponse> {
        join_all(queries.iter().map(|query| self.execute(query))).await
    }

    async fn run<C>(&self, query: &SearchQuery, cancel: C) -> SearchResponse
    where
        C: Future<Output = ()>,
    {
        let plan = RoutingPolicy::plan(query.strategy());
        let params = RequestParams::new(query.text(), query.max_results());
        let mut cancel = pin!(cancel);
        let mut run = Run::new();

        for step in &plan {
            let Some(provider) = self.registry.get(step.provider) else {
                warn!(provider = %step.provider, "provider not configured, skipping");
                run.failures.push(format!("{}: not configured", step.provider));
                continue;
            };

            run.transition(SearchState::Trying(step.provider));
            let attempt = Instant::now();
            let invoked = AtomicBool::new(false);

            // Hard bound even for adapters that overrun their own timeout
            let call = async {
                invoked.store(true, Ordering::Relaxed);
                tokio::time::timeout(query.timeout(), provider.invoke(&params, query.timeout()))
                    .await
            };

            let outcome = tokio::select! {
                biased;
                _ = &mut cancel => None,
                result = call => Some(result.unwrap_or_else(|_| {
                    Err(ProviderError::timeout(step.provider, query.timeout()))
                })),
            };

            // Only a call that was actually polled counts as an attempt
            if invoked.load(Ordering::Relaxed) {
                run.started.get_or_insert(attempt);
                run.providers_used.push(step.provider);
            }

            match outcome {
                None => {
                    warn!(provider = %step.provider, "search cancelled");
                    let note = if invoked.load(Ordering::Relaxed) {
                        "cancelled"
                    } else {
                        "cancelled before invocation"
                    };
                    run.failures.push(format!("{}: {}", step.provider, note));
                    run.cancelled = true;
                    break;
                }
                Some(Ok(output)) => {
                    if let Some(metrics) = &self.metrics {
                        metrics.record_success(step.provider, attempt.elapsed());
                    }
                    run.transition(SearchState::Succeeded(step.provider));
                    let native_summary = provider.about().native_summary;
                    return run.succeed(query, step.provider, output, native_summary);
                }
                Some(Err(err)) => {
                    warn!(
                        provider = %err.provider,
                        kind = %err.kind,
                        fallback = step.is_fallback,
                        "provider failed: {}",
                        err.message
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics.record_error(step.provider, err.kind, attempt.elapsed());
                    }
                    run.failures.push(err.to_string());
                }
            }
        }

        run.transition(SearchState::Failed);
        run.fail(query)
    }
}

/// Mutable bookkeeping for one orchestration
struct Run {
    state: SearchState,
    providers_used: Vec<ProviderKind>,
    failures: Vec<String>,
    started: Option<Instant>,
    cancelled: bool,
}

impl Run {
    fn new() -> Self {
        Self {
            state: SearchState::Pending,
            providers_used: Vec::new(),
            failures: Vec::new(),
            started: None,
            cancelled: false,
        }
    }

    fn transition(&mut self, next: SearchState) {
        debug!(from = ?self.state, to = ?next, "search state");
        self.state = next;
    }

    fn elapsed(&self) -> f64 {
        self.started
            .map(|s| s.elapsed().as_secs_f64())
            .unwrap_or_default()
    }

    fn succeed(
        self,
        query: &SearchQuery,
        provider: ProviderKind,
        output: ProviderOutput,
        native_summary: bool,
    ) -> SearchResponse {
        let search_time = self.elapsed();
        let results = Normalizer::new(query.max_results()).normalize(provider, output.results);
        let ai_summary = if native_summary {
            output.summary.filter(|s| !s.trim().is_empty())
        } else {
            None
        };

        SearchResponse {
            success: true,
            query: query.text().to_string(),
            results,
            providers_used: self.providers_used,
            ai_summary,
            search_time,
            error: None,
            timestamp: Utc::now(),
        }
    }

    fn fail(self, query: &SearchQuery) -> SearchResponse {
        let search_time = self.elapsed();
        let error = if self.cancelled {
            format!("search cancelled: {}", self.failures.join("; "))
        } else if self.providers_used.is_empty() {
            format!(
                "no configured provider for strategy {}: {}",
                query.strategy(),
                self.failures.join("; ")
            )
        } else {
            format!("all providers failed: {}", self.failures.join("; "))
        };
        failure(query.text(), self.providers_used, error, search_time)
    }
}

fn failure(
    query: &str,
    providers_used: Vec<ProviderKind>,
    error: String,
    search_time: f64,
) -> SearchResponse {
    SearchResponse {
        success: false,
        query: query.to_string(),
        results: Vec::new(),
        providers_used,
        ai_summary: None,
        search_time,
        error: Some(error),
        timestamp: Utc::now(),
    }
}
