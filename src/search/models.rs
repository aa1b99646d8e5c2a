//! Search query model

use crate::config::SearchSettings;
use crate::routing::Strategy;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Reasons a query cannot be constructed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("query cannot be empty")]
    Empty,
    #[error("max_results must be at least 1")]
    ZeroResults,
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
}

/// A validated, immutable search request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    text: String,
    max_results: usize,
    #[serde(serialize_with = "serialize_secs")]
    timeout: Duration,
    strategy: Strategy,
}

impl SearchQuery {
    /// Create a query. The text is trimmed; the timeout applies to each
    /// provider attempt, not to the whole search.
    pub fn new(
        text: impl AsRef<str>,
        max_results: usize,
        timeout: Duration,
        strategy: Strategy,
    ) -> Result<Self, QueryError> {
        let text = text.as_ref().trim();
        if text.is_empty() {
            return Err(QueryError::Empty);
        }
        if max_results == 0 {
            return Err(QueryError::ZeroResults);
        }
        if timeout.is_zero() {
            return Err(QueryError::ZeroTimeout);
        }

        Ok(Self {
            text: text.to_string(),
            max_results,
            timeout,
            strategy,
        })
    }

    /// Create a query with crate defaults
    pub fn simple(text: impl AsRef<str>) -> Result<Self, QueryError> {
        Self::new(
            text,
            crate::DEFAULT_MAX_RESULTS,
            Duration::from_secs(crate::DEFAULT_TIMEOUT),
            Strategy::default(),
        )
    }

    /// Create a query, filling unset values from settings
    pub fn with_defaults(
        text: impl AsRef<str>,
        max_results: Option<usize>,
        strategy: Option<Strategy>,
        defaults: &SearchSettings,
    ) -> Result<Self, QueryError> {
        Self::new(
            text,
            max_results.unwrap_or(defaults.max_results),
            defaults.timeout_duration(),
            strategy.unwrap_or(defaults.strategy),
        )
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}
