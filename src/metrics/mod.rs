//! Metrics collection module
//!
//! Tracks per-provider attempts, outcomes and response times. Purely
//! observational: routing never reads these numbers.

use crate::providers::{ErrorKind, ProviderKind};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

/// Response times kept per provider for the rolling average
const RESPONSE_WINDOW: usize = 100;

#[derive(Debug, Default)]
struct ProviderCounters {
    attempts: u64,
    successes: u64,
    errors: HashMap<ErrorKind, u64>,
    response_times_ms: VecDeque<u64>,
}

/// Process-wide metrics collector
#[derive(Debug, Default)]
pub struct Metrics {
    total_searches: AtomicU64,
    failed_searches: AtomicU64,
    providers: RwLock<HashMap<ProviderKind, ProviderCounters>>,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished orchestration
    pub fn record_search(&self, success: bool) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.failed_searches.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a provider call that answered
    pub fn record_success(&self, provider: ProviderKind, elapsed: Duration) {
        self.with_counters(provider, |c| {
            c.attempts += 1;
            c.successes += 1;
            push_time(&mut c.response_times_ms, elapsed);
        });
    }

    /// Record a provider call that failed
    pub fn record_error(&self, provider: ProviderKind, kind: ErrorKind, elapsed: Duration) {
        self.with_counters(provider, |c| {
            c.attempts += 1;
            *c.errors.entry(kind).or_insert(0) += 1;
            push_time(&mut c.response_times_ms, elapsed);
        });
    }

    /// Get total searches
    pub fn total_searches(&self) -> u64 {
        self.total_searches.load(Ordering::Relaxed)
    }

    /// Get searches where every provider failed
    pub fn failed_searches(&self) -> u64 {
        self.failed_searches.load(Ordering::Relaxed)
    }

    /// Get statistics for one provider
    pub fn provider_stats(&self, provider: ProviderKind) -> Option<ProviderStats> {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        providers.get(&provider).map(ProviderStats::from_counters)
    }

    /// Get statistics for every provider seen so far
    pub fn snapshot(&self) -> BTreeMap<ProviderKind, ProviderStats> {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        providers
            .iter()
            .map(|(kind, counters)| (*kind, ProviderStats::from_counters(counters)))
            .collect()
    }

    fn with_counters(&self, provider: ProviderKind, f: impl FnOnce(&mut ProviderCounters)) {
        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        f(providers.entry(provider).or_default());
    }
}

fn push_time(times: &mut VecDeque<u64>, elapsed: Duration) {
    if times.len() >= RESPONSE_WINDOW {
        times.pop_front();
    }
    times.push_back(elapsed.as_millis() as u64);
}

/// Statistics for a single provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderStats {
    pub attempts: u64,
    pub successes: u64,
    pub errors: BTreeMap<String, u64>,
    pub avg_response_time_ms: Option<u64>,
    /// Percentage of attempts that answered
    pub reliability: f64,
}

impl ProviderStats {
    fn from_counters(c: &ProviderCounters) -> Self {
        let avg_response_time_ms = if c.response_times_ms.is_empty() {
            None
        } else {
            Some(c.response_times_ms.iter().sum::<u64>() / c.response_times_ms.len() as u64)
        };

        let reliability = if c.attempts == 0 {
            100.0
        } else {
            (c.successes as f64 / c.attempts as f64) * 100.0
        };

        Self {
            attempts: c.attempts,
            successes: c.successes,
            errors: c
                .errors
                .iter()
                .map(|(kind, n)| (kind.to_string(), *n))
                .collect(),
            avg_response_time_ms,
            reliability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let metrics = Metrics::new();

        metrics.record_search(true);
        metrics.record_search(false);
        metrics.record_success(ProviderKind::Tavily, Duration::from_millis(100));
        metrics.record_error(ProviderKind::Tavily, ErrorKind::Timeout, Duration::from_millis(300));

        assert_eq!(metrics.total_searches(), 2);
        assert_eq!(metrics.failed_searches(), 1);

        let stats = metrics.provider_stats(ProviderKind::Tavily).unwrap();
        assert_eq!(stats.attempts, 2);
        assert_eq!(stats.successes, 1);
        assert_eq!(stats.errors.get("timeout"), Some(&1));
        assert_eq!(stats.avg_response_time_ms, Some(200));
        assert_eq!(stats.reliability, 50.0);

        assert!(metrics.provider_stats(ProviderKind::Serp).is_none());
    }

    #[test]
    fn test_response_window_is_bounded() {
        let metrics = Metrics::new();
        for _ in 0..RESPONSE_WINDOW {
            metrics.record_success(ProviderKind::Serp, Duration::from_millis(1000));
        }
        for _ in 0..RESPONSE_WINDOW {
            metrics.record_success(ProviderKind::Serp, Duration::from_millis(10));
        }

        let stats = metrics.provider_stats(ProviderKind::Serp).unwrap();
        assert_eq!(stats.avg_response_time_ms, Some(10));
        assert_eq!(stats.attempts, 2 * RESPONSE_WINDOW as u64);
    }
}
