//! research-search: multi-provider web search routing
//!
//! Routes a query to Tavily and/or SerpAPI according to a strategy,
//! falls back to the secondary provider when the primary fails, and
//! normalizes whatever comes back into one `SearchResponse` shape.

pub mod config;
pub mod metrics;
pub mod network;
pub mod pipeline;
pub mod providers;
pub mod results;
pub mod routing;
pub mod search;
pub mod web;

pub use config::Settings;
pub use providers::{Provider, ProviderKind};
pub use results::{SearchResponse, SearchResult};
pub use routing::Strategy;
pub use search::{Search, SearchQuery};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of results per query
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Default timeout per provider attempt in seconds
pub const DEFAULT_TIMEOUT: u64 = 30;
