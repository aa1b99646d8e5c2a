//! Search provider module
//!
//! Defines the adapter contract, the provider error taxonomy and the two
//! concrete backends (Tavily and SerpAPI), plus a registry of the providers
//! configured for this process.

mod error;
mod http;
mod loader;
mod registry;
mod traits;

// Backend implementations
pub mod serp;
pub mod tavily;

pub use error::{ErrorKind, ProviderError};
pub use http::HttpProvider;
pub use loader::ProviderLoader;
pub use registry::ProviderRegistry;
pub use serp::Serp;
pub use tavily::Tavily;
pub use traits::*;
