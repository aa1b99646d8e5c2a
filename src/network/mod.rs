//! HTTP networking module
//!
//! Provides the pooled HTTP client used by every search provider.

mod client;

pub use client::HttpClient;
