//! Search orchestration module
//!
//! Walks a query's route plan across the configured providers, applies
//! fallback, and folds the outcome into a single `SearchResponse`.

mod executor;
mod models;

pub use executor::{Search, SearchState};
pub use models::*;
