//! Result types and normalization
//!
//! Defines the canonical result schema returned to callers and the
//! normalizer that maps provider output into it.

mod normalizer;
mod types;

pub use normalizer::{dedup_key, Normalizer};
pub use types::*;
