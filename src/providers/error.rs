//! Provider error taxonomy
//!
//! Every adapter failure is reported as a [`ProviderError`] tagged with the
//! provider and one of five [`ErrorKind`]s. These never reach callers as-is;
//! the orchestrator folds them into `SearchResponse::error`.

use super::traits::ProviderKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Maximum characters of a response body quoted in an error message
const BODY_EXCERPT_LEN: usize = 200;

/// Failure category of a single provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The call exceeded its timeout and was cancelled
    Timeout,
    /// HTTP 429 or an exhausted quota
    RateLimited,
    /// HTTP 401/403 or rejected credentials
    AuthFailed,
    /// Connection, DNS or transport failure
    NetworkError,
    /// Non-2xx status, empty body or malformed payload
    InvalidResponse,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::AuthFailed => "auth_failed",
            Self::NetworkError => "network_error",
            Self::InvalidResponse => "invalid_response",
        }
    }

    /// Whether calling the same provider again could ever help.
    /// Bad credentials stay bad; everything else may be transient.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::AuthFailed)
    }

    /// Map an HTTP status outside 2xx to an error kind
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::AuthFailed,
            429 => Self::RateLimited,
            _ => Self::InvalidResponse,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed provider call
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{provider}: {kind} ({message})")]
pub struct ProviderError {
    pub provider: ProviderKind,
    pub kind: ErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: ProviderKind, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            provider,
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(provider: ProviderKind, after: Duration) -> Self {
        Self::new(
            provider,
            ErrorKind::Timeout,
            format!("{} search timeout after {:.1}s", provider.display_name(), after.as_secs_f64()),
        )
    }

    pub fn invalid_response(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::new(provider, ErrorKind::InvalidResponse, message)
    }

    /// Build an error for a non-2xx response, quoting the backend's own
    /// error message when the body carries one.
    pub fn from_status(provider: ProviderKind, status: u16, body: &str) -> Self {
        let detail = error_detail(body);
        let message = if detail.is_empty() {
            format!("{} returned {}", provider.display_name(), status)
        } else {
            format!("{} returned {}: {}", provider.display_name(), status, detail)
        };
        Self::new(provider, ErrorKind::from_status(status), message)
    }

    /// Classify a transport-level failure from the HTTP client. The request
    /// URL is stripped from the message since it may carry an API key.
    pub fn from_transport(provider: ProviderKind, err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return Self::timeout(provider, timeout);
        }

        let kind = if err.is_decode() || err.is_body() {
            ErrorKind::InvalidResponse
        } else {
            ErrorKind::NetworkError
        };
        Self::new(
            provider,
            kind,
            format!("{} request failed: {}", provider.display_name(), err.without_url()),
        )
    }
}

/// Pull `error` or `detail` out of a JSON body, else quote the start of it
fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "detail", "message"] {
            match value.get(key) {
                Some(serde_json::Value::String(s)) => return s.clone(),
                Some(serde_json::Value::Null) | None => {}
                Some(other) => return other.to_string(),
            }
        }
    }
    body.trim().chars().take(BODY_EXCERPT_LEN).collect()
}
