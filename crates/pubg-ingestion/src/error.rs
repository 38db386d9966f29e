//! Error types for the ingestion layer.
//!
//! A plain `thiserror` enum. External errors (reqwest, serde_json) are
//! flattened into owned strings at the boundary so the enum stays free of
//! generics and boxing; the variants that callers branch on (HTTP status,
//! exhausted keys, missing fields) keep structured data.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur while talking to the PUBG API.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Transport failure: no response was received, so no key was charged.
    #[error("network error: {0}")]
    Network(String),

    /// The API answered with a non-success status.
    #[error("HTTP status {status}")]
    Http { status: u16 },

    /// Every key in the pool has `remaining == 0`.
    /// `reset_at` is the earliest known reset, if any key reported one.
    #[error("all API keys are rate limited (earliest reset: {})", fmt_reset(.reset_at))]
    RateLimitExhausted { reset_at: Option<DateTime<Utc>> },

    /// A successful response lacked a field the resolver needs.
    /// `field` is the JSON path, e.g. `data.relationships.assets.data`.
    #[error("missing field in API response: {field}")]
    MissingField { field: String },

    /// The response body was not the JSON we expected.
    #[error("parse error: {0}")]
    Parse(String),

    /// Configuration errors (bad base URL, empty key pool).
    #[error("config error: {0}")]
    Config(String),

    /// No data available (e.g., mock not configured).
    #[error("no data: {0}")]
    NoData(String),
}

impl IngestionError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        IngestionError::MissingField {
            field: field.into(),
        }
    }

    /// True for errors another key or a later retry might fix.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            IngestionError::Network(_)
                | IngestionError::Http { .. }
                | IngestionError::RateLimitExhausted { .. }
        )
    }
}

fn fmt_reset(reset_at: &Option<DateTime<Utc>>) -> String {
    reset_at
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string())
}

impl From<reqwest::Error> for IngestionError {
    #[inline]
    fn from(err: reqwest::Error) -> Self {
        IngestionError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for IngestionError {
    #[inline]
    fn from(err: serde_json::Error) -> Self {
        IngestionError::Parse(err.to_string())
    }
}

impl From<url::ParseError> for IngestionError {
    fn from(err: url::ParseError) -> Self {
        IngestionError::Config(format!("invalid URL: {}", err))
    }
}
