//! Error types for the acquisition pipeline.

use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Errors that end an acquisition run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Error from the ingestion layer.
    #[error("ingestion error: {0}")]
    Ingestion(#[from] pubg_ingestion::IngestionError),

    /// Error from the telemetry layer.
    #[error("telemetry error: {0}")]
    Telemetry(#[from] pubg_telemetry::TelemetryError),

    /// Every key was rate limited before any match was resolved.
    #[error("no API capacity left (earliest reset: {})", fmt_reset(.reset_at))]
    CapacityExhausted { reset_at: Option<DateTime<Utc>> },

    /// No key produced a single match id.
    #[error("no match ids could be discovered with any API key")]
    NoMatchesDiscovered,

    /// Resolving one match took longer than the configured timeout.
    #[error("match {match_id} timed out after {after:?}")]
    Timeout { match_id: String, after: Duration },
}

fn fmt_reset(reset_at: &Option<DateTime<Utc>>) -> String {
    reset_at
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string())
}
