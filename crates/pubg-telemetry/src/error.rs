//! Error types for telemetry operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when fetching, decompressing or parsing telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// HTTP request failed before a status was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The telemetry CDN answered with a non-success status.
    #[error("telemetry download returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// Gzip decompression failed.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// The telemetry body is not a JSON array of records.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A batch input or output directory does not exist.
    #[error("path not found: {}", path.display())]
    PathNotFound { path: PathBuf },

    /// One file of a batch could not be decompressed or written.
    #[error("failed to decompress {filename}: {source}")]
    FileCopy {
        filename: String,
        source: std::io::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
