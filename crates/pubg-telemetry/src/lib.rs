//! pubg-telemetry: Telemetry download, decompression and parsing.
//!
//! Every PUBG match publishes a telemetry log: a gzip-compressed JSON array
//! of timestamped records, discriminated by their `_T` field. This crate
//! turns such a log into a [`Telemetry`] value.
//!
//! # Example
//!
//! ```rust,no_run
//! use pubg_telemetry::{TelemetryClient, TelemetrySource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TelemetryClient::new();
//!     let telemetry = client.fetch_telemetry("https://telemetry-cdn.pubg.com/...").await?;
//!
//!     for player in telemetry.drop_summary().players {
//!         println!("#{} {} landed at {:?}", player.ranking, player.name, player.landing);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Files on disk
//!
//! [`decompress_batch`] inflates a directory of previously downloaded
//! `.gz` logs into another directory; see the [`batch`] module.
//!
//! # Units
//!
//! All coordinates are centimeters, exactly as logged. Conversion to
//! kilometers is left to the caller ([`pubg_types::Location::to_km`]).

pub mod batch;
mod client;
pub mod decompress;
pub mod error;
mod events;
mod mock;
mod parser;

pub use batch::{decompress_batch, BatchReport};
pub use client::TelemetryClient;
pub use error::TelemetryError;
pub use mock::MockTelemetry;
pub use parser::{parse_telemetry, TelemetryParser};

pub use pubg_types::{Telemetry, TelemetryEvent};

/// Source of telemetry logs.
///
/// ## Implementors
///
/// - [`TelemetryClient`]: downloads over HTTP
/// - [`MockTelemetry`]: in-memory bodies for tests
pub trait TelemetrySource: Send + Sync {
    /// Download the log at `url`, gunzipping it if it is still compressed.
    ///
    /// # Errors
    ///
    /// - [`TelemetryError::HttpStatus`] for a non-2xx answer.
    /// - [`TelemetryError::Decompression`] for a corrupt gzip stream.
    fn fetch_and_decompress(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, TelemetryError>> + Send;

    /// Download and parse the log at `url`.
    fn fetch_telemetry(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Result<Telemetry, TelemetryError>> + Send;
}
