//! HTTP client for downloading telemetry logs.

use crate::decompress::decompress;
use crate::error::TelemetryError;
use crate::parser::TelemetryParser;
use crate::TelemetrySource;
use pubg_types::Telemetry;
use std::time::Duration;

/// Downloads telemetry logs from the CDN.
///
/// Telemetry URLs come from match metadata and need no API key.
///
/// # Example
///
/// ```rust,no_run
/// use pubg_telemetry::{TelemetryClient, TelemetrySource};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = TelemetryClient::new();
///     let telemetry = client
///         .fetch_telemetry("https://telemetry-cdn.pubg.com/bluehole-pubg/steam/2024/06/01/12/00/abc-telemetry.json")
///         .await?;
///
///     println!("{} events on {:?}", telemetry.len(), telemetry.map_name());
///     Ok(())
/// }
/// ```
#[derive(Clone, Default)]
pub struct TelemetryClient {
    http_client: reqwest::Client,
    parser: TelemetryParser,
}

impl TelemetryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TelemetryError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            parser: TelemetryParser::default(),
        })
    }

    /// Use `parser` for [`fetch_telemetry`](TelemetrySource::fetch_telemetry).
    pub fn with_parser(mut self, parser: TelemetryParser) -> Self {
        self.parser = parser;
        self
    }
}

impl TelemetrySource for TelemetryClient {
    async fn fetch_and_decompress(&self, url: &str) -> Result<Vec<u8>, TelemetryError> {
        tracing::debug!("Fetching telemetry from: {}", url);

        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelemetryError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        tracing::debug!("Downloaded {} bytes", body.len());

        let decompressed = decompress(&body)?;
        tracing::debug!("Decompressed to {} bytes", decompressed.len());

        Ok(decompressed)
    }

    async fn fetch_telemetry(&self, url: &str) -> Result<Telemetry, TelemetryError> {
        let bytes = self.fetch_and_decompress(url).await?;
        self.parser.parse(&bytes)
    }
}
