//! Mock telemetry source for testing.

use crate::error::TelemetryError;
use crate::parser::TelemetryParser;
use crate::TelemetrySource;
use pubg_types::Telemetry;
use std::collections::HashMap;

/// Serves telemetry bodies from memory, keyed by URL.
///
/// Bodies go through the same decompress-then-parse path as the real
/// client, so gzip and malformed fixtures behave as they would live.
/// Unknown URLs answer `HttpStatus { status: 404 }`.
#[derive(Default, Clone)]
pub struct MockTelemetry {
    /// Raw (possibly gzipped) bodies by URL.
    pub bodies: HashMap<String, Vec<u8>>,
    parser: TelemetryParser,
}

impl MockTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url` (builder pattern).
    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }

    pub fn with_parser(mut self, parser: TelemetryParser) -> Self {
        self.parser = parser;
        self
    }
}

impl TelemetrySource for MockTelemetry {
    async fn fetch_and_decompress(&self, url: &str) -> Result<Vec<u8>, TelemetryError> {
        let body = self
            .bodies
            .get(url)
            .ok_or(TelemetryError::HttpStatus { status: 404 })?;
        crate::decompress::decompress(body)
    }

    async fn fetch_telemetry(&self, url: &str) -> Result<Telemetry, TelemetryError> {
        let bytes = self.fetch_and_decompress(url).await?;
        self.parser.parse(&bytes)
    }
}
