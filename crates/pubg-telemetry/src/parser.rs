//! Telemetry log parser.
//!
//! A log is one JSON array. Each element becomes one [`TelemetryEvent`], in
//! array order, with no deduplication. Records whose `_T` is in the parser's
//! ignored set are dropped before conversion; high-volume kinds such as
//! `LogPlayerPosition` make up most of a log and are rarely needed.

use crate::error::TelemetryError;
use crate::events::RawRecord;
use pubg_types::{Telemetry, TelemetryEvent};
use serde_json::Value;
use std::collections::HashSet;

/// Parses telemetry logs, optionally skipping some record kinds.
#[derive(Debug, Clone, Default)]
pub struct TelemetryParser {
    ignored: HashSet<String>,
}

impl TelemetryParser {
    /// A parser that keeps every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser that drops records whose `_T` is one of `kinds`.
    pub fn ignoring<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignored: kinds.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_ignored(&self, kind: &str) -> bool {
        self.ignored.contains(kind)
    }

    /// Parse a decompressed telemetry log.
    ///
    /// # Errors
    ///
    /// [`TelemetryError::Json`] if `bytes` is not a JSON array. Individual
    /// records never fail: unknown or incomplete ones become
    /// [`TelemetryEvent::Other`].
    pub fn parse(&self, bytes: &[u8]) -> Result<Telemetry, TelemetryError> {
        let records: Vec<Value> = serde_json::from_slice(bytes)?;
        let total = records.len();

        let events: Vec<TelemetryEvent> = records
            .into_iter()
            .map(RawRecord::new)
            .filter(|record| !record.kind().is_some_and(|k| self.is_ignored(k)))
            .map(RawRecord::into_event)
            .collect();

        tracing::debug!(
            "Parsed {} telemetry events ({} ignored)",
            events.len(),
            total - events.len()
        );

        Ok(Telemetry::new(events))
    }
}

/// Parse a telemetry log keeping every record.
pub fn parse_telemetry(bytes: &[u8]) -> Result<Telemetry, TelemetryError> {
    TelemetryParser::new().parse(bytes)
}
