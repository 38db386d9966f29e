//! API result types: discovered match ids and per-match metadata.

use crate::GameMap;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one call to the sample-matches endpoint.
///
/// A non-200 response is still a result: `match_ids` is empty and
/// `http_status` says why. Callers decide whether to try another key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleMatchesResult {
    pub http_status: u16,
    /// Match ids in server order.
    pub match_ids: Vec<String>,
}

impl SampleMatchesResult {
    pub fn new(http_status: u16, match_ids: Vec<String>) -> Self {
        Self {
            http_status,
            match_ids,
        }
    }

    /// Result for a non-200 response.
    pub fn failed(http_status: u16) -> Self {
        Self::new(http_status, Vec::new())
    }

    pub fn is_success(&self) -> bool {
        self.http_status == 200
    }
}

/// Descriptive attributes of one match plus where its telemetry lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchMetadata {
    pub match_id: String,

    /// e.g. `"squad-fpp"`.
    pub game_mode: String,

    /// API asset name, e.g. `"Erangel_Main"`.
    pub map_name: String,

    /// Match creation time (`createdAt`).
    pub start_time: DateTime<Utc>,

    pub duration_seconds: u64,

    /// URL of the gzip-compressed telemetry log.
    pub telemetry_url: String,
}

impl MatchMetadata {
    pub fn map(&self) -> GameMap {
        GameMap::from_name(&self.map_name)
    }

    /// Approximate end time (`start_time + duration`), `None` if the
    /// duration does not fit a timestamp.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        let seconds = i64::try_from(self.duration_seconds).ok()?;
        let duration = TimeDelta::try_seconds(seconds)?;
        self.start_time.checked_add_signed(duration)
    }
}
