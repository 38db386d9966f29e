//! Acquisition loop.
//!
//! The `Pipeline` struct is the main entry point: it discovers recent match
//! ids, drops the ones the caller already has, and resolves the rest into
//! metadata plus parsed telemetry.

use crate::error::PipelineError;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use pubg_ingestion::{IngestionError, KeyPool, MatchSource};
use pubg_telemetry::TelemetrySource;
use pubg_types::{MatchMetadata, Telemetry};
use std::collections::HashSet;
use std::env;
use std::time::Duration;

/// Default number of matches resolved at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default time allowed for one match (metadata + telemetry download).
pub const DEFAULT_MATCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Default cap on discovery calls per run.
pub const DEFAULT_MAX_DISCOVERY_ROUNDS: usize = 10;

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Matches resolved concurrently.
    pub concurrency: usize,

    /// Deadline for resolving a single match.
    pub match_timeout: Duration,

    /// Upper bound on discovery calls in one [`Pipeline::acquire`].
    pub max_discovery_rounds: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            match_timeout: DEFAULT_MATCH_TIMEOUT,
            max_discovery_rounds: DEFAULT_MAX_DISCOVERY_ROUNDS,
        }
    }
}

impl PipelineConfig {
    /// Defaults, with `PUBG_CONCURRENCY` applied if set.
    ///
    /// An unparseable value is logged and ignored.
    pub fn from_env() -> Self {
        let config = Self::default();
        match env::var("PUBG_CONCURRENCY") {
            Ok(value) => match value.trim().parse::<usize>() {
                Ok(n) => config.with_concurrency(n),
                Err(_) => {
                    tracing::warn!("Ignoring PUBG_CONCURRENCY={:?}: not a number", value);
                    config
                }
            },
            Err(_) => config,
        }
    }

    /// Set the concurrency (at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_match_timeout(mut self, timeout: Duration) -> Self {
        self.match_timeout = timeout;
        self
    }

    pub fn with_max_discovery_rounds(mut self, rounds: usize) -> Self {
        self.max_discovery_rounds = rounds;
        self
    }
}

/// A match with its metadata and parsed telemetry.
#[derive(Debug, Clone)]
pub struct ResolvedMatch {
    pub metadata: MatchMetadata,
    pub telemetry: Telemetry,
}

impl ResolvedMatch {
    pub fn match_id(&self) -> &str {
        &self.metadata.match_id
    }
}

/// Why an acquisition run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The requested number of matches was resolved.
    Complete,
    /// A discovery round produced no id that wasn't already seen or held.
    SourceExhausted,
    /// Every key ran out of requests after some matches were resolved.
    CapacityExhausted { reset_at: Option<DateTime<Utc>> },
    /// Every key was rejected with a non-200 status.
    KeysRejected,
    /// `max_discovery_rounds` discovery calls were made.
    RoundLimit,
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcquisitionTally {
    /// Distinct ids returned by discovery.
    pub discovered: usize,
    /// Ids skipped because the caller already had them.
    pub already_downloaded: usize,
    pub resolved: usize,
    /// Ids whose metadata or telemetry could not be resolved.
    pub failed: usize,
}

/// Result of [`Pipeline::acquire`].
#[derive(Debug, Clone)]
pub struct Acquisition {
    /// Resolved matches, in discovery order.
    pub matches: Vec<ResolvedMatch>,
    pub tally: AcquisitionTally,
    pub stop_reason: StopReason,
}

impl Acquisition {
    pub fn is_complete(&self) -> bool {
        self.stop_reason == StopReason::Complete
    }
}

/// Orchestrates discovery and resolution over a [`MatchSource`] and a
/// [`TelemetrySource`].
///
/// # Example
///
/// ```rust,no_run
/// use pubg_ingestion::{ApiConfig, KeyPool, PubgSource};
/// use pubg_pipeline::{Pipeline, PipelineConfig};
/// use pubg_telemetry::TelemetryClient;
/// use std::collections::HashSet;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pipeline = Pipeline::new(
///         PubgSource::new(ApiConfig::default())?,
///         TelemetryClient::new(),
///         KeyPool::from_key_strings(["your-api-key"]),
///         PipelineConfig::default(),
///     );
///
///     let acquisition = pipeline.acquire(5, &HashSet::new()).await?;
///     for m in &acquisition.matches {
///         println!("{}: {} events", m.match_id(), m.telemetry.len());
///     }
///     Ok(())
/// }
/// ```
pub struct Pipeline<S, T> {
    source: S,
    telemetry: T,
    keys: KeyPool,
    config: PipelineConfig,
    clock: fn() -> DateTime<Utc>,
}

impl<S: MatchSource, T: TelemetrySource> Pipeline<S, T> {
    pub fn new(source: S, telemetry: T, keys: KeyPool, config: PipelineConfig) -> Self {
        Self {
            source,
            telemetry,
            keys,
            config,
            clock: Utc::now,
        }
    }

    /// Replace the wall clock used for rate-limit resets.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn keys(&self) -> &KeyPool {
        &self.keys
    }

    /// Resolve up to `n` matches the caller doesn't already have.
    ///
    /// Each round leases a key, asks for a sample of recent ids, filters out
    /// `already_downloaded` and ids seen in earlier rounds, then resolves the
    /// survivors concurrently (in discovery order) until `n` have succeeded.
    /// A key answered with a non-200 status is not used again in this run.
    /// Matches that fail or time out are logged, counted and skipped.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::CapacityExhausted`] if every key is rate limited
    ///   before anything was resolved. Once some matches are in hand the run
    ///   ends with [`StopReason::CapacityExhausted`] instead.
    /// - [`PipelineError::NoMatchesDiscovered`] if no round returned any id.
    /// - [`PipelineError::Ingestion`] for an empty key pool or a malformed
    ///   discovery response.
    pub async fn acquire(
        &self,
        n: usize,
        already_downloaded: &HashSet<String>,
    ) -> Result<Acquisition, PipelineError> {
        let mut matches = Vec::new();
        let mut tally = AcquisitionTally::default();

        if n == 0 {
            return Ok(Acquisition {
                matches,
                tally,
                stop_reason: StopReason::Complete,
            });
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut excluded: HashSet<usize> = HashSet::new();
        let mut discovered_any = false;
        let mut stop_reason = StopReason::RoundLimit;

        for round in 1..=self.config.max_discovery_rounds {
            if !self.keys.is_empty() && excluded.len() >= self.keys.len() {
                stop_reason = StopReason::KeysRejected;
                break;
            }

            let mut lease = match self.keys.acquire((self.clock)(), &excluded).await {
                Ok(lease) => lease,
                Err(IngestionError::RateLimitExhausted { reset_at }) => {
                    if matches.is_empty() {
                        return Err(PipelineError::CapacityExhausted { reset_at });
                    }
                    stop_reason = StopReason::CapacityExhausted { reset_at };
                    break;
                }
                Err(e) => return Err(e.into()),
            };

            let key_index = lease.index();
            let sample = self.source.get_sample_matches(&mut lease).await;
            drop(lease);

            let sample = match sample {
                Ok(sample) => sample,
                Err(e) if e.is_transient() => {
                    tracing::warn!("Discovery round {} failed: {}", round, e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if !sample.is_success() {
                tracing::warn!(
                    "Key #{} got HTTP {} from discovery, not using it again",
                    key_index,
                    sample.http_status
                );
                excluded.insert(key_index);
                continue;
            }

            discovered_any |= !sample.match_ids.is_empty();

            let mut fresh = Vec::new();
            for id in sample.match_ids {
                if !seen.insert(id.clone()) {
                    continue;
                }
                if already_downloaded.contains(&id) {
                    tally.already_downloaded += 1;
                    continue;
                }
                fresh.push(id);
            }
            tally.discovered = seen.len();

            tracing::info!(
                "Discovery round {}: {} new match ids ({} seen so far)",
                round,
                fresh.len(),
                seen.len()
            );

            if fresh.is_empty() {
                stop_reason = StopReason::SourceExhausted;
                break;
            }

            self.resolve_all(fresh, n, &mut matches, &mut tally).await;

            if matches.len() >= n {
                stop_reason = StopReason::Complete;
                break;
            }
        }

        if !discovered_any {
            return Err(PipelineError::NoMatchesDiscovered);
        }

        tracing::info!(
            "Acquisition finished ({:?}): {} resolved, {} failed, {} already downloaded",
            stop_reason,
            tally.resolved,
            tally.failed,
            tally.already_downloaded
        );

        Ok(Acquisition {
            matches,
            tally,
            stop_reason,
        })
    }

    /// Fetch one match's metadata, then download and parse its telemetry.
    pub async fn resolve_match(&self, match_id: &str) -> Result<ResolvedMatch, PipelineError> {
        let metadata = self.source.get_match_stats(match_id).await?;
        let telemetry = self
            .telemetry
            .fetch_telemetry(&metadata.telemetry_url)
            .await?;

        Ok(ResolvedMatch {
            metadata,
            telemetry,
        })
    }

    /// Resolve `ids` in order, `concurrency` at a time, until `matches`
    /// holds `n`. In-flight work past that point is dropped.
    async fn resolve_all(
        &self,
        ids: Vec<String>,
        n: usize,
        matches: &mut Vec<ResolvedMatch>,
        tally: &mut AcquisitionTally,
    ) {
        let timeout = self.config.match_timeout;

        let mut results = stream::iter(ids.into_iter().map(|id| async move {
            let outcome = match tokio::time::timeout(timeout, self.resolve_match(&id)).await {
                Ok(result) => result,
                Err(_) => Err(PipelineError::Timeout {
                    match_id: id.clone(),
                    after: timeout,
                }),
            };
            (id, outcome)
        }))
        .buffered(self.config.concurrency.max(1));

        while let Some((id, outcome)) = results.next().await {
            match outcome {
                Ok(resolved) => {
                    tracing::info!(
                        "Resolved match {} ({} on {}, {} telemetry events)",
                        id,
                        resolved.metadata.game_mode,
                        resolved.metadata.map().display_name(),
                        resolved.telemetry.len()
                    );
                    matches.push(resolved);
                    tally.resolved += 1;
                    if matches.len() >= n {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping match {}: {}", id, e);
                    tally.failed += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.max_discovery_rounds, DEFAULT_MAX_DISCOVERY_ROUNDS);
    }

    #[test]
    fn test_concurrency_floor() {
        assert_eq!(PipelineConfig::default().with_concurrency(0).concurrency, 1);
    }

    #[test]
    fn test_is_complete() {
        let acquisition = Acquisition {
            matches: Vec::new(),
            tally: AcquisitionTally::default(),
            stop_reason: StopReason::SourceExhausted,
        };
        assert!(!acquisition.is_complete());
    }
}
