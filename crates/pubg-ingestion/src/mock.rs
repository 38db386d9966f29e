//! Mock match source for testing.
//!
//! `MockSource` implements `MatchSource` with scripted responses, so the
//! key pool and the pipeline can be exercised without network calls.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pubg_ingestion::{MatchSource, MockSource};
//!
//! let mock = MockSource::new()
//!     .with_samples(vec![SampleMatchesResult::new(200, vec!["m1".into()])])
//!     .with_match(metadata);
//! ```

use crate::credential::{KeyLease, RateLimitHeaders};
use crate::error::IngestionError;
use crate::MatchSource;
use pubg_types::{MatchMetadata, SampleMatchesResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Scripted match source.
///
/// Discovery responses are served in order, one per call; once the script
/// runs out every further call is an empty 200. Calls marked with
/// [`with_network_failure_on`](Self::with_network_failure_on) fail in
/// transport instead and do not consume a scripted response. Metadata is
/// looked up by id and unknown ids answer `Http { status: 404 }`.
///
/// Clones share the call counter and the recorded keys.
#[derive(Default, Clone)]
pub struct MockSource {
    /// Discovery responses, in call order.
    pub samples: Vec<SampleMatchesResult>,

    /// Metadata by match id.
    pub matches: HashMap<String, MatchMetadata>,

    /// Limits written to the lease after every discovery call, if set.
    pub rate_limits: Option<RateLimitHeaders>,

    /// Zero-based discovery calls that fail with `Network`.
    pub network_failures: HashSet<usize>,

    sample_calls: Arc<AtomicUsize>,
    samples_served: Arc<AtomicUsize>,
    keys_used: Arc<Mutex<Vec<String>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the discovery responses (builder pattern).
    pub fn with_samples(mut self, samples: Vec<SampleMatchesResult>) -> Self {
        self.samples = samples;
        self
    }

    /// Add one match's metadata (builder pattern).
    pub fn with_match(mut self, metadata: MatchMetadata) -> Self {
        self.matches.insert(metadata.match_id.clone(), metadata);
        self
    }

    /// Report these limits on every discovery call (builder pattern).
    pub fn with_rate_limits(mut self, limits: RateLimitHeaders) -> Self {
        self.rate_limits = Some(limits);
        self
    }

    /// Make discovery call number `call` (zero-based) fail in transport
    /// (builder pattern).
    pub fn with_network_failure_on(mut self, call: usize) -> Self {
        self.network_failures.insert(call);
        self
    }

    /// Number of discovery calls made so far.
    pub fn sample_calls(&self) -> usize {
        self.sample_calls.load(Ordering::SeqCst)
    }

    /// Keys used for discovery, in call order.
    pub fn keys_used(&self) -> Vec<String> {
        self.keys_used
            .lock()
            .map(|keys| keys.clone())
            .unwrap_or_default()
    }
}

impl MatchSource for MockSource {
    async fn get_sample_matches(
        &self,
        lease: &mut KeyLease,
    ) -> Result<SampleMatchesResult, IngestionError> {
        let call = self.sample_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut keys) = self.keys_used.lock() {
            keys.push(lease.key_string().to_string());
        }

        if self.network_failures.contains(&call) {
            return Err(IngestionError::Network("connection reset".to_string()));
        }

        if let Some(limits) = &self.rate_limits {
            lease.record(limits);
        }

        let served = self.samples_served.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .samples
            .get(served)
            .cloned()
            .unwrap_or_else(|| SampleMatchesResult::new(200, Vec::new())))
    }

    async fn get_match_stats(&self, match_id: &str) -> Result<MatchMetadata, IngestionError> {
        self.matches
            .get(match_id)
            .cloned()
            .ok_or(IngestionError::Http { status: 404 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyPool;
    use chrono::{TimeZone, Utc};
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_samples_served_in_order() {
        let mock = MockSource::new().with_samples(vec![
            SampleMatchesResult::new(200, vec!["a".to_string()]),
            SampleMatchesResult::failed(429),
        ]);
        let pool = KeyPool::from_key_strings(["k"]);
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let mut lease = pool.acquire(now, &HashSet::new()).await.unwrap();
        assert_eq!(
            mock.get_sample_matches(&mut lease).await.unwrap().match_ids,
            vec!["a"]
        );
        assert_eq!(
            mock.get_sample_matches(&mut lease).await.unwrap().http_status,
            429
        );
        let exhausted = mock.get_sample_matches(&mut lease).await.unwrap();
        assert!(exhausted.is_success());
        assert!(exhausted.match_ids.is_empty());

        assert_eq!(mock.sample_calls(), 3);
        assert_eq!(mock.keys_used(), vec!["k", "k", "k"]);
    }

    #[tokio::test]
    async fn test_network_failure_keeps_script_position() {
        let mock = MockSource::new()
            .with_samples(vec![SampleMatchesResult::new(200, vec!["a".to_string()])])
            .with_network_failure_on(0);
        let pool = KeyPool::from_key_strings(["k"]);
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut lease = pool.acquire(now, &HashSet::new()).await.unwrap();

        let first = mock.get_sample_matches(&mut lease).await;
        assert!(matches!(first, Err(IngestionError::Network(_))));
        assert_eq!(
            mock.get_sample_matches(&mut lease).await.unwrap().match_ids,
            vec!["a"]
        );
        assert_eq!(mock.sample_calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_match_is_404() {
        let mock = MockSource::new();
        let result = mock.get_match_stats("nope").await;
        assert!(matches!(result, Err(IngestionError::Http { status: 404 })));
    }
}
