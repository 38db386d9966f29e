//! API keys and their rate-limit budgets.
//!
//! Every PUBG API key has its own request budget. The server reports what is
//! left of it on each authenticated response through three headers:
//!
//! | Header                  | Meaning                                   |
//! |-------------------------|-------------------------------------------|
//! | `X-Ratelimit-Limit`     | Requests allowed per window               |
//! | `X-Ratelimit-Remaining` | Requests left in the current window       |
//! | `X-Ratelimit-Reset`     | Unix time (seconds) the window resets at  |
//!
//! [`ApiKey`] caches the last values seen. A key that has never been used
//! has unknown limits and is treated as available.
//!
//! # Concurrency
//!
//! [`KeyPool`] gives each key its own async mutex. A [`KeyLease`] is the
//! owned guard for one key: whoever holds it is the only writer of that
//! key's limiter fields, so two in-flight calls can never spend the same
//! remaining request. There is no pool-wide lock.
//!
//! Do not call [`KeyPool::acquire`] while holding a lease from the same
//! pool; the second acquire would wait on the first lease's key.

use crate::error::IngestionError;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

const HEADER_LIMIT: &str = "x-ratelimit-limit";
const HEADER_REMAINING: &str = "x-ratelimit-remaining";
const HEADER_RESET: &str = "x-ratelimit-reset";

/// Rate-limit values reported by one response.
///
/// A header that is absent or not a number leaves its field `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RateLimitHeaders {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    pub reset: Option<DateTime<Utc>>,
}

impl RateLimitHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let number = |name: &str| -> Option<i64> {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<i64>().ok())
        };

        Self {
            limit: number(HEADER_LIMIT).and_then(|n| u32::try_from(n).ok()),
            remaining: number(HEADER_REMAINING).and_then(|n| u32::try_from(n).ok()),
            reset: number(HEADER_RESET).and_then(|secs| DateTime::from_timestamp(secs, 0)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.remaining.is_none() && self.reset.is_none()
    }
}

/// One API key and its cached rate-limit state.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    key: String,
    limit_max: Option<u32>,
    limit_remaining: Option<u32>,
    limit_reset: Option<DateTime<Utc>>,
}

impl ApiKey {
    /// A key with unknown limits.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            limit_max: None,
            limit_remaining: None,
            limit_reset: None,
        }
    }

    /// The bearer token.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Key shortened for logs (first and last four characters).
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.key.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}…{}", head, tail)
    }

    pub fn limit_max(&self) -> Option<u32> {
        self.limit_max
    }

    pub fn limit_remaining(&self) -> Option<u32> {
        self.limit_remaining
    }

    pub fn limit_reset(&self) -> Option<DateTime<Utc>> {
        self.limit_reset
    }

    /// Restore the full budget once the reset time has passed.
    pub fn refresh(&mut self, now: DateTime<Utc>) {
        if let Some(reset) = self.limit_reset {
            if now >= reset {
                self.limit_remaining = self.limit_max;
            }
        }
    }

    /// False only when the key is known to have no requests left.
    pub fn is_available(&self) -> bool {
        self.limit_remaining != Some(0)
    }

    /// Store the values a response reported. Fields the response didn't
    /// carry keep their previous value. `remaining` never exceeds `max`.
    pub fn record(&mut self, limits: &RateLimitHeaders) {
        if limits.limit.is_some() {
            self.limit_max = limits.limit;
        }
        if limits.remaining.is_some() {
            self.limit_remaining = limits.remaining;
        }
        if limits.reset.is_some() {
            self.limit_reset = limits.reset;
        }
        if let (Some(max), Some(remaining)) = (self.limit_max, self.limit_remaining) {
            self.limit_remaining = Some(remaining.min(max));
        }
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("key", &self.masked())
            .field("limit_max", &self.limit_max)
            .field("limit_remaining", &self.limit_remaining)
            .field("limit_reset", &self.limit_reset)
            .finish()
    }
}

/// Pick the first usable key, in pool order.
///
/// Each key visited is refreshed first (its budget restored if `now` is
/// past its reset), then skipped if it has nothing left. Keys after the
/// chosen one are not touched. Returns `None` when every key is exhausted.
pub fn select_credential(keys: &mut [ApiKey], now: DateTime<Utc>) -> Option<usize> {
    keys.iter_mut().position(|key| {
        key.refresh(now);
        key.is_available()
    })
}

/// Earliest reset among exhausted keys: when capacity comes back.
pub fn earliest_reset(keys: &[ApiKey]) -> Option<DateTime<Utc>> {
    keys.iter()
        .filter(|k| !k.is_available())
        .filter_map(|k| k.limit_reset)
        .min()
}

/// The set of API keys available to the process.
///
/// Cheap to clone; clones share the same keys.
#[derive(Clone, Default)]
pub struct KeyPool {
    keys: Vec<Arc<Mutex<ApiKey>>>,
}

impl KeyPool {
    pub fn new(keys: Vec<ApiKey>) -> Self {
        Self {
            keys: keys.into_iter().map(|k| Arc::new(Mutex::new(k))).collect(),
        }
    }

    /// Build a pool from raw key strings, one key per item.
    ///
    /// Surrounding whitespace is trimmed and blank items are ignored, so the
    /// lines of a key file can be passed straight in.
    pub fn from_key_strings<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            keys.into_iter()
                .map(|s| s.as_ref().trim().to_string())
                .filter(|s| !s.is_empty())
                .map(ApiKey::new)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Lease the first usable key not in `excluded`.
    ///
    /// Applies the same rule as [`select_credential`]. Keys are locked one
    /// at a time; a key currently leased elsewhere is waited on, then
    /// evaluated with whatever budget that call left it.
    ///
    /// # Errors
    ///
    /// - [`IngestionError::Config`] if the pool is empty.
    /// - [`IngestionError::RateLimitExhausted`] if no key is usable, with
    ///   the earliest reset of the exhausted keys.
    pub async fn acquire(
        &self,
        now: DateTime<Utc>,
        excluded: &HashSet<usize>,
    ) -> Result<KeyLease, IngestionError> {
        if self.keys.is_empty() {
            return Err(IngestionError::Config("no API keys loaded".to_string()));
        }

        let mut reset_at: Option<DateTime<Utc>> = None;

        for (index, slot) in self.keys.iter().enumerate() {
            if excluded.contains(&index) {
                continue;
            }

            let mut guard = slot.clone().lock_owned().await;
            guard.refresh(now);

            if guard.is_available() {
                tracing::debug!("Selected API key #{} ({})", index, guard.masked());
                return Ok(KeyLease { index, guard });
            }

            if let Some(reset) = guard.limit_reset {
                reset_at = Some(reset_at.map_or(reset, |r| r.min(reset)));
            }
        }

        Err(IngestionError::RateLimitExhausted { reset_at })
    }

    /// Copy of every key's current state, in pool order.
    pub async fn snapshot(&self) -> Vec<ApiKey> {
        let mut keys = Vec::with_capacity(self.keys.len());
        for slot in &self.keys {
            keys.push(slot.lock().await.clone());
        }
        keys
    }
}

impl fmt::Debug for KeyPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPool")
            .field("keys", &self.keys.len())
            .finish()
    }
}

/// Exclusive use of one key from a [`KeyPool`].
///
/// Dropping the lease releases the key. Limits recorded through the lease
/// are visible to the next acquirer.
pub struct KeyLease {
    index: usize,
    guard: OwnedMutexGuard<ApiKey>,
}

impl KeyLease {
    /// Position of the key in its pool.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn key(&self) -> &ApiKey {
        &self.guard
    }

    /// The bearer token.
    pub fn key_string(&self) -> &str {
        self.guard.key()
    }

    /// Store the limits a completed call reported.
    pub fn record(&mut self, limits: &RateLimitHeaders) {
        self.guard.record(limits);
    }
}

impl fmt::Debug for KeyLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyLease")
            .field("index", &self.index)
            .field("key", &*self.guard)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use reqwest::header::HeaderValue;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn key_with(remaining: u32, max: u32, reset: DateTime<Utc>) -> ApiKey {
        let mut key = ApiKey::new(format!("key-{}-{}", remaining, reset.timestamp()));
        key.record(&RateLimitHeaders {
            limit: Some(max),
            remaining: Some(remaining),
            reset: Some(reset),
        });
        key
    }

    #[test]
    fn test_new_key_is_available() {
        let key = ApiKey::new("abc");
        assert!(key.is_available());
        assert_eq!(key.limit_remaining(), None);
    }

    #[test]
    fn test_refresh_after_reset_restores_max() {
        let mut key = key_with(0, 10, now() - Duration::seconds(1));
        assert!(!key.is_available());

        key.refresh(now());
        assert_eq!(key.limit_remaining(), Some(10));
        assert!(key.is_available());
    }

    #[test]
    fn test_refresh_at_exact_reset_time() {
        let mut key = key_with(0, 10, now());
        key.refresh(now());
        assert_eq!(key.limit_remaining(), Some(10));
    }

    #[test]
    fn test_refresh_before_reset_keeps_remaining() {
        let mut key = key_with(0, 10, now() + Duration::seconds(30));
        key.refresh(now());
        assert_eq!(key.limit_remaining(), Some(0));
    }

    #[test]
    fn test_record_clamps_remaining() {
        let mut key = ApiKey::new("abc");
        key.record(&RateLimitHeaders {
            limit: Some(10),
            remaining: Some(25),
            reset: None,
        });
        assert_eq!(key.limit_remaining(), Some(10));
    }

    #[test]
    fn test_record_keeps_fields_absent_from_response() {
        let mut key = key_with(5, 10, now());
        key.record(&RateLimitHeaders {
            remaining: Some(4),
            ..Default::default()
        });
        assert_eq!(key.limit_max(), Some(10));
        assert_eq!(key.limit_remaining(), Some(4));
        assert_eq!(key.limit_reset(), Some(now()));
    }

    #[test]
    fn test_select_skips_exhausted() {
        let later = now() + Duration::seconds(60);
        let mut keys = vec![key_with(0, 10, later), key_with(3, 10, later)];
        assert_eq!(select_credential(&mut keys, now()), Some(1));
    }

    #[test]
    fn test_select_resets_before_evaluating() {
        let mut keys = vec![
            key_with(0, 10, now() - Duration::seconds(5)),
            key_with(3, 10, now()),
        ];
        assert_eq!(select_credential(&mut keys, now()), Some(0));
        assert_eq!(keys[0].limit_remaining(), Some(10));
    }

    #[test]
    fn test_select_none_when_all_exhausted() {
        let soon = now() + Duration::seconds(10);
        let later = now() + Duration::seconds(60);
        let mut keys = vec![key_with(0, 10, later), key_with(0, 10, soon)];
        assert_eq!(select_credential(&mut keys, now()), None);
        assert_eq!(earliest_reset(&keys), Some(soon));
    }

    #[test]
    fn test_select_is_deterministic() {
        let later = now() + Duration::seconds(60);
        let keys = vec![
            key_with(0, 10, later),
            key_with(2, 10, later),
            key_with(7, 10, later),
        ];
        let mut first = keys.clone();
        let mut second = keys.clone();
        assert_eq!(
            select_credential(&mut first, now()),
            select_credential(&mut second, now())
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_headers_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Ratelimit-Limit", HeaderValue::from_static("10"));
        headers.insert("X-Ratelimit-Remaining", HeaderValue::from_static("9"));
        headers.insert("X-Ratelimit-Reset", HeaderValue::from_static("1717243260"));

        let limits = RateLimitHeaders::from_headers(&headers);
        assert_eq!(limits.limit, Some(10));
        assert_eq!(limits.remaining, Some(9));
        assert_eq!(limits.reset.map(|t| t.timestamp()), Some(1717243260));
    }

    #[test]
    fn test_headers_missing_or_invalid() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Ratelimit-Remaining", HeaderValue::from_static("lots"));
        let limits = RateLimitHeaders::from_headers(&headers);
        assert!(limits.is_empty());
    }

    #[test]
    fn test_masked_key() {
        assert_eq!(ApiKey::new("abcdefghijkl").masked(), "abcd…ijkl");
        assert_eq!(ApiKey::new("short").masked(), "*****");
        assert!(!format!("{:?}", ApiKey::new("abcdefghijkl")).contains("efgh"));
    }

    #[test]
    fn test_pool_from_key_strings() {
        let pool = KeyPool::from_key_strings("aaa\n\n  bbb  \n".lines());
        assert_eq!(pool.len(), 2);
    }

    #[tokio::test]
    async fn test_acquire_empty_pool() {
        let pool = KeyPool::default();
        let result = pool.acquire(now(), &HashSet::new()).await;
        assert!(matches!(result, Err(IngestionError::Config(_))));
    }

    #[tokio::test]
    async fn test_acquire_and_record() {
        let pool = KeyPool::from_key_strings(["first", "second"]);

        let mut lease = pool.acquire(now(), &HashSet::new()).await.unwrap();
        assert_eq!(lease.index(), 0);
        lease.record(&RateLimitHeaders {
            limit: Some(10),
            remaining: Some(0),
            reset: Some(now() + Duration::seconds(60)),
        });
        drop(lease);

        let lease = pool.acquire(now(), &HashSet::new()).await.unwrap();
        assert_eq!(lease.index(), 1);
        assert_eq!(lease.key_string(), "second");
    }

    #[tokio::test]
    async fn test_acquire_respects_exclusions() {
        let pool = KeyPool::from_key_strings(["first", "second"]);
        let excluded: HashSet<usize> = [0].into_iter().collect();
        let lease = pool.acquire(now(), &excluded).await.unwrap();
        assert_eq!(lease.index(), 1);
    }

    #[tokio::test]
    async fn test_acquire_exhausted_reports_earliest_reset() {
        let soon = now() + Duration::seconds(10);
        let later = now() + Duration::seconds(60);
        let pool = KeyPool::new(vec![key_with(0, 10, later), key_with(0, 10, soon)]);

        match pool.acquire(now(), &HashSet::new()).await {
            Err(IngestionError::RateLimitExhausted { reset_at }) => assert_eq!(reset_at, Some(soon)),
            other => panic!("expected RateLimitExhausted, got {:?}", other),
        }

        // Once the earliest window has passed that key becomes usable again.
        let lease = pool.acquire(soon, &HashSet::new()).await.unwrap();
        assert_eq!(lease.index(), 1);
        assert_eq!(lease.key().limit_remaining(), Some(10));
    }

    #[tokio::test]
    async fn test_dropped_lease_leaves_state_untouched() {
        let pool = KeyPool::from_key_strings(["only"]);
        let lease = pool.acquire(now(), &HashSet::new()).await.unwrap();
        drop(lease);

        let snapshot = pool.snapshot().await;
        assert_eq!(snapshot[0], ApiKey::new("only"));
    }
}
