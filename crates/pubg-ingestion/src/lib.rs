//! # pubg-ingestion
//!
//! Match discovery and metadata resolution against the PUBG API.
//!
//! This crate provides a [`MatchSource`] trait over the two endpoints the
//! pipeline needs, plus the [`KeyPool`] that rations rate-limited API keys
//! between concurrent callers.
//!
//! ## Design Principles
//!
//! - **Native async traits**: no `async_trait` boxing.
//!
//! - **Per-key locking**: each key has its own async mutex. A [`KeyLease`]
//!   is held for the length of one authenticated call, so two calls never
//!   spend the same remaining request.
//!
//! - **Testable**: [`MockSource`] scripts discovery and metadata responses.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pubg_ingestion::{ApiConfig, KeyPool, MatchSource, PubgSource};
//! use std::collections::HashSet;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = PubgSource::new(ApiConfig::from_env()?)?;
//!     let pool = KeyPool::from_key_strings(["key-one", "key-two"]);
//!
//!     let mut lease = pool.acquire(chrono::Utc::now(), &HashSet::new()).await?;
//!     let sample = source.get_sample_matches(&mut lease).await?;
//!     drop(lease);
//!
//!     for id in sample.match_ids.iter().take(3) {
//!         let meta = source.get_match_stats(id).await?;
//!         println!("{} on {}: {}", meta.game_mode, meta.map_name, meta.telemetry_url);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Rate Limits
//!
//! A key with `remaining == 0` is skipped until its reset time passes. When
//! every key is exhausted, [`KeyPool::acquire`] fails with
//! [`IngestionError::RateLimitExhausted`] carrying the earliest reset. There
//! are no automatic retries.

pub mod config;
pub mod credential;
pub mod error;
mod mock;
mod pubg;
pub mod response;

pub use config::{ApiConfig, Shard};
pub use credential::{earliest_reset, select_credential, ApiKey, KeyLease, KeyPool, RateLimitHeaders};
pub use error::IngestionError;
pub use mock::MockSource;
pub use pubg::{PubgSource, JSON_API};

pub use pubg_types::{MatchMetadata, SampleMatchesResult};

/// Source of match ids and match metadata.
///
/// ## Implementors
///
/// - [`PubgSource`]: the live API over reqwest
/// - [`MockSource`]: scripted responses for tests
pub trait MatchSource: Send + Sync {
    /// Ask the samples endpoint for a batch of recent match ids.
    ///
    /// The lease's limiter fields are updated from the response headers
    /// whatever the status. A non-200 answer is `Ok` with an empty id list
    /// and the status set, so the caller can decide to try another key.
    ///
    /// # Errors
    ///
    /// - [`IngestionError::Network`] if no response arrived (key untouched).
    /// - [`IngestionError::MissingField`] or [`IngestionError::Parse`] if a
    ///   200 body lacks the id array.
    fn get_sample_matches(
        &self,
        lease: &mut KeyLease,
    ) -> impl std::future::Future<Output = Result<SampleMatchesResult, IngestionError>> + Send;

    /// Resolve one match id to its metadata and telemetry URL.
    ///
    /// # Errors
    ///
    /// - [`IngestionError::Http`] for any non-200 status.
    /// - [`IngestionError::MissingField`] naming the first absent path.
    fn get_match_stats(
        &self,
        match_id: &str,
    ) -> impl std::future::Future<Output = Result<MatchMetadata, IngestionError>> + Send;
}
