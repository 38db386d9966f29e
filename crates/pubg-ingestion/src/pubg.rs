//! PUBG API data source over reqwest.
//!
//! # Request Accounting
//!
//! Only the samples endpoint is authenticated. Its rate-limit headers are
//! written back to the lease as soon as the response head arrives, even if
//! reading the body then fails. A call that fails before any response
//! leaves the key untouched.
//!
//! The matches endpoint is public and sent with the `Accept` header only,
//! so metadata lookups cost no key budget.

use crate::config::ApiConfig;
use crate::credential::{KeyLease, RateLimitHeaders};
use crate::error::IngestionError;
use crate::response::{parse_match_stats, parse_sample_matches};
use crate::MatchSource;
use pubg_types::{MatchMetadata, SampleMatchesResult};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;

/// Media type every PUBG endpoint answers with.
pub const JSON_API: &str = "application/vnd.api+json";

/// Production match source.
///
/// # Example
///
/// ```rust,no_run
/// use pubg_ingestion::{ApiConfig, KeyPool, MatchSource, PubgSource};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let source = PubgSource::new(ApiConfig::default())?;
///     let pool = KeyPool::from_key_strings(["your-api-key"]);
///
///     let mut lease = pool.acquire(chrono::Utc::now(), &Default::default()).await?;
///     let sample = source.get_sample_matches(&mut lease).await?;
///     println!("status {}: {} ids", sample.http_status, sample.match_ids.len());
///     Ok(())
/// }
/// ```
pub struct PubgSource {
    http_client: reqwest::Client,
    config: ApiConfig,
}

impl PubgSource {
    pub fn new(config: ApiConfig) -> Result<Self, IngestionError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

impl MatchSource for PubgSource {
    async fn get_sample_matches(
        &self,
        lease: &mut KeyLease,
    ) -> Result<SampleMatchesResult, IngestionError> {
        let url = self.config.samples_url();
        tracing::debug!("GET {} with key {}", url, lease.key().masked());

        let response = self
            .http_client
            .get(url)
            .bearer_auth(lease.key_string())
            .header(ACCEPT, JSON_API)
            .send()
            .await?;

        let status = response.status();
        lease.record(&RateLimitHeaders::from_headers(response.headers()));

        if status != StatusCode::OK {
            tracing::warn!(
                "Samples request with key {} returned {}",
                lease.key().masked(),
                status
            );
            return Ok(SampleMatchesResult::failed(status.as_u16()));
        }

        let body = response.bytes().await?;
        let match_ids = parse_sample_matches(&body)?;
        tracing::debug!(
            "Discovered {} match ids ({:?} requests left on key {})",
            match_ids.len(),
            lease.key().limit_remaining(),
            lease.key().masked()
        );

        Ok(SampleMatchesResult::new(status.as_u16(), match_ids))
    }

    async fn get_match_stats(&self, match_id: &str) -> Result<MatchMetadata, IngestionError> {
        let url = self.config.match_url(match_id);
        tracing::debug!("GET {}", url);

        let response = self
            .http_client
            .get(url)
            .header(ACCEPT, JSON_API)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(IngestionError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        parse_match_stats(match_id, &body)
    }
}
