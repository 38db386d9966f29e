//! Configuration for the ingestion layer.
//!
//! # Environment Variables
//!
//! - `PUBG_SHARD`: platform shard, one of `steam`, `kakao`, `psn`, `xbox`,
//!   `console` (default: steam)
//! - `PUBG_API_URL`: API base URL (default: `https://api.pubg.com`)
//! - `PUBG_REQUEST_TIMEOUT_SECS`: per-request timeout (default: 30)

use crate::error::IngestionError;
use std::env;
use std::time::Duration;
use url::Url;

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.pubg.com";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Platform shard. Match ids are only valid on the shard that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shard {
    /// PC (Steam).
    #[default]
    Steam,
    /// PC (Kakao).
    Kakao,
    /// PlayStation.
    Psn,
    /// Xbox.
    Xbox,
    /// Cross-platform console shard.
    Console,
}

impl Shard {
    /// Load the shard from `PUBG_SHARD`.
    ///
    /// Unset or unrecognised values fall back to `Steam`.
    pub fn from_env() -> Self {
        env::var("PUBG_SHARD")
            .ok()
            .and_then(|s| Self::parse(&s))
            .unwrap_or_default()
    }

    /// Parse a shard name (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "steam" => Some(Shard::Steam),
            "kakao" => Some(Shard::Kakao),
            "psn" => Some(Shard::Psn),
            "xbox" => Some(Shard::Xbox),
            "console" => Some(Shard::Console),
            _ => None,
        }
    }

    /// Path segment used in API URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Shard::Steam => "steam",
            Shard::Kakao => "kakao",
            Shard::Psn => "psn",
            Shard::Xbox => "xbox",
            Shard::Console => "console",
        }
    }
}

/// Where and how to reach the API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub shard: Shard,
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            shard: Shard::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ApiConfig {
    /// Build a config from the `PUBG_*` environment variables.
    pub fn from_env() -> Result<Self, IngestionError> {
        let mut config = Self::default().with_shard(Shard::from_env());

        if let Ok(url) = env::var("PUBG_API_URL") {
            config = config.with_base_url(&url)?;
        }

        if let Ok(secs) = env::var("PUBG_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                IngestionError::Config(format!("PUBG_REQUEST_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, url: &str) -> Result<Self, IngestionError> {
        let url = Url::parse(url)?;
        if url.cannot_be_a_base() {
            return Err(IngestionError::Config(format!(
                "base URL cannot have a path appended: {}",
                url
            )));
        }
        self.base_url = url;
        Ok(self)
    }

    pub fn with_shard(mut self, shard: Shard) -> Self {
        self.shard = shard;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// `{base}/shards/{shard}/samples`
    pub fn samples_url(&self) -> Url {
        self.shard_url(&["samples"])
    }

    /// `{base}/shards/{shard}/matches/{match_id}`
    pub fn match_url(&self, match_id: &str) -> Url {
        self.shard_url(&["matches", match_id])
    }

    fn shard_url(&self, tail: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // with_base_url rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["shards", self.shard.as_str()])
                .extend(tail);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_steam() {
        assert_eq!(Shard::default(), Shard::Steam);
        assert_eq!(ApiConfig::default().shard, Shard::Steam);
    }

    #[test]
    fn test_parse_shard() {
        assert_eq!(Shard::parse("PSN"), Some(Shard::Psn));
        assert_eq!(Shard::parse(" kakao "), Some(Shard::Kakao));
        assert_eq!(Shard::parse("pc"), None);
    }

    #[test]
    fn test_samples_url() {
        let config = ApiConfig::default();
        assert_eq!(
            config.samples_url().as_str(),
            "https://api.pubg.com/shards/steam/samples"
        );
    }

    #[test]
    fn test_match_url_with_base_path() {
        let config = ApiConfig::default()
            .with_base_url("http://localhost:8080/proxy/")
            .unwrap()
            .with_shard(Shard::Xbox);
        assert_eq!(
            config.match_url("abc-123").as_str(),
            "http://localhost:8080/proxy/shards/xbox/matches/abc-123"
        );
    }

    #[test]
    fn test_match_id_is_escaped() {
        let config = ApiConfig::default();
        assert_eq!(
            config.match_url("a/b").as_str(),
            "https://api.pubg.com/shards/steam/matches/a%2Fb"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(ApiConfig::default().with_base_url("mailto:x@y.z").is_err());
        assert!(ApiConfig::default().with_base_url("not a url").is_err());
    }
}
