//! pubg-cli: Runs one match acquisition from environment configuration.
//!
//! # Environment Variables
//!
//! - `PUBG_API_KEYS`: keys separated by commas or newlines. Takes precedence
//!   over the key file.
//! - `PUBG_API_KEYS_FILE`: one key per line (default: `api_keys.txt`)
//! - `PUBG_MATCH_COUNT`: matches to acquire (default: 5)
//! - `PUBG_DOWNLOADED_FILE`: match ids already held, one per line. Newly
//!   resolved ids are appended.
//! - `PUBG_SHARD`, `PUBG_API_URL`, `PUBG_REQUEST_TIMEOUT_SECS`: see
//!   `pubg_ingestion::config`
//! - `PUBG_CONCURRENCY`: matches resolved at once (default: 4)
//!
//! Exits non-zero when no key can discover any match id.

use anyhow::Context;
use pubg_ingestion::{ApiConfig, KeyPool, PubgSource};
use pubg_pipeline::{Pipeline, PipelineConfig};
use pubg_telemetry::TelemetryClient;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default number of matches per run.
const DEFAULT_MATCH_COUNT: usize = 5;

/// Default key file.
const DEFAULT_KEYS_FILE: &str = "api_keys.txt";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pubg_cli=info,pubg_pipeline=info,pubg_ingestion=info,pubg_telemetry=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let api_config = ApiConfig::from_env()?;
    let pipeline_config = PipelineConfig::from_env();
    let match_count: usize = match std::env::var("PUBG_MATCH_COUNT") {
        Ok(n) => n
            .trim()
            .parse()
            .with_context(|| format!("PUBG_MATCH_COUNT is not a number: {}", n))?,
        Err(_) => DEFAULT_MATCH_COUNT,
    };

    let keys = load_keys()?;
    let downloaded_file = std::env::var("PUBG_DOWNLOADED_FILE").ok();
    let already_downloaded = match &downloaded_file {
        Some(path) => read_id_list(Path::new(path))?,
        None => HashSet::new(),
    };

    tracing::info!(
        "Acquiring {} matches from {} (shard: {}, keys: {}, already downloaded: {})",
        match_count,
        api_config.base_url,
        api_config.shard.as_str(),
        keys.len(),
        already_downloaded.len()
    );

    let telemetry = TelemetryClient::with_timeout(pipeline_config.match_timeout)?;
    let pipeline = Pipeline::new(PubgSource::new(api_config)?, telemetry, keys, pipeline_config);

    let acquisition = pipeline.acquire(match_count, &already_downloaded).await?;

    for resolved in &acquisition.matches {
        let summary = resolved.telemetry.drop_summary();
        let map = resolved.metadata.map();
        let landed = summary.players.iter().filter(|p| p.landing.is_some()).count();

        tracing::info!(
            "{} | {} | {} ({}) | {} ranked players, {} landings",
            resolved.match_id(),
            resolved.metadata.start_time.format("%Y-%m-%d %H:%M"),
            map.display_name(),
            resolved.metadata.game_mode,
            summary.players.len(),
            landed
        );

        if let (Some(first), Some(last)) = (summary.flight_path.first, summary.flight_path.last) {
            let (x0, y0) = first.to_km();
            let (x1, y1) = last.to_km();
            tracing::info!(
                "  flight path ({:.1}, {:.1}) km -> ({:.1}, {:.1}) km",
                x0,
                y0,
                x1,
                y1
            );
        }

        if let Some(winner) = summary.players.iter().find(|p| p.ranking == 1) {
            if let Some((x, y)) = winner.landing.map(|p| p.to_km()) {
                tracing::info!("  winner {} landed at ({:.2}, {:.2}) km", winner.name, x, y);
            }
        }
    }

    if let Some(path) = &downloaded_file {
        let ids: Vec<&str> = acquisition.matches.iter().map(|m| m.match_id()).collect();
        append_ids(Path::new(path), &ids)?;
    }

    tracing::info!(
        "Done ({:?}): {} resolved, {} failed, {} already downloaded, {} discovered",
        acquisition.stop_reason,
        acquisition.tally.resolved,
        acquisition.tally.failed,
        acquisition.tally.already_downloaded,
        acquisition.tally.discovered
    );

    Ok(())
}

/// Keys from `PUBG_API_KEYS`, or else from the key file.
fn load_keys() -> anyhow::Result<KeyPool> {
    if let Ok(keys) = std::env::var("PUBG_API_KEYS") {
        return Ok(parse_keys(&keys));
    }

    let path = std::env::var("PUBG_API_KEYS_FILE").unwrap_or_else(|_| DEFAULT_KEYS_FILE.to_string());
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read API keys from {}", path))?;
    Ok(parse_keys(&contents))
}

fn parse_keys(raw: &str) -> KeyPool {
    KeyPool::from_key_strings(raw.split([',', '\n']))
}

/// One id per line; a missing file means nothing has been downloaded yet.
fn read_id_list(path: &Path) -> anyhow::Result<HashSet<String>> {
    if !path.exists() {
        tracing::warn!("{} does not exist, treating as empty", path.display());
        return Ok(HashSet::new());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

fn append_ids(path: &Path, ids: &[&str]) -> anyhow::Result<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    for id in ids {
        writeln!(file, "{}", id)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys() {
        let pool = parse_keys("one, two\nthree\r\n\n");
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_id_list_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("downloaded.txt");

        assert!(read_id_list(&path).unwrap().is_empty());

        append_ids(&path, &["m1", "m2"]).unwrap();
        append_ids(&path, &["m3"]).unwrap();

        let ids = read_id_list(&path).unwrap();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains("m2"));
    }
}
