//! JSON:API response bodies for the samples and matches endpoints.
//!
//! Every field is optional at the serde level; presence is checked by hand
//! afterwards so a missing field is reported with its full path instead of
//! a generic serde message.

use crate::error::IngestionError;
use chrono::{DateTime, Utc};
use pubg_types::MatchMetadata;
use serde::Deserialize;
use serde_json::{Map, Value};

const ASSET_TYPE: &str = "asset";

#[derive(Debug, Deserialize)]
struct SamplesDocument {
    data: Option<SamplesData>,
}

#[derive(Debug, Deserialize)]
struct SamplesData {
    relationships: Option<SamplesRelationships>,
}

#[derive(Debug, Deserialize)]
struct SamplesRelationships {
    matches: Option<Relationship>,
}

#[derive(Debug, Deserialize)]
struct Relationship {
    data: Option<Vec<ResourceId>>,
}

#[derive(Debug, Deserialize)]
struct ResourceId {
    #[serde(rename = "type")]
    kind: Option<String>,
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MatchDocument {
    data: Option<MatchData>,
    included: Option<Vec<IncludedResource>>,
}

#[derive(Debug, Deserialize)]
struct MatchData {
    attributes: Option<MatchAttributes>,
    relationships: Option<MatchRelationships>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchAttributes {
    game_mode: Option<String>,
    map_name: Option<String>,
    created_at: Option<String>,
    duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct MatchRelationships {
    assets: Option<Relationship>,
}

#[derive(Debug, Deserialize)]
struct IncludedResource {
    id: Option<String>,
    attributes: Option<Map<String, Value>>,
}

/// Match ids from a 200 response of the samples endpoint, in server order.
///
/// An empty `data` array is a valid (empty) sample. A body without the
/// array at all is an error, never an empty list.
pub fn parse_sample_matches(body: &[u8]) -> Result<Vec<String>, IngestionError> {
    let doc: SamplesDocument = serde_json::from_slice(body)?;

    let entries = doc
        .data
        .ok_or_else(|| IngestionError::missing("data"))?
        .relationships
        .ok_or_else(|| IngestionError::missing("data.relationships"))?
        .matches
        .ok_or_else(|| IngestionError::missing("data.relationships.matches"))?
        .data
        .ok_or_else(|| IngestionError::missing("data.relationships.matches.data"))?;

    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            entry.id.ok_or_else(|| {
                IngestionError::missing(format!("data.relationships.matches.data[{}].id", i))
            })
        })
        .collect()
}

/// Metadata and telemetry URL from a 200 response of the matches endpoint.
pub fn parse_match_stats(match_id: &str, body: &[u8]) -> Result<MatchMetadata, IngestionError> {
    let doc: MatchDocument = serde_json::from_slice(body)?;
    let data = doc.data.ok_or_else(|| IngestionError::missing("data"))?;

    let assets = data
        .relationships
        .and_then(|r| r.assets)
        .and_then(|a| a.data)
        .ok_or_else(|| IngestionError::missing("data.relationships.assets.data"))?;

    let mut asset_ids = assets
        .into_iter()
        .filter(|r| r.kind.as_deref() == Some(ASSET_TYPE))
        .filter_map(|r| r.id);

    let asset_id = asset_ids
        .next()
        .ok_or_else(|| IngestionError::missing("data.relationships.assets.data[type=asset].id"))?;

    let extra = asset_ids.count();
    if extra > 0 {
        tracing::warn!(
            "Match {} lists {} telemetry assets, using the first ({})",
            match_id,
            extra + 1,
            asset_id
        );
    }

    let telemetry_url = telemetry_url(doc.included.unwrap_or_default(), &asset_id)?;

    let attributes = data
        .attributes
        .ok_or_else(|| IngestionError::missing("data.attributes"))?;

    let game_mode = attributes
        .game_mode
        .ok_or_else(|| IngestionError::missing("data.attributes.gameMode"))?;
    let map_name = attributes
        .map_name
        .ok_or_else(|| IngestionError::missing("data.attributes.mapName"))?;
    let created_at = attributes
        .created_at
        .ok_or_else(|| IngestionError::missing("data.attributes.createdAt"))?;
    let duration_seconds = attributes
        .duration
        .ok_or_else(|| IngestionError::missing("data.attributes.duration"))?;

    let start_time = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| {
            IngestionError::Parse(format!(
                "data.attributes.createdAt is not RFC 3339 ({}): {}",
                created_at, e
            ))
        })?
        .with_timezone(&Utc);

    Ok(MatchMetadata {
        match_id: match_id.to_string(),
        game_mode,
        map_name,
        start_time,
        duration_seconds,
        telemetry_url,
    })
}

fn telemetry_url(included: Vec<IncludedResource>, asset_id: &str) -> Result<String, IngestionError> {
    let asset = included
        .into_iter()
        .find(|r| r.id.as_deref() == Some(asset_id))
        .ok_or_else(|| IngestionError::missing(format!("included[id={}]", asset_id)))?;

    asset
        .attributes
        .as_ref()
        .and_then(|attrs| attrs.get("URL"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| IngestionError::missing(format!("included[id={}].attributes.URL", asset_id)))
}
