//! Raw telemetry records as they appear in the log.
//!
//! These mirror the JSON closely and are converted into
//! [`TelemetryEvent`] by [`RawRecord::into_event`]. Only the fields the
//! typed events need are declared; serde ignores the rest.

use pubg_types::{kind, Location, PlayerRanking, TelemetryEvent};
use serde::Deserialize;
use serde_json::Value;

/// A character block. Every field is optional here; each event decides
/// which ones it requires.
#[derive(Debug, Deserialize)]
pub(crate) struct RawCharacter {
    name: Option<String>,
    ranking: Option<u32>,
    location: Option<Location>,
}

/// `characters[]` entries come in two shapes depending on the game
/// version: the character object itself, or `{ "character": {...} }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawCharacterEntry {
    Wrapped { character: RawCharacter },
    Bare(RawCharacter),
}

impl RawCharacterEntry {
    fn into_character(self) -> RawCharacter {
        match self {
            RawCharacterEntry::Wrapped { character } => character,
            RawCharacterEntry::Bare(character) => character,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMatchStart {
    map_name: Option<String>,
    #[serde(default)]
    characters: Vec<RawCharacterEntry>,
}

#[derive(Debug, Deserialize)]
struct RawMatchEnd {
    characters: Vec<RawCharacterEntry>,
}

#[derive(Debug, Deserialize)]
struct RawParachuteLanding {
    character: RawCharacter,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVehicle {
    vehicle_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawVehicleLeave {
    character: RawCharacter,
    vehicle: RawVehicle,
}

/// One record of the log, still as JSON.
#[derive(Debug)]
pub(crate) struct RawRecord {
    kind: Option<String>,
    body: Value,
}

impl RawRecord {
    pub(crate) fn new(body: Value) -> Self {
        let kind = body.get("_T").and_then(Value::as_str).map(str::to_string);
        Self { kind, body }
    }

    /// The `_T` discriminator, if the record has a string one.
    pub(crate) fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Convert to a typed event. A known kind that lacks a field its
    /// variant requires becomes [`TelemetryEvent::Other`].
    pub(crate) fn into_event(self) -> TelemetryEvent {
        let RawRecord { kind: tag, body } = self;

        let event = match tag.as_deref() {
            Some(kind::MATCH_START) => serde_json::from_value(body).ok().map(match_start),
            Some(kind::MATCH_END) => serde_json::from_value(body).ok().map(match_end),
            Some(kind::PARACHUTE_LANDING) => {
                serde_json::from_value(body).ok().and_then(parachute_landing)
            }
            Some(kind::VEHICLE_LEAVE) => serde_json::from_value(body).ok().and_then(vehicle_leave),
            _ => None,
        };

        event.unwrap_or_else(|| {
            if let Some(name) = tag.as_deref().filter(|t| is_typed_kind(t)) {
                tracing::debug!("{} record is missing required fields, keeping as Other", name);
            }
            TelemetryEvent::Other { kind: tag }
        })
    }
}

fn is_typed_kind(tag: &str) -> bool {
    matches!(
        tag,
        kind::MATCH_START | kind::MATCH_END | kind::PARACHUTE_LANDING | kind::VEHICLE_LEAVE
    )
}

fn match_start(raw: RawMatchStart) -> TelemetryEvent {
    // Everyone spawns on the same spot; the first character is enough.
    let start_location = raw
        .characters
        .into_iter()
        .next()
        .and_then(|entry| entry.into_character().location);

    TelemetryEvent::MatchStart {
        map_name: raw.map_name,
        start_location,
    }
}

fn match_end(raw: RawMatchEnd) -> TelemetryEvent {
    let rankings = raw
        .characters
        .into_iter()
        .filter_map(|entry| {
            let character = entry.into_character();
            match (character.name, character.ranking) {
                (Some(name), Some(ranking)) => Some(PlayerRanking { name, ranking }),
                (name, _) => {
                    tracing::debug!("Skipping unranked character {:?} in LogMatchEnd", name);
                    None
                }
            }
        })
        .collect();

    TelemetryEvent::MatchEnd { rankings }
}

fn parachute_landing(raw: RawParachuteLanding) -> Option<TelemetryEvent> {
    Some(TelemetryEvent::ParachuteLanding {
        player_name: raw.character.name?,
        location: raw.character.location?,
    })
}

fn vehicle_leave(raw: RawVehicleLeave) -> Option<TelemetryEvent> {
    Some(TelemetryEvent::VehicleLeave {
        vehicle_id: raw.vehicle.vehicle_id?,
        player_name: raw.character.name?,
        location: raw.character.location?,
    })
}
