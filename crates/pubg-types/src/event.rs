//! Typed telemetry events.
//!
//! A telemetry log is a JSON array of records discriminated by their `_T`
//! field. Only the kinds the analysis needs get a dedicated variant; every
//! other record becomes [`TelemetryEvent::Other`] so the log order (and the
//! record count) survives parsing.

use crate::Location;
use serde::{Deserialize, Serialize};

/// Vehicle id of the plane everyone jumps from.
pub const TRANSPORT_AIRCRAFT_ID: &str = "DummyTransportAircraft_C";

/// `_T` discriminator values with a dedicated variant.
pub mod kind {
    pub const MATCH_START: &str = "LogMatchStart";
    pub const MATCH_END: &str = "LogMatchEnd";
    pub const PARACHUTE_LANDING: &str = "LogParachuteLanding";
    pub const VEHICLE_LEAVE: &str = "LogVehicleLeave";
}

/// Final placement of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRanking {
    pub name: String,
    pub ranking: u32,
}

/// One entry of a telemetry log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// `LogMatchStart`. Every player spawns at the same point, so the first
    /// listed character's location stands for all of them.
    MatchStart {
        map_name: Option<String>,
        start_location: Option<Location>,
    },

    /// `LogMatchEnd`, rankings in the order the log lists characters.
    MatchEnd { rankings: Vec<PlayerRanking> },

    /// `LogParachuteLanding`.
    ParachuteLanding {
        player_name: String,
        location: Location,
    },

    /// `LogVehicleLeave`.
    VehicleLeave {
        vehicle_id: String,
        player_name: String,
        location: Location,
    },

    /// Any other record, or a known kind missing fields its variant needs.
    /// `kind` is `None` when the record had no `_T` at all.
    Other { kind: Option<String> },
}

impl TelemetryEvent {
    /// The `_T` discriminator this event was parsed from.
    pub fn kind(&self) -> Option<&str> {
        match self {
            TelemetryEvent::MatchStart { .. } => Some(kind::MATCH_START),
            TelemetryEvent::MatchEnd { .. } => Some(kind::MATCH_END),
            TelemetryEvent::ParachuteLanding { .. } => Some(kind::PARACHUTE_LANDING),
            TelemetryEvent::VehicleLeave { .. } => Some(kind::VEHICLE_LEAVE),
            TelemetryEvent::Other { kind } => kind.as_deref(),
        }
    }

    /// True for a player leaving the transport aircraft.
    pub fn is_aircraft_exit(&self) -> bool {
        matches!(
            self,
            TelemetryEvent::VehicleLeave { vehicle_id, .. } if vehicle_id == TRANSPORT_AIRCRAFT_ID
        )
    }
}
