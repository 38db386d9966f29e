//! Parsed telemetry log and the scans run over it.
//!
//! This module provides [`Telemetry`], an ordered list of
//! [`TelemetryEvent`]s. Each extraction is a read-only pass over the events,
//! so they can be called in any order and any number of times.
//!
//! # Example
//!
//! ```rust
//! use pubg_types::{PlayerRanking, Telemetry, TelemetryEvent};
//!
//! let telemetry = Telemetry::new(vec![
//!     TelemetryEvent::MatchStart {
//!         map_name: Some("Erangel_Main".to_string()),
//!         start_location: None,
//!     },
//!     TelemetryEvent::MatchEnd {
//!         rankings: vec![PlayerRanking { name: "alice".to_string(), ranking: 1 }],
//!     },
//! ]);
//!
//! assert_eq!(telemetry.map_name(), Some("Erangel_Main"));
//! assert_eq!(telemetry.rankings().len(), 1);
//! ```

use crate::{FlightPath, LandingPoint, Location, PlayerRanking, TelemetryEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One ranked player joined with where they landed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDrop {
    pub name: String,
    pub ranking: u32,
    /// `None` when the player never parachuted (e.g. disconnected on the plane).
    pub landing: Option<LandingPoint>,
}

/// Everything a drop-location plot needs for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropSummary {
    pub map_name: Option<String>,
    pub flight_path: FlightPath,
    /// In ranking-list order.
    pub players: Vec<PlayerDrop>,
}

/// A parsed telemetry log, in log order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Telemetry {
    events: Vec<TelemetryEvent>,
}

impl Telemetry {
    pub fn new(events: Vec<TelemetryEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[TelemetryEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<TelemetryEvent> {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Spawn location from the first `LogMatchStart`.
    pub fn match_start_location(&self) -> Option<Location> {
        self.events.iter().find_map(|event| match event {
            TelemetryEvent::MatchStart { start_location, .. } => Some(*start_location),
            _ => None,
        })?
    }

    /// `mapName` of the first `LogMatchStart`.
    pub fn map_name(&self) -> Option<&str> {
        self.events.iter().find_map(|event| match event {
            TelemetryEvent::MatchStart { map_name, .. } => Some(map_name.as_deref()),
            _ => None,
        })?
    }

    /// Rankings from every `LogMatchEnd`, in log order.
    ///
    /// A log normally holds exactly one match end, but none or several are
    /// handled by simple concatenation.
    pub fn rankings(&self) -> Vec<PlayerRanking> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TelemetryEvent::MatchEnd { rankings } => Some(rankings.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Landing point of every player, keyed by name.
    ///
    /// When a name lands more than once, the last landing in the log wins.
    pub fn landings(&self) -> HashMap<String, LandingPoint> {
        let mut landings = HashMap::new();
        for event in &self.events {
            if let TelemetryEvent::ParachuteLanding {
                player_name,
                location,
            } = event
            {
                landings.insert(player_name.clone(), location.to_point());
            }
        }
        landings
    }

    /// First and last exits from the transport aircraft.
    pub fn flight_path(&self) -> FlightPath {
        let mut exits = self.events.iter().filter_map(|event| match event {
            TelemetryEvent::VehicleLeave { location, .. } if event.is_aircraft_exit() => {
                Some(*location)
            }
            _ => None,
        });

        let first = exits.next();
        let last = exits.last().or(first);
        FlightPath { first, last }
    }

    /// Rankings joined with landings and the flight path.
    pub fn drop_summary(&self) -> DropSummary {
        let landings = self.landings();
        let players = self
            .rankings()
            .into_iter()
            .map(|r| PlayerDrop {
                landing: landings.get(&r.name).copied(),
                name: r.name,
                ranking: r.ranking,
            })
            .collect();

        DropSummary {
            map_name: self.map_name().map(str::to_string),
            flight_path: self.flight_path(),
            players,
        }
    }

    /// Number of events per `_T` kind. Records without a kind are counted
    /// under `"<none>"`.
    pub fn kind_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for event in &self.events {
            let kind = event.kind().unwrap_or("<none>").to_string();
            *counts.entry(kind).or_insert(0) += 1;
        }
        counts
    }
}

impl From<Vec<TelemetryEvent>> for Telemetry {
    fn from(events: Vec<TelemetryEvent>) -> Self {
        Self::new(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TRANSPORT_AIRCRAFT_ID;

    fn landing(name: &str, x: f64, y: f64) -> TelemetryEvent {
        TelemetryEvent::ParachuteLanding {
            player_name: name.to_string(),
            location: Location::new(x, y, 0.0),
        }
    }

    fn exit(vehicle: &str, name: &str, x: f64) -> TelemetryEvent {
        TelemetryEvent::VehicleLeave {
            vehicle_id: vehicle.to_string(),
            player_name: name.to_string(),
            location: Location::new(x, x, 15_000.0),
        }
    }

    fn start(map: &str, x: f64) -> TelemetryEvent {
        TelemetryEvent::MatchStart {
            map_name: Some(map.to_string()),
            start_location: Some(Location::new(x, x, 0.0)),
        }
    }

    #[test]
    fn test_empty_log() {
        let telemetry = Telemetry::default();
        assert_eq!(telemetry.map_name(), None);
        assert_eq!(telemetry.match_start_location(), None);
        assert!(telemetry.rankings().is_empty());
        assert!(telemetry.landings().is_empty());
        assert_eq!(telemetry.flight_path(), FlightPath::default());
    }

    #[test]
    fn test_first_match_start_wins() {
        let telemetry = Telemetry::new(vec![
            TelemetryEvent::Other { kind: None },
            start("Erangel_Main", 1.0),
            start("Desert_Main", 2.0),
        ]);
        assert_eq!(telemetry.map_name(), Some("Erangel_Main"));
        assert_eq!(
            telemetry.match_start_location(),
            Some(Location::new(1.0, 1.0, 0.0))
        );
    }

    #[test]
    fn test_match_start_without_map_name() {
        let telemetry = Telemetry::new(vec![
            TelemetryEvent::MatchStart {
                map_name: None,
                start_location: None,
            },
            start("Desert_Main", 2.0),
        ]);
        // Only the first LogMatchStart is consulted.
        assert_eq!(telemetry.map_name(), None);
        assert_eq!(telemetry.match_start_location(), None);
    }

    #[test]
    fn test_rankings_concatenate_all_match_ends() {
        let telemetry = Telemetry::new(vec![
            TelemetryEvent::MatchEnd {
                rankings: vec![PlayerRanking {
                    name: "a".to_string(),
                    ranking: 2,
                }],
            },
            TelemetryEvent::MatchEnd {
                rankings: vec![PlayerRanking {
                    name: "b".to_string(),
                    ranking: 1,
                }],
            },
        ]);
        let names: Vec<_> = telemetry.rankings().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_duplicate_landing_last_wins() {
        let telemetry = Telemetry::new(vec![
            landing("alice", 1.0, 2.0),
            landing("bob", 5.0, 5.0),
            landing("alice", 3.0, 4.0),
        ]);
        let landings = telemetry.landings();
        assert_eq!(landings.len(), 2);
        assert_eq!(landings["alice"], LandingPoint { x: 3.0, y: 4.0 });
    }

    #[test]
    fn test_flight_path_ignores_other_vehicles() {
        let telemetry = Telemetry::new(vec![
            exit("Uaz_A_01_C", "x", 9.0),
            exit(TRANSPORT_AIRCRAFT_ID, "a", 1.0),
            exit(TRANSPORT_AIRCRAFT_ID, "b", 2.0),
            exit(TRANSPORT_AIRCRAFT_ID, "c", 3.0),
            exit("Uaz_A_01_C", "y", 8.0),
        ]);
        let path = telemetry.flight_path();
        assert_eq!(path.first.map(|l| l.x), Some(1.0));
        assert_eq!(path.last.map(|l| l.x), Some(3.0));
    }

    #[test]
    fn test_flight_path_single_exit() {
        let telemetry = Telemetry::new(vec![exit(TRANSPORT_AIRCRAFT_ID, "a", 7.0)]);
        let path = telemetry.flight_path();
        assert_eq!(path.first, path.last);
        assert!(path.is_known());
    }

    #[test]
    fn test_flight_path_absent() {
        let telemetry = Telemetry::new(vec![exit("Uaz_A_01_C", "x", 9.0)]);
        let path = telemetry.flight_path();
        assert_eq!(path.first, None);
        assert_eq!(path.last, None);
    }

    #[test]
    fn test_drop_summary() {
        let telemetry = Telemetry::new(vec![
            start("Savage_Main", 0.0),
            exit(TRANSPORT_AIRCRAFT_ID, "a", 1.0),
            landing("a", 10.0, 20.0),
            TelemetryEvent::MatchEnd {
                rankings: vec![
                    PlayerRanking {
                        name: "a".to_string(),
                        ranking: 1,
                    },
                    PlayerRanking {
                        name: "ghost".to_string(),
                        ranking: 2,
                    },
                ],
            },
        ]);

        let summary = telemetry.drop_summary();
        assert_eq!(summary.map_name.as_deref(), Some("Savage_Main"));
        assert!(summary.flight_path.is_known());
        assert_eq!(summary.players.len(), 2);
        assert_eq!(
            summary.players[0].landing,
            Some(LandingPoint { x: 10.0, y: 20.0 })
        );
        assert_eq!(summary.players[1].landing, None);
    }

    #[test]
    fn test_kind_counts() {
        let telemetry = Telemetry::new(vec![
            landing("a", 0.0, 0.0),
            landing("b", 0.0, 0.0),
            TelemetryEvent::Other { kind: None },
        ]);
        let counts = telemetry.kind_counts();
        assert_eq!(counts["LogParachuteLanding"], 2);
        assert_eq!(counts["<none>"], 1);
    }

    #[test]
    fn test_serde_roundtrip() {
        let telemetry = Telemetry::new(vec![
            start("Baltic_Main", 5.0),
            exit(TRANSPORT_AIRCRAFT_ID, "a", 1.0),
            landing("a", 10.0, 20.0),
            TelemetryEvent::MatchEnd {
                rankings: vec![PlayerRanking {
                    name: "a".to_string(),
                    ranking: 1,
                }],
            },
            TelemetryEvent::Other {
                kind: Some("LogPlayerPosition".to_string()),
            },
            TelemetryEvent::Other { kind: None },
        ]);

        let json = serde_json::to_value(&telemetry).unwrap();
        assert_eq!(json["events"][0]["type"], "match_start");
        assert_eq!(json["events"][4]["type"], "other");
        assert_eq!(json["events"][4]["kind"], "LogPlayerPosition");

        let back: Telemetry = serde_json::from_value(json).unwrap();
        assert_eq!(back, telemetry);
    }
}
