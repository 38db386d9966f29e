//! pubg-types: Shared data structures for the PUBG match acquisition pipeline
//!
//! This crate defines the types passed between the workspace crates:
//! - [`SampleMatchesResult`] - Match ids returned by the discovery endpoint
//! - [`MatchMetadata`] - Per-match attributes and telemetry location
//! - [`TelemetryEvent`] - One typed record of a match's telemetry log
//! - [`Telemetry`] - An ordered log with the landing/ranking/flight scans
//! - [`GameMap`] - Known maps with `Other` variant for extensibility
//!
//! All coordinates are centimeters; see [`CM_PER_KM`].
//!
//! # Example
//!
//! ```rust
//! use pubg_types::{GameMap, Telemetry, TelemetryEvent};
//!
//! let telemetry = Telemetry::new(vec![TelemetryEvent::MatchStart {
//!     map_name: Some("Desert_Main".to_string()),
//!     start_location: None,
//! }]);
//!
//! let map = telemetry.map_name().map(GameMap::from_name);
//! assert_eq!(map, Some(GameMap::Miramar));
//! ```

mod event;
mod location;
mod map;
mod metadata;
mod telemetry;

pub use event::{kind, PlayerRanking, TelemetryEvent, TRANSPORT_AIRCRAFT_ID};
pub use location::{FlightPath, LandingPoint, Location, CM_PER_KM};
pub use map::GameMap;
pub use metadata::{MatchMetadata, SampleMatchesResult};
pub use telemetry::{DropSummary, PlayerDrop, Telemetry};
