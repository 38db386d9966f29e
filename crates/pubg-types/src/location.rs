//! Map coordinates.
//!
//! Telemetry reports every position in centimeters from the map's top-left
//! corner. Nothing in this workspace converts units while parsing; use
//! [`Location::to_km`] or [`LandingPoint::to_km`] at display time.

use serde::{Deserialize, Serialize};

/// Centimeters in a kilometer.
pub const CM_PER_KM: f64 = 100_000.0;

/// A 3D position on the map, in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    /// Altitude. Older telemetry omits it for some events.
    #[serde(default)]
    pub z: f64,
}

impl Location {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Drop the altitude.
    pub fn to_point(&self) -> LandingPoint {
        LandingPoint {
            x: self.x,
            y: self.y,
        }
    }

    /// Ground coordinates converted to kilometers.
    pub fn to_km(&self) -> (f64, f64) {
        (self.x / CM_PER_KM, self.y / CM_PER_KM)
    }
}

/// A ground position (x, y) in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LandingPoint {
    pub x: f64,
    pub y: f64,
}

impl LandingPoint {
    pub fn to_km(&self) -> (f64, f64) {
        (self.x / CM_PER_KM, self.y / CM_PER_KM)
    }
}

/// Where the transport aircraft dropped its first and last passenger.
///
/// Both ends are `None` when the log has no aircraft exits at all, which
/// happens for incomplete player data and is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FlightPath {
    pub first: Option<Location>,
    pub last: Option<Location>,
}

impl FlightPath {
    /// True when at least one exit was observed.
    pub fn is_known(&self) -> bool {
        self.first.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_km() {
        let loc = Location::new(400_000.0, 250_000.0, 1_500.0);
        assert_eq!(loc.to_km(), (4.0, 2.5));
        assert_eq!(loc.to_point().to_km(), (4.0, 2.5));
    }

    #[test]
    fn test_missing_altitude_defaults_to_zero() {
        let loc: Location = serde_json::from_str(r#"{"x": 1.5, "y": 2.5}"#).unwrap();
        assert_eq!(loc, Location::new(1.5, 2.5, 0.0));
    }

    #[test]
    fn test_flight_path_default_is_unknown() {
        assert!(!FlightPath::default().is_known());
    }
}
