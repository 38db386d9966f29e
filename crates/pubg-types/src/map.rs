//! Map enumeration for PUBG matches.
//!
//! The API reports maps by their internal asset name (e.g. `"Erangel_Main"`),
//! not the name shown in game. Known maps have dedicated variants, anything
//! else is carried through as [`GameMap::Other`].
//!
//! # Example
//!
//! ```rust
//! use pubg_types::GameMap;
//!
//! let map = GameMap::from_name("Savage_Main");
//! assert_eq!(map, GameMap::Sanhok);
//! assert_eq!(map.extent_km(), Some(4.0));
//!
//! let unknown = GameMap::from_name("Brand_New_Main");
//! assert_eq!(unknown, GameMap::Other("Brand_New_Main".to_string()));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A PUBG battle royale map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum GameMap {
    /// `Erangel_Main`
    Erangel,
    /// `Baltic_Main` (remastered Erangel)
    ErangelRemastered,
    /// `Desert_Main`
    Miramar,
    /// `Savage_Main`
    Sanhok,
    /// `DihorOtok_Main`
    Vikendi,
    /// `Summerland_Main`
    Karakin,
    /// `Chimera_Main`
    Paramo,
    /// `Heaven_Main`
    Haven,
    /// `Tiger_Main`
    Taego,
    /// `Kiki_Main`
    Deston,

    /// Map not yet known to this crate. Holds the raw API name.
    Other(String),
}

impl GameMap {
    /// Create a map from its API asset name.
    ///
    /// Matching is exact: the API is consistent about casing and the
    /// [`GameMap::Other`] fallback must round-trip the original name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Erangel_Main" => GameMap::Erangel,
            "Baltic_Main" => GameMap::ErangelRemastered,
            "Desert_Main" => GameMap::Miramar,
            "Savage_Main" => GameMap::Sanhok,
            "DihorOtok_Main" => GameMap::Vikendi,
            "Summerland_Main" => GameMap::Karakin,
            "Chimera_Main" => GameMap::Paramo,
            "Heaven_Main" => GameMap::Haven,
            "Tiger_Main" => GameMap::Taego,
            "Kiki_Main" => GameMap::Deston,
            _ => GameMap::Other(name.to_string()),
        }
    }

    /// The API asset name for this map.
    pub fn name(&self) -> &str {
        match self {
            GameMap::Erangel => "Erangel_Main",
            GameMap::ErangelRemastered => "Baltic_Main",
            GameMap::Miramar => "Desert_Main",
            GameMap::Sanhok => "Savage_Main",
            GameMap::Vikendi => "DihorOtok_Main",
            GameMap::Karakin => "Summerland_Main",
            GameMap::Paramo => "Chimera_Main",
            GameMap::Haven => "Heaven_Main",
            GameMap::Taego => "Tiger_Main",
            GameMap::Deston => "Kiki_Main",
            GameMap::Other(name) => name,
        }
    }

    /// Human-readable map name as shown in game.
    pub fn display_name(&self) -> &str {
        match self {
            GameMap::Erangel | GameMap::ErangelRemastered => "Erangel",
            GameMap::Miramar => "Miramar",
            GameMap::Sanhok => "Sanhok",
            GameMap::Vikendi => "Vikendi",
            GameMap::Karakin => "Karakin",
            GameMap::Paramo => "Paramo",
            GameMap::Haven => "Haven",
            GameMap::Taego => "Taego",
            GameMap::Deston => "Deston",
            GameMap::Other(name) => name,
        }
    }

    /// Side length of the (square) playable area in kilometers.
    ///
    /// Returns `None` for maps this crate doesn't know. Plot axes are
    /// usually sized from this value.
    pub fn extent_km(&self) -> Option<f64> {
        match self {
            GameMap::Erangel
            | GameMap::ErangelRemastered
            | GameMap::Miramar
            | GameMap::Taego
            | GameMap::Deston => Some(8.0),
            GameMap::Vikendi => Some(6.0),
            GameMap::Sanhok => Some(4.0),
            GameMap::Paramo => Some(3.0),
            GameMap::Karakin => Some(2.0),
            GameMap::Haven => Some(1.0),
            GameMap::Other(_) => None,
        }
    }

    /// Check if this is a known map (not `Other`).
    pub fn is_known(&self) -> bool {
        !matches!(self, GameMap::Other(_))
    }
}

impl fmt::Display for GameMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<&str> for GameMap {
    fn from(s: &str) -> Self {
        GameMap::from_name(s)
    }
}

impl From<String> for GameMap {
    fn from(s: String) -> Self {
        GameMap::from_name(&s)
    }
}

impl From<GameMap> for String {
    fn from(map: GameMap) -> Self {
        map.name().to_string()
    }
}
