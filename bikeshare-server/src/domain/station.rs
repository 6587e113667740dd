//! Docking station identifiers and per-station rows.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// Identifier of a docking station, unique within one deployment.
///
/// Ordering is lexicographic on the raw id and is used to break ties
/// deterministically.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static attributes of a station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationInformation {
    pub station_id: StationId,
    pub name: String,
    pub location: Coordinate,
}

/// Live availability of a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationStatus {
    pub station_id: StationId,
    pub bikes_available: u32,
    pub docks_available: u32,
    pub is_renting: bool,
    pub is_returning: bool,
    pub is_installed: bool,
}

impl StationStatus {
    /// A station accepts both rentals and returns and is physically installed.
    pub fn is_operational(&self) -> bool {
        self.is_renting && self.is_returning && self.is_installed
    }
}
