//! Circular areas of interest.

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// Error returned when constructing an invalid area.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid radius {radius_km} km: must be finite and non-negative")]
pub struct InvalidArea {
    radius_km: f64,
}

/// A circular region bounding the stations a query may consider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawArea", into = "RawArea")]
pub struct CircularArea {
    center: Coordinate,
    radius_km: f64,
}

impl CircularArea {
    /// Create an area; the radius must be finite and non-negative.
    pub fn new(center: Coordinate, radius_km: f64) -> Result<Self, InvalidArea> {
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(InvalidArea { radius_km });
        }
        Ok(Self { center, radius_km })
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Whether `point` lies within the area (boundary inclusive).
    pub fn contains(&self, point: &Coordinate) -> bool {
        self.center.distance_to(point) <= self.radius_km * 1000.0
    }
}

#[derive(Serialize, Deserialize)]
struct RawArea {
    center: Coordinate,
    radius_km: f64,
}

impl TryFrom<RawArea> for CircularArea {
    type Error = InvalidArea;

    fn try_from(raw: RawArea) -> Result<Self, Self::Error> {
        CircularArea::new(raw.center, raw.radius_km)
    }
}

impl From<CircularArea> for RawArea {
    fn from(area: CircularArea) -> Self {
        RawArea {
            center: area.center,
            radius_km: area.radius_km,
        }
    }
}
