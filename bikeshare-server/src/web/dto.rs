//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{
    CircularArea, Coordinate, InvalidArea, InvalidCoordinate, SystemId,
};
use crate::engine::{Challenge, ChallengeRequest, ChallengeStop};

/// Area of interest given as query parameters.
#[derive(Debug, Deserialize)]
pub struct AreaQuery {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
}

impl AreaQuery {
    pub fn to_area(&self) -> Result<CircularArea, AreaQueryError> {
        let center = Coordinate::new(self.lat, self.lon)?;
        Ok(CircularArea::new(center, self.radius_km)?)
    }
}

/// Challenge query: an area plus optional from/to points.
///
/// Each point must be given as both `*_lat` and `*_lon` or not at all.
#[derive(Debug, Deserialize)]
pub struct ChallengeQuery {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
    pub from_lat: Option<f64>,
    pub from_lon: Option<f64>,
    pub to_lat: Option<f64>,
    pub to_lon: Option<f64>,
}

impl ChallengeQuery {
    pub fn to_request(&self) -> Result<ChallengeRequest, AreaQueryError> {
        let area = AreaQuery {
            lat: self.lat,
            lon: self.lon,
            radius_km: self.radius_km,
        }
        .to_area()?;

        let mut request = ChallengeRequest::anywhere_in(area);
        if let Some(from) = point("from", self.from_lat, self.from_lon)? {
            request = request.with_from(from);
        }
        if let Some(to) = point("to", self.to_lat, self.to_lon)? {
            request = request.with_to(to);
        }
        Ok(request)
    }
}

fn point(
    name: &'static str,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Result<Option<Coordinate>, AreaQueryError> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok(Some(Coordinate::new(lat, lon)?)),
        (None, None) => Ok(None),
        _ => Err(AreaQueryError::HalfPoint(name)),
    }
}

/// Rejected query parameters.
#[derive(Debug, thiserror::Error)]
pub enum AreaQueryError {
    #[error(transparent)]
    Coordinate(#[from] InvalidCoordinate),

    #[error(transparent)]
    Area(#[from] InvalidArea),

    #[error("{0}_lat and {0}_lon must be given together")]
    HalfPoint(&'static str),
}

/// Registered deployments.
#[derive(Debug, Serialize, Deserialize)]
pub struct SystemsResponse {
    pub systems: Vec<SystemId>,
}

/// One end of a challenge.
#[derive(Debug, Serialize, Deserialize)]
pub struct StationView {
    pub station_id: String,

    /// Name as published by the feed
    pub name: String,

    /// Name after display shortening
    pub short_name: String,

    pub lat: f64,
    pub lon: f64,
    pub bikes_available: u32,
    pub docks_available: u32,
}

impl From<ChallengeStop> for StationView {
    fn from(stop: ChallengeStop) -> Self {
        Self {
            station_id: stop.station.station_id.as_str().to_string(),
            lat: stop.station.location.latitude(),
            lon: stop.station.location.longitude(),
            name: stop.station.name,
            short_name: stop.display_name,
            bikes_available: stop.status.bikes_available,
            docks_available: stop.status.docks_available,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChallengeResponse {
    pub from: StationView,
    pub to: StationView,
}

impl From<Challenge> for ChallengeResponse {
    fn from(challenge: Challenge) -> Self {
        Self {
            from: challenge.from.into(),
            to: challenge.to.into(),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(from: (Option<f64>, Option<f64>)) -> ChallengeQuery {
        ChallengeQuery {
            lat: 45.5,
            lon: -73.57,
            radius_km: 2.0,
            from_lat: from.0,
            from_lon: from.1,
            to_lat: None,
            to_lon: None,
        }
    }

    #[test]
    fn builds_request_with_points() {
        let request = query((Some(45.51), Some(-73.56))).to_request().unwrap();
        assert_eq!(request.from, Some(Coordinate::new(45.51, -73.56).unwrap()));
        assert_eq!(request.to, None);
        assert_eq!(request.area.radius_km(), 2.0);
    }

    #[test]
    fn rejects_half_point() {
        let err = query((Some(45.51), None)).to_request().unwrap_err();
        assert_eq!(err.to_string(), "from_lat and from_lon must be given together");
    }

    #[test]
    fn rejects_bad_area() {
        let bad_lat = AreaQuery {
            lat: 91.0,
            lon: 0.0,
            radius_km: 1.0,
        };
        assert!(matches!(bad_lat.to_area(), Err(AreaQueryError::Coordinate(_))));

        let bad_radius = AreaQuery {
            lat: 0.0,
            lon: 0.0,
            radius_km: -1.0,
        };
        assert!(matches!(bad_radius.to_area(), Err(AreaQueryError::Area(_))));
    }
}
