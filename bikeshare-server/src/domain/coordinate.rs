//! Geographic coordinates and great-circle distance.

use std::fmt;

use geo::{HaversineDistance, Point};
use serde::{Deserialize, Serialize};

/// Error returned when constructing an out-of-range coordinate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate ({latitude}, {longitude}): {reason}")]
pub struct InvalidCoordinate {
    latitude: f64,
    longitude: f64,
    reason: &'static str,
}

/// A WGS84 latitude/longitude pair in decimal degrees.
///
/// Latitude is always within `[-90, 90]` and longitude within `[-180, 180]`.
///
/// # Examples
///
/// ```
/// use bikeshare_server::domain::Coordinate;
///
/// let montreal = Coordinate::new(45.5017, -73.5673).unwrap();
/// assert_eq!(montreal.latitude(), 45.5017);
///
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// assert!(Coordinate::new(0.0, f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate", into = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        let invalid = |reason| InvalidCoordinate {
            latitude,
            longitude,
            reason,
        };

        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(invalid("must be finite"));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(invalid("latitude must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid("longitude must be within [-180, 180]"));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in metres (haversine).
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        self.to_point().haversine_distance(&other.to_point())
    }

    /// As a `geo` point; x is longitude.
    fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    /// Spherical mean of a set of points.
    ///
    /// Each point is projected onto the unit sphere, the vectors are
    /// averaged, and the mean is projected back. Returns `None` for an
    /// empty slice or when the points cancel out (e.g. antipodes).
    pub fn centroid(points: &[Coordinate]) -> Option<Coordinate> {
        match points {
            [] => return None,
            [single] => return Some(*single),
            _ => {}
        }

        let (mut x, mut y, mut z) = (0.0, 0.0, 0.0);
        for point in points {
            let lat = point.latitude.to_radians();
            let lon = point.longitude.to_radians();
            x += lat.cos() * lon.cos();
            y += lat.cos() * lon.sin();
            z += lat.sin();
        }

        let n = points.len() as f64;
        let (x, y, z) = (x / n, y / n, z / n);
        let hyp = (x * x + y * y).sqrt();
        if hyp < 1e-12 && z.abs() < 1e-12 {
            return None;
        }

        let longitude = y.atan2(x).to_degrees();
        let latitude = z.atan2(hyp).to_degrees();
        Coordinate::new(latitude, longitude).ok()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

#[derive(Serialize, Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = InvalidCoordinate;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(c: Coordinate) -> Self {
        RawCoordinate {
            latitude: c.latitude,
            longitude: c.longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(90.1, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn distance_to_self_is_zero() {
        let c = coord(45.5, -73.57);
        assert_eq!(c.distance_to(&c), 0.0);
    }

    #[test]
    fn one_degree_of_latitude() {
        // One degree along a meridian is ~111.2 km
        let d = coord(0.0, 0.0).distance_to(&coord(1.0, 0.0));
        assert!((d - 111_195.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn known_city_distance() {
        // Montreal to Toronto is roughly 504 km
        let montreal = coord(45.5017, -73.5673);
        let toronto = coord(43.6532, -79.3832);
        let d = montreal.distance_to(&toronto) / 1000.0;
        assert!((500.0..510.0).contains(&d), "got {d} km");
    }

    #[test]
    fn centroid_of_nothing() {
        assert!(Coordinate::centroid(&[]).is_none());
    }

    #[test]
    fn centroid_of_one_point() {
        let c = coord(45.5, -73.5);
        assert_eq!(Coordinate::centroid(&[c]), Some(c));
    }

    #[test]
    fn centroid_of_bounding_box() {
        let corners = [
            coord(45.0, -74.0),
            coord(45.0, -73.0),
            coord(46.0, -73.0),
            coord(46.0, -74.0),
        ];
        let centre = Coordinate::centroid(&corners).unwrap();
        assert!((centre.latitude() - 45.5).abs() < 0.01);
        assert!((centre.longitude() + 73.5).abs() < 0.01);
    }

    #[test]
    fn centroid_of_antipodes_is_undefined() {
        let points = [coord(0.0, 0.0), coord(0.0, 180.0)];
        assert!(Coordinate::centroid(&points).is_none());
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<Coordinate, _> =
            serde_json::from_str(r#"{"latitude": 45.0, "longitude": -73.0}"#);
        assert!(ok.is_ok());

        let bad: Result<Coordinate, _> =
            serde_json::from_str(r#"{"latitude": 145.0, "longitude": -73.0}"#);
        assert!(bad.is_err());
    }
}
