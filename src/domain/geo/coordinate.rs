// SPDX-License-Identifier: MPL-2.0
//! Validated geographic coordinate.

use crate::domain::error::CoordinateRangeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Latitude bounds in decimal degrees.
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Longitude bounds in decimal degrees.
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// A point on Earth in decimal degrees (WGS84).
///
/// A `Coordinate` always satisfies `-90 <= latitude <= 90` and
/// `-180 <= longitude <= 180`, and both components are finite. Construction
/// of anything else fails with [`CoordinateRangeError`].
///
/// No `Default` impl: `(0, 0)` is a real place in the Gulf of Guinea, not
/// "unknown".
///
/// # Example
///
/// ```
/// use geolens::domain::geo::Coordinate;
///
/// let paris = Coordinate::new(48.8566, 2.3522).unwrap();
/// assert_eq!(paris.format(), "48.856600° N, 2.352200° E");
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate", into = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate, rejecting values outside the valid ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateRangeError`] if either component is non-finite or
    /// out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateRangeError> {
        let lat_ok = latitude.is_finite()
            && (LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&latitude);
        let lon_ok = longitude.is_finite()
            && (LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&longitude);

        if lat_ok && lon_ok {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(CoordinateRangeError {
                latitude,
                longitude,
            })
        }
    }

    /// Returns the latitude in decimal degrees.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Returns the longitude in decimal degrees.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Formats the coordinate with hemisphere letters.
    ///
    /// Format: "48.856600° N, 2.352200° E"
    #[must_use]
    pub fn format(&self) -> String {
        let lat_dir = if self.latitude >= 0.0 { "N" } else { "S" };
        let lon_dir = if self.longitude >= 0.0 { "E" } else { "W" };
        format!(
            "{:.6}° {}, {:.6}° {}",
            self.latitude.abs(),
            lat_dir,
            self.longitude.abs(),
            lon_dir
        )
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

impl TryFrom<(f64, f64)> for Coordinate {
    type Error = CoordinateRangeError;

    fn try_from((latitude, longitude): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(latitude, longitude)
    }
}

/// Unvalidated wire form; deserialization goes through [`Coordinate::new`].
#[derive(Serialize, Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateRangeError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(coordinate: Coordinate) -> Self {
        Self {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_values_inside_range_and_keeps_them_exact() {
        for (lat, lon) in [
            (0.0, 0.0),
            (90.0, 180.0),
            (-90.0, -180.0),
            (48.8566, 2.3522),
            (-33.8688, 151.2093),
            (89.999_999, -179.999_999),
        ] {
            let c = Coordinate::new(lat, lon).expect("in range");
            assert_eq!(c.latitude().to_bits(), lat.to_bits());
            assert_eq!(c.longitude().to_bits(), lon.to_bits());
        }
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        for lat in [90.000_001, -90.000_001, 100.0, -1000.0] {
            let err = Coordinate::new(lat, 0.0).unwrap_err();
            assert_eq!(err.latitude.to_bits(), lat.to_bits());
        }
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        for lon in [180.000_001, -180.000_001, 360.0] {
            assert!(Coordinate::new(0.0, lon).is_err());
        }
    }

    #[test]
    fn rejects_non_finite_components() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::NAN).is_err());
        assert!(Coordinate::new(f64::INFINITY, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn format_uses_hemisphere_letters() {
        let sydney = Coordinate::new(-33.8688, 151.2093).unwrap();
        assert_eq!(sydney.format(), "33.868800° S, 151.209300° E");

        let nyc = Coordinate::new(40.7128, -74.0060).unwrap();
        assert_eq!(nyc.format(), "40.712800° N, 74.006000° W");
    }

    #[test]
    fn deserialization_validates_range() {
        let ok: Coordinate =
            serde_json::from_str(r#"{"latitude": 10.5, "longitude": -20.25}"#).unwrap();
        assert_eq!(ok, Coordinate::new(10.5, -20.25).unwrap());

        let bad = serde_json::from_str::<Coordinate>(r#"{"latitude": 95.0, "longitude": 0.0}"#);
        assert!(bad.is_err());
    }
}
