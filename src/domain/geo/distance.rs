// SPDX-License-Identifier: MPL-2.0
//! Great-circle distance on a spherical Earth.

use super::Coordinate;

/// Mean Earth radius in meters (IUGG mean radius R1).
pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_008.8;

/// Returns the haversine great-circle distance between two points in meters.
///
/// The result is symmetric and exactly `0.0` for identical coordinates.
#[must_use]
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.longitude() - a.longitude()).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push h slightly above 1 for antipodal points.
    let central_angle = 2.0 * h.sqrt().min(1.0).asin();
    let meters = EARTH_MEAN_RADIUS_M * central_angle;

    debug_assert!(meters.is_finite(), "distance between validated coordinates");
    meters
}
