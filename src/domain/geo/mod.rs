// SPDX-License-Identifier: MPL-2.0
//! Geographic value objects and great-circle math.
//!
//! - [`Coordinate`]: validated latitude/longitude pair in decimal degrees
//! - [`Confidence`]: backend-reported certainty in `[0, 1]`
//! - [`haversine_distance`]: great-circle distance in meters

mod confidence;
mod coordinate;
mod distance;

pub use confidence::Confidence;
pub use coordinate::Coordinate;
pub use distance::{haversine_distance, EARTH_MEAN_RADIUS_M};
