// SPDX-License-Identifier: MPL-2.0
//! Reverse geocoding port definition.
//!
//! Turning a coordinate into a place name is not part of evaluation; this
//! module only fixes the contract an implementation must honor and how an
//! [`Address`] is rendered.

use crate::domain::geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors a reverse geocoder can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodingError {
    /// The lookup service could not be reached.
    Unavailable(String),
    /// The service rejected the request (e.g. HTTP 4xx).
    Rejected(String),
}

impl fmt::Display for GeocodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeocodingError::Unavailable(msg) => write!(f, "Geocoder unavailable: {msg}"),
            GeocodingError::Rejected(msg) => write!(f, "Geocoding request rejected: {msg}"),
        }
    }
}

impl std::error::Error for GeocodingError {}

/// Structured address returned by a reverse geocoder.
///
/// Field names follow the OpenStreetMap address schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub hamlet: Option<String>,
    pub state: Option<String>,
    pub province: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl Address {
    /// Renders "locality, area, country" from the most specific fields present.
    ///
    /// Returns `"Unknown location"` when nothing is set.
    #[must_use]
    pub fn display_name(&self) -> String {
        let locality = [&self.city, &self.town, &self.village, &self.hamlet]
            .into_iter()
            .find_map(Option::as_deref);
        let area = [&self.state, &self.province, &self.region]
            .into_iter()
            .find_map(Option::as_deref);

        let parts: Vec<&str> = [locality, area, self.country.as_deref()]
            .into_iter()
            .flatten()
            .collect();

        if parts.is_empty() {
            "Unknown location".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Port for coordinate-to-address lookups.
///
/// Implementations identify themselves to remote services, respect their
/// usage policies, and never invent an address: an unresolvable coordinate
/// yields an empty [`Address`].
pub trait ReverseGeocoder: Send + Sync {
    /// Looks up the address at `coordinate`.
    ///
    /// # Errors
    ///
    /// Returns a [`GeocodingError`] if the lookup cannot be performed.
    fn reverse(&self, coordinate: Coordinate) -> Result<Address, GeocodingError>;
}
