// SPDX-License-Identifier: MPL-2.0
//! Accuracy classes and the distance evaluator.

use crate::domain::error::ThresholdError;
use crate::domain::geo::{haversine_distance, Coordinate};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// AccuracyClass
// =============================================================================

/// How close a prediction landed, from finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyClass {
    Street,
    City,
    Region,
    Country,
    /// Farther than every configured threshold.
    Continent,
}

impl AccuracyClass {
    /// Classes that take a threshold, finest first.
    pub const BOUNDED: [AccuracyClass; 4] = [
        AccuracyClass::Street,
        AccuracyClass::City,
        AccuracyClass::Region,
        AccuracyClass::Country,
    ];

    /// Returns the configuration key for this class.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AccuracyClass::Street => "street",
            AccuracyClass::City => "city",
            AccuracyClass::Region => "region",
            AccuracyClass::Country => "country",
            AccuracyClass::Continent => "continent",
        }
    }
}

impl fmt::Display for AccuracyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// AccuracyThresholds
// =============================================================================

/// Default threshold radii in meters.
pub mod default_thresholds {
    /// Street-level radius.
    pub const STREET_M: f64 = 1_000.0;
    /// City-level radius.
    pub const CITY_M: f64 = 25_000.0;
    /// Region-level radius.
    pub const REGION_M: f64 = 200_000.0;
    /// Country-level radius.
    pub const COUNTRY_M: f64 = 750_000.0;
}

/// Threshold table in meters.
///
/// A distance is assigned the smallest-radius class whose threshold is
/// greater than or equal to it. Classes missing from the table are never
/// assigned; a distance above every threshold is [`AccuracyClass::Continent`].
///
/// In TOML the table has the recognized keys `street`, `city`, `region` and
/// `country`:
///
/// ```toml
/// [thresholds]
/// city = 25000
/// street = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ThresholdTable", into = "ThresholdTable")]
pub struct AccuracyThresholds {
    /// Sorted by ascending radius, then by class.
    buckets: Vec<(AccuracyClass, f64)>,
}

impl AccuracyThresholds {
    /// Builds a table from `(class, meters)` pairs.
    ///
    /// [`AccuracyClass::Continent`] entries are ignored; later duplicates
    /// replace earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`ThresholdError`] if a threshold is negative or non-finite.
    pub fn new(
        entries: impl IntoIterator<Item = (AccuracyClass, f64)>,
    ) -> Result<Self, ThresholdError> {
        let mut buckets: Vec<(AccuracyClass, f64)> = Vec::new();
        for (class, meters) in entries {
            if class == AccuracyClass::Continent {
                continue;
            }
            if !meters.is_finite() || meters < 0.0 {
                return Err(ThresholdError {
                    class: class.as_str(),
                    meters,
                });
            }
            buckets.retain(|(existing, _)| *existing != class);
            buckets.push((class, meters));
        }
        buckets.sort_by(|(ca, ma), (cb, mb)| ma.total_cmp(mb).then(ca.cmp(cb)));
        Ok(Self { buckets })
    }

    /// Returns the threshold for `class`, if configured.
    #[must_use]
    pub fn get(&self, class: AccuracyClass) -> Option<f64> {
        self.buckets
            .iter()
            .find(|(c, _)| *c == class)
            .map(|(_, meters)| *meters)
    }

    /// Classifies a distance in meters.
    #[must_use]
    pub fn classify(&self, meters: f64) -> AccuracyClass {
        self.buckets
            .iter()
            .find(|(_, threshold)| meters <= *threshold)
            .map_or(AccuracyClass::Continent, |(class, _)| *class)
    }
}

impl Default for AccuracyThresholds {
    fn default() -> Self {
        Self {
            buckets: vec![
                (AccuracyClass::Street, default_thresholds::STREET_M),
                (AccuracyClass::City, default_thresholds::CITY_M),
                (AccuracyClass::Region, default_thresholds::REGION_M),
                (AccuracyClass::Country, default_thresholds::COUNTRY_M),
            ],
        }
    }
}

/// Serialized form of [`AccuracyThresholds`].
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ThresholdTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    street: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    city: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    region: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    country: Option<f64>,
}

impl TryFrom<ThresholdTable> for AccuracyThresholds {
    type Error = ThresholdError;

    fn try_from(table: ThresholdTable) -> Result<Self, Self::Error> {
        let entries = [
            (AccuracyClass::Street, table.street),
            (AccuracyClass::City, table.city),
            (AccuracyClass::Region, table.region),
            (AccuracyClass::Country, table.country),
        ];
        Self::new(
            entries
                .into_iter()
                .filter_map(|(class, meters)| meters.map(|m| (class, m))),
        )
    }
}

impl From<AccuracyThresholds> for ThresholdTable {
    fn from(thresholds: AccuracyThresholds) -> Self {
        Self {
            street: thresholds.get(AccuracyClass::Street),
            city: thresholds.get(AccuracyClass::City),
            region: thresholds.get(AccuracyClass::Region),
            country: thresholds.get(AccuracyClass::Country),
        }
    }
}

// =============================================================================
// DistanceEvaluator
// =============================================================================

/// Scores a predicted coordinate against a reference coordinate.
///
/// Distance math is fixed (haversine on a 6,371,008.8 m sphere); the
/// classification policy comes from the injected [`AccuracyThresholds`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceEvaluator {
    thresholds: AccuracyThresholds,
}

impl DistanceEvaluator {
    /// Creates an evaluator with the given threshold table.
    #[must_use]
    pub fn new(thresholds: AccuracyThresholds) -> Self {
        Self { thresholds }
    }

    /// Great-circle distance in meters.
    #[must_use]
    pub fn distance(&self, a: Coordinate, b: Coordinate) -> f64 {
        haversine_distance(a, b)
    }

    /// Maps a distance to its accuracy class.
    #[must_use]
    pub fn classify(&self, meters: f64) -> AccuracyClass {
        self.thresholds.classify(meters)
    }

    /// Distance and class in one step.
    #[must_use]
    pub fn score(&self, predicted: Coordinate, reference: Coordinate) -> (f64, AccuracyClass) {
        let meters = self.distance(predicted, reference);
        (meters, self.classify(meters))
    }
}
