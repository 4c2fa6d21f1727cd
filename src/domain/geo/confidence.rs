// SPDX-License-Identifier: MPL-2.0
//! Backend confidence score.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A backend's certainty in a single candidate, in `[0, 1]`.
///
/// Scores are not calibrated across backends: comparing the confidence of
/// two different backends' candidates is meaningless.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Creates a confidence score, returning `None` outside `[0, 1]` or for NaN.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        (0.0..=1.0).contains(&value).then_some(Self(value))
    }

    /// Returns the raw score.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
