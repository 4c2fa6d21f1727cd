// SPDX-License-Identifier: MPL-2.0
//! Ranked prediction candidates.

use crate::domain::geo::{Confidence, Coordinate};
use serde::Serialize;
use std::cmp::Ordering;

/// A candidate location with the backend's confidence in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionCandidate {
    /// Predicted location.
    pub coordinate: Coordinate,
    /// Backend-specific certainty.
    pub confidence: Confidence,
    /// Optional human-readable name of the predicted area (e.g. a region or cell).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl PredictionCandidate {
    /// Creates an unlabeled candidate.
    #[must_use]
    pub fn new(coordinate: Coordinate, confidence: Confidence) -> Self {
        Self {
            coordinate,
            confidence,
            label: None,
        }
    }

    /// Attaches a label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

fn by_confidence_desc(a: &PredictionCandidate, b: &PredictionCandidate) -> Ordering {
    b.confidence
        .value()
        .partial_cmp(&a.confidence.value())
        .unwrap_or(Ordering::Equal)
}

/// Sorts candidates by descending confidence. Equal scores keep their order.
pub fn rank_candidates(candidates: &mut [PredictionCandidate]) {
    candidates.sort_by(by_confidence_desc);
}

/// Returns the most confident candidate; the earliest wins a tie.
#[must_use]
pub fn top_candidate(candidates: Vec<PredictionCandidate>) -> Option<PredictionCandidate> {
    candidates
        .into_iter()
        .reduce(|best, next| if by_confidence_desc(&next, &best).is_lt() { next } else { best })
}
