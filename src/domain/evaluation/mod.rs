// SPDX-License-Identifier: MPL-2.0
//! Evaluation domain types.
//!
//! - [`PredictionCandidate`]: one ranked guess from a backend
//! - [`AccuracyClass`] / [`AccuracyThresholds`] / [`DistanceEvaluator`]: scoring
//! - [`EvaluationResult`] / [`EvaluationStatus`]: the per-image outcome

mod accuracy;
mod candidate;
mod result;

pub use accuracy::{default_thresholds, AccuracyClass, AccuracyThresholds, DistanceEvaluator};
pub use candidate::{rank_candidates, top_candidate, PredictionCandidate};
pub use result::{EvaluationResult, EvaluationStatus};
