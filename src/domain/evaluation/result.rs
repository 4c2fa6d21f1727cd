// SPDX-License-Identifier: MPL-2.0
//! Per-image evaluation outcome.

use super::{AccuracyClass, DistanceEvaluator, PredictionCandidate};
use crate::domain::metadata::GroundTruth;
use serde::Serialize;
use std::fmt;

/// Terminal state of one image's evaluation.
///
/// Serializes to the same tag [`EvaluationStatus::as_str`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EvaluationStatus {
    /// Prediction and ground truth both present; distance and class are set.
    Complete,
    /// Evaluation ran but a prediction or a ground truth is missing.
    Incomplete,
    /// The decoded image was rejected before prediction.
    PreprocessingFailed,
    /// The prediction backend could not serve the request.
    BackendFailed,
}

impl EvaluationStatus {
    /// Returns the status tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EvaluationStatus::Complete => "Complete",
            EvaluationStatus::Incomplete => "Incomplete",
            EvaluationStatus::PreprocessingFailed => "PreprocessingFailed",
            EvaluationStatus::BackendFailed => "BackendFailed",
        }
    }

    /// Returns `true` for the two failure states.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            EvaluationStatus::PreprocessingFailed | EvaluationStatus::BackendFailed
        )
    }
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of evaluating one image. Immutable once built.
///
/// `distance_m` and `accuracy` are set exactly when both `prediction` and
/// `ground_truth` are present, which is exactly when the status is
/// [`EvaluationStatus::Complete`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    image_id: String,
    status: EvaluationStatus,
    prediction: Option<PredictionCandidate>,
    ground_truth: Option<GroundTruth>,
    distance_m: Option<f64>,
    accuracy: Option<AccuracyClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<String>,
}

impl EvaluationResult {
    pub(crate) fn preprocessing_failed(
        image_id: String,
        ground_truth: Option<GroundTruth>,
        failure: String,
    ) -> Self {
        Self::failed(image_id, EvaluationStatus::PreprocessingFailed, ground_truth, failure)
    }

    pub(crate) fn backend_failed(
        image_id: String,
        ground_truth: Option<GroundTruth>,
        failure: String,
    ) -> Self {
        Self::failed(image_id, EvaluationStatus::BackendFailed, ground_truth, failure)
    }

    fn failed(
        image_id: String,
        status: EvaluationStatus,
        ground_truth: Option<GroundTruth>,
        failure: String,
    ) -> Self {
        Self {
            image_id,
            status,
            prediction: None,
            ground_truth,
            distance_m: None,
            accuracy: None,
            failure: Some(failure),
        }
    }

    /// Builds the result of an evaluation whose backend call succeeded.
    pub(crate) fn scored(
        image_id: String,
        prediction: Option<PredictionCandidate>,
        ground_truth: Option<GroundTruth>,
        evaluator: &DistanceEvaluator,
    ) -> Self {
        let score = match (&prediction, &ground_truth) {
            (Some(p), Some(t)) => Some(evaluator.score(p.coordinate, t.coordinate())),
            _ => None,
        };
        let status = if score.is_some() {
            EvaluationStatus::Complete
        } else {
            EvaluationStatus::Incomplete
        };
        Self {
            image_id,
            status,
            prediction,
            ground_truth,
            distance_m: score.map(|(meters, _)| meters),
            accuracy: score.map(|(_, class)| class),
            failure: None,
        }
    }

    /// Returns the caller-supplied image identifier.
    #[must_use]
    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    /// Returns the terminal status.
    #[must_use]
    pub fn status(&self) -> EvaluationStatus {
        self.status
    }

    /// Returns the top prediction, if the backend produced one.
    #[must_use]
    pub fn prediction(&self) -> Option<&PredictionCandidate> {
        self.prediction.as_ref()
    }

    /// Returns the metadata ground truth, if any.
    #[must_use]
    pub fn ground_truth(&self) -> Option<&GroundTruth> {
        self.ground_truth.as_ref()
    }

    /// Returns the prediction error in meters.
    #[must_use]
    pub fn distance_m(&self) -> Option<f64> {
        self.distance_m
    }

    /// Returns the accuracy class of the prediction.
    #[must_use]
    pub fn accuracy(&self) -> Option<AccuracyClass> {
        self.accuracy
    }

    /// Returns the failure message for failed evaluations.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geo::{Confidence, Coordinate};

    fn prediction() -> PredictionCandidate {
        PredictionCandidate::new(
            Coordinate::new(48.8566, 2.3522).unwrap(),
            Confidence::new(0.9).unwrap(),
        )
    }

    fn truth() -> GroundTruth {
        GroundTruth::new(Coordinate::new(48.8606, 2.3376).unwrap(), None)
    }

    #[test]
    fn scored_with_both_sides_is_complete() {
        let result = EvaluationResult::scored(
            "a.jpg".into(),
            Some(prediction()),
            Some(truth()),
            &DistanceEvaluator::default(),
        );
        assert_eq!(result.status(), EvaluationStatus::Complete);
        assert!(result.distance_m().is_some());
        // About 1.16 km apart.
        assert_eq!(result.accuracy(), Some(AccuracyClass::City));
        assert!(result.failure().is_none());
    }

    #[test]
    fn scored_without_ground_truth_is_incomplete() {
        let result =
            EvaluationResult::scored("a.jpg".into(), Some(prediction()), None, &DistanceEvaluator::default());
        assert_eq!(result.status(), EvaluationStatus::Incomplete);
        assert!(result.distance_m().is_none());
        assert!(result.accuracy().is_none());
    }

    #[test]
    fn scored_without_prediction_is_incomplete() {
        let result =
            EvaluationResult::scored("a.jpg".into(), None, Some(truth()), &DistanceEvaluator::default());
        assert_eq!(result.status(), EvaluationStatus::Incomplete);
        assert!(result.prediction().is_none());
        assert!(result.ground_truth().is_some());
    }

    #[test]
    fn failures_keep_ground_truth_and_message() {
        let result = EvaluationResult::backend_failed("b.jpg".into(), Some(truth()), "down".into());
        assert_eq!(result.status(), EvaluationStatus::BackendFailed);
        assert!(result.status().is_failure());
        assert!(result.ground_truth().is_some());
        assert_eq!(result.failure(), Some("down"));
        assert!(result.distance_m().is_none());
    }

    #[test]
    fn json_status_matches_display_tag() {
        let result = EvaluationResult::preprocessing_failed("c.png".into(), None, "empty".into());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "PreprocessingFailed");
        assert_eq!(json["status"], result.status().as_str());
        assert_eq!(json["image_id"], "c.png");
        assert!(json["prediction"].is_null());
    }

    #[test]
    fn every_status_serializes_as_its_tag() {
        for status in [
            EvaluationStatus::Complete,
            EvaluationStatus::Incomplete,
            EvaluationStatus::PreprocessingFailed,
            EvaluationStatus::BackendFailed,
        ] {
            assert_eq!(serde_json::to_value(status).unwrap(), status.as_str());
        }
    }
}
