// SPDX-License-Identifier: MPL-2.0
//! Single-image evaluation.
//!
//! [`EvaluationOrchestrator`] is the only component that knows about the
//! preprocessor, the metadata extractor, the prediction backend and the
//! distance evaluator. Every path through [`EvaluationOrchestrator::evaluate`]
//! ends in an [`EvaluationResult`]; per-image failures become a status.

use crate::application::port::PredictionBackend;
use crate::domain::evaluation::{top_candidate, DistanceEvaluator, EvaluationResult};
use crate::domain::media::DecodedImage;
use crate::domain::metadata::MetadataBlock;
use crate::media::{is_supported_image, load_image_file, ExifLocationExtractor, ImagePreprocessor};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

/// One image queued for evaluation.
#[derive(Debug, Clone)]
pub struct ImageJob {
    /// Caller-chosen identifier, usually the file path.
    pub id: String,
    source: JobSource,
}

#[derive(Debug, Clone)]
enum JobSource {
    Decoded {
        image: DecodedImage,
        metadata: MetadataBlock,
    },
    /// Read and decoded only when the job is evaluated.
    File(PathBuf),
}

impl ImageJob {
    /// A job over an image that is already decoded.
    pub fn new(id: impl Into<String>, image: DecodedImage, metadata: MetadataBlock) -> Self {
        Self {
            id: id.into(),
            source: JobSource::Decoded { image, metadata },
        }
    }

    /// A job over an image file, identified by its path.
    ///
    /// The file is not touched until the job is evaluated. An unreadable
    /// file evaluates to a `PreprocessingFailed` result.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: path.display().to_string(),
            source: JobSource::File(path),
        }
    }
}

/// Runs the evaluation pipeline for single images.
///
/// Holds no per-image state, so one instance can be shared across threads.
pub struct EvaluationOrchestrator {
    preprocessor: ImagePreprocessor,
    extractor: ExifLocationExtractor,
    backend: Arc<dyn PredictionBackend>,
    evaluator: DistanceEvaluator,
}

impl fmt::Debug for EvaluationOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationOrchestrator")
            .field("preprocessor", &self.preprocessor)
            .field("backend", &self.backend.name())
            .field("evaluator", &self.evaluator)
            .finish_non_exhaustive()
    }
}

impl EvaluationOrchestrator {
    #[must_use]
    pub fn new(
        preprocessor: ImagePreprocessor,
        backend: Arc<dyn PredictionBackend>,
        evaluator: DistanceEvaluator,
    ) -> Self {
        Self {
            preprocessor,
            extractor: ExifLocationExtractor::new(),
            backend,
            evaluator,
        }
    }

    /// Returns the backend predictions come from.
    #[must_use]
    pub fn backend(&self) -> &dyn PredictionBackend {
        self.backend.as_ref()
    }

    /// Evaluates one image.
    ///
    /// Ground truth is extracted from `metadata` regardless of whether the
    /// pixels preprocess. A backend failure keeps that ground truth. The
    /// backend is never retried here.
    pub fn evaluate(
        &self,
        image_id: impl Into<String>,
        image: &DecodedImage,
        metadata: &MetadataBlock,
    ) -> EvaluationResult {
        let image_id = image_id.into();
        let prepared = self.preprocessor.prepare(image);
        let ground_truth = self.extractor.extract(metadata);

        if ground_truth.is_none() {
            tracing::debug!(image = %image_id, "no usable GPS metadata");
        }

        let input = match prepared {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!(image = %image_id, "preprocessing failed: {e}");
                return EvaluationResult::preprocessing_failed(
                    image_id,
                    ground_truth,
                    e.to_string(),
                );
            }
        };

        let predicted = panic::catch_unwind(AssertUnwindSafe(|| self.backend.predict(&input)));
        let candidates = match predicted {
            Ok(Ok(candidates)) => candidates,
            Ok(Err(e)) => {
                tracing::warn!(image = %image_id, backend = self.backend.name(), "{e}");
                return EvaluationResult::backend_failed(image_id, ground_truth, e.to_string());
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                tracing::warn!(
                    image = %image_id,
                    backend = self.backend.name(),
                    "backend panicked: {reason}"
                );
                return EvaluationResult::backend_failed(
                    image_id,
                    ground_truth,
                    format!("backend panicked: {reason}"),
                );
            }
        };

        tracing::debug!(
            image = %image_id,
            candidates = candidates.len(),
            "backend returned candidates"
        );
        let prediction = top_candidate(candidates);
        EvaluationResult::scored(image_id, prediction, ground_truth, &self.evaluator)
    }

    /// Evaluates a job, reading its file first if it has one.
    pub fn evaluate_job(&self, job: &ImageJob) -> EvaluationResult {
        match &job.source {
            JobSource::Decoded { image, metadata } => {
                self.evaluate(job.id.as_str(), image, metadata)
            }
            JobSource::File(path) => {
                if !is_supported_image(path) {
                    tracing::debug!(image = %job.id, "unrecognized extension, decoding anyway");
                }
                match load_image_file(path) {
                    Ok(loaded) => self.evaluate(job.id.as_str(), &loaded.image, &loaded.metadata),
                    Err(e) => {
                        tracing::warn!(image = %job.id, "{e}");
                        EvaluationResult::preprocessing_failed(job.id.clone(), None, e.to_string())
                    }
                }
            }
        }
    }

    /// Evaluates jobs one after another, in order.
    pub fn evaluate_batch<'a, I>(&self, jobs: I) -> Vec<EvaluationResult>
    where
        I: IntoIterator<Item = &'a ImageJob>,
    {
        jobs.into_iter().map(|job| self.evaluate_job(job)).collect()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::port::BackendError;
    use crate::domain::evaluation::{AccuracyClass, EvaluationStatus, PredictionCandidate};
    use crate::domain::geo::Confidence;
    use crate::domain::media::FeatureInput;
    use crate::media::PreprocessConfig;
    use crate::test_utils::{assert_relative_eq, coord, gps_exif_block, solid_image};

    /// Returns fixed candidates, fails when the image is mostly red and
    /// panics when it is mostly blue.
    struct ScriptedBackend {
        candidates: Vec<PredictionCandidate>,
    }

    impl PredictionBackend for ScriptedBackend {
        fn predict(&self, input: &FeatureInput) -> Result<Vec<PredictionCandidate>, BackendError> {
            if input.mean_rgb()[0] > 0.9 {
                return Err(BackendError::unavailable(self.name(), "endpoint unreachable"));
            }
            if input.mean_rgb()[2] > 0.9 {
                panic!("tensor shape mismatch");
            }
            Ok(self.candidates.clone())
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn candidate(lat: f64, lon: f64, confidence: f64) -> PredictionCandidate {
        PredictionCandidate::new(coord(lat, lon), Confidence::new(confidence).unwrap())
    }

    fn orchestrator(candidates: Vec<PredictionCandidate>) -> EvaluationOrchestrator {
        let preprocessor = ImagePreprocessor::new(PreprocessConfig {
            width: 4,
            height: 4,
            ..PreprocessConfig::default()
        })
        .unwrap();
        EvaluationOrchestrator::new(
            preprocessor,
            Arc::new(ScriptedBackend { candidates }),
            DistanceEvaluator::default(),
        )
    }

    const GRAY: [u8; 3] = [90, 90, 90];
    const RED: [u8; 3] = [255, 0, 0];
    const BLUE: [u8; 3] = [0, 0, 255];

    #[test]
    fn complete_when_prediction_and_ground_truth_exist() {
        let o = orchestrator(vec![candidate(48.8606, 2.3376, 0.7)]);
        let result = o.evaluate(
            "paris.jpg",
            &solid_image(8, 8, GRAY),
            &gps_exif_block(48.8566, 2.3522),
        );

        assert_eq!(result.status(), EvaluationStatus::Complete);
        assert_eq!(result.image_id(), "paris.jpg");
        assert_relative_eq!(result.distance_m().unwrap(), 1_160.0, max_relative = 0.02);
        assert_eq!(result.accuracy(), Some(AccuracyClass::City));
    }

    #[test]
    fn top_candidate_is_the_most_confident() {
        let o = orchestrator(vec![
            candidate(35.6762, 139.6503, 0.2),
            candidate(48.8566, 2.3522, 0.6),
        ]);
        let result = o.evaluate("x", &solid_image(4, 4, GRAY), &MetadataBlock::Absent);
        let top = result.prediction().unwrap();
        assert_eq!(top.coordinate, coord(48.8566, 2.3522));
    }

    #[test]
    fn missing_metadata_is_incomplete() {
        let o = orchestrator(vec![candidate(10.0, 10.0, 0.5)]);
        let result = o.evaluate("no-gps", &solid_image(4, 4, GRAY), &MetadataBlock::Absent);

        assert_eq!(result.status(), EvaluationStatus::Incomplete);
        assert!(result.prediction().is_some());
        assert!(result.ground_truth().is_none());
        assert!(result.distance_m().is_none());
        assert!(result.accuracy().is_none());
    }

    #[test]
    fn empty_candidates_never_become_a_placeholder() {
        let o = orchestrator(Vec::new());
        let result = o.evaluate(
            "blank",
            &solid_image(4, 4, GRAY),
            &gps_exif_block(0.5, 0.5),
        );

        assert_eq!(result.status(), EvaluationStatus::Incomplete);
        assert!(result.prediction().is_none());
        assert!(result.ground_truth().is_some());
        assert!(result.distance_m().is_none());
    }

    #[test]
    fn preprocessing_failure_still_extracts_ground_truth() {
        let o = orchestrator(vec![candidate(10.0, 10.0, 0.5)]);
        let broken = DecodedImage::new(4, 4, 2, vec![0; 32]);
        let result = o.evaluate("broken", &broken, &gps_exif_block(-40.0, -74.0));

        assert_eq!(result.status(), EvaluationStatus::PreprocessingFailed);
        assert!(result.prediction().is_none());
        let truth = result.ground_truth().unwrap();
        assert_eq!(truth.coordinate(), coord(-40.0, -74.0));
        assert!(result.failure().unwrap().contains("channel"));
    }

    #[test]
    fn backend_failure_keeps_ground_truth() {
        let o = orchestrator(vec![candidate(10.0, 10.0, 0.5)]);
        let result = o.evaluate("red", &solid_image(4, 4, RED), &gps_exif_block(51.5, -0.12));

        assert_eq!(result.status(), EvaluationStatus::BackendFailed);
        assert!(result.prediction().is_none());
        assert!(result.ground_truth().is_some());
        assert!(result.failure().unwrap().contains("endpoint unreachable"));
    }

    #[test]
    fn batch_failure_of_one_image_does_not_affect_the_next() {
        let o = orchestrator(vec![candidate(51.5, -0.12, 0.9)]);
        let jobs = [
            ImageJob::new("a", solid_image(4, 4, RED), gps_exif_block(51.5, -0.12)),
            ImageJob::new("b", solid_image(4, 4, GRAY), gps_exif_block(51.5, -0.12)),
            ImageJob::new("c", DecodedImage::empty(), MetadataBlock::Absent),
        ];

        let results = o.evaluate_batch(&jobs);
        let statuses: Vec<_> = results.iter().map(EvaluationResult::status).collect();
        assert_eq!(
            statuses,
            [
                EvaluationStatus::BackendFailed,
                EvaluationStatus::Complete,
                EvaluationStatus::PreprocessingFailed,
            ]
        );
        assert_eq!(results[1].accuracy(), Some(AccuracyClass::Street));
    }

    #[test]
    fn backend_panic_keeps_ground_truth() {
        let o = orchestrator(vec![candidate(10.0, 10.0, 0.5)]);
        let result = o.evaluate("blue", &solid_image(4, 4, BLUE), &gps_exif_block(64.1, -21.9));

        assert_eq!(result.status(), EvaluationStatus::BackendFailed);
        assert_eq!(result.ground_truth().unwrap().coordinate(), coord(64.1, -21.9));
        assert!(result.failure().unwrap().contains("tensor shape mismatch"));
    }

    #[test]
    fn oversized_geometry_fails_preprocessing_and_the_next_still_runs() {
        let o = orchestrator(vec![candidate(51.5, -0.12, 0.9)]);
        let jobs = [
            ImageJob::new(
                "huge",
                DecodedImage::new(u32::MAX, u32::MAX, 4, vec![1; 4]),
                gps_exif_block(51.5, -0.12),
            ),
            ImageJob::new("good", solid_image(4, 4, GRAY), gps_exif_block(51.5, -0.12)),
        ];

        let results = o.evaluate_batch(&jobs);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].status(), EvaluationStatus::PreprocessingFailed);
        assert!(results[0].ground_truth().is_some());
        assert_eq!(results[1].status(), EvaluationStatus::Complete);
    }

    #[test]
    fn path_job_reads_the_file_when_evaluated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("later.png");
        let job = ImageJob::from_path(&path);
        assert_eq!(job.id, path.display().to_string());

        image_rs::RgbImage::from_pixel(8, 8, image_rs::Rgb(GRAY))
            .save(&path)
            .unwrap();

        let o = orchestrator(vec![candidate(10.0, 10.0, 0.5)]);
        let result = o.evaluate_job(&job);
        assert_eq!(result.status(), EvaluationStatus::Incomplete);
        assert!(result.prediction().is_some());
    }

    #[test]
    fn unreadable_path_job_fails_preprocessing() {
        let dir = tempfile::tempdir().unwrap();
        let o = orchestrator(vec![candidate(10.0, 10.0, 0.5)]);
        let result = o.evaluate_job(&ImageJob::from_path(dir.path().join("gone.jpg")));

        assert_eq!(result.status(), EvaluationStatus::PreprocessingFailed);
        assert!(result.ground_truth().is_none());
        assert!(result.failure().is_some());
    }
}
