// SPDX-License-Identifier: MPL-2.0
//! Concurrent batch evaluation.
//!
//! Images are evaluated on tokio's blocking pool, at most `workers` at a
//! time. Cancellation stops new submissions only: evaluations already handed
//! to a worker run to completion and are reported.

use super::orchestrator::{EvaluationOrchestrator, ImageJob};
use crate::domain::evaluation::EvaluationResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Cancellation token type for batch runs.
pub type CancellationToken = Arc<AtomicBool>;

/// Checks if the cancellation token has been triggered.
#[inline]
pub fn is_cancelled(token: &CancellationToken) -> bool {
    token.load(Ordering::SeqCst)
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One result per dispatched image, in submission order.
    pub results: Vec<EvaluationResult>,
    /// Identifiers of images never dispatched because the run was cancelled.
    pub skipped: Vec<String>,
}

/// Evaluates many images through one shared orchestrator.
#[derive(Debug, Clone)]
pub struct BatchEvaluator {
    orchestrator: Arc<EvaluationOrchestrator>,
    workers: usize,
    cancel: CancellationToken,
}

impl BatchEvaluator {
    /// Creates an evaluator running at most `workers` images at once
    /// (at least one).
    #[must_use]
    pub fn new(orchestrator: Arc<EvaluationOrchestrator>, workers: usize) -> Self {
        Self {
            orchestrator,
            workers: workers.max(1),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Uses an externally owned cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Returns a handle that cancels the run when set to `true`.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        Arc::clone(&self.cancel)
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Evaluates `jobs` and returns their results in submission order.
    ///
    /// Path jobs are read and decoded on the worker, after a slot frees up,
    /// so at most `workers` decoded images are held at once and images
    /// skipped by cancellation are never read. A task that panics outside
    /// the backend call yields a `BackendFailed` result for its image; the
    /// other images are unaffected.
    pub async fn run(&self, jobs: Vec<ImageJob>) -> BatchReport {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut pending: Vec<(String, JoinHandle<EvaluationResult>)> =
            Vec::with_capacity(jobs.len());
        let mut skipped = Vec::new();
        let total = jobs.len();

        let mut jobs = jobs.into_iter();
        while let Some(job) = jobs.next() {
            let permit = if is_cancelled(&self.cancel) {
                None
            } else {
                Arc::clone(&semaphore).acquire_owned().await.ok()
            };

            // A worker may have been waited on; re-check before dispatching.
            let Some(permit) = permit.filter(|_| !is_cancelled(&self.cancel)) else {
                skipped.push(job.id);
                skipped.extend(jobs.by_ref().map(|job| job.id));
                break;
            };

            let orchestrator = Arc::clone(&self.orchestrator);
            let id = job.id.clone();
            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                orchestrator.evaluate_job(&job)
            });
            pending.push((id, handle));
        }

        if !skipped.is_empty() {
            tracing::info!(
                dispatched = pending.len(),
                skipped = skipped.len(),
                "batch cancelled, waiting for dispatched images"
            );
        }

        let mut results = Vec::with_capacity(pending.len());
        for (id, handle) in pending {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(image = %id, "evaluation task failed: {e}");
                    EvaluationResult::backend_failed(
                        id,
                        None,
                        format!("evaluation task failed: {e}"),
                    )
                }
            };
            results.push(result);
        }

        tracing::info!(total, evaluated = results.len(), "batch finished");
        BatchReport { results, skipped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::port::{BackendError, PredictionBackend};
    use crate::domain::evaluation::{DistanceEvaluator, EvaluationStatus, PredictionCandidate};
    use crate::domain::geo::Confidence;
    use crate::domain::media::FeatureInput;
    use crate::domain::metadata::MetadataBlock;
    use crate::media::{ImagePreprocessor, PreprocessConfig};
    use crate::test_utils::{coord, gps_exif_block, solid_image};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Red images are unreachable, blue images panic, anything else predicts
    /// London. The green channel picks a sleep in milliseconds.
    struct ColorScriptedBackend {
        calls: AtomicUsize,
        cancel_after_first: Option<CancellationToken>,
    }

    impl ColorScriptedBackend {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                cancel_after_first: None,
            }
        }
    }

    impl PredictionBackend for ColorScriptedBackend {
        fn predict(&self, input: &FeatureInput) -> Result<Vec<PredictionCandidate>, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(token) = &self.cancel_after_first {
                token.store(true, Ordering::SeqCst);
            }

            let [r, g, b] = input.mean_rgb();
            std::thread::sleep(Duration::from_millis((g * 40.0) as u64));
            if r > 0.9 {
                return Err(BackendError::unavailable(self.name(), "connection refused"));
            }
            if b > 0.9 {
                panic!("backend bug");
            }
            Ok(vec![PredictionCandidate::new(
                coord(51.5074, -0.1278),
                Confidence::new(0.8).unwrap(),
            )])
        }

        fn name(&self) -> &'static str {
            "color-scripted"
        }
    }

    fn evaluator(backend: Arc<ColorScriptedBackend>, workers: usize) -> BatchEvaluator {
        let preprocessor = ImagePreprocessor::new(PreprocessConfig {
            width: 2,
            height: 2,
            ..PreprocessConfig::default()
        })
        .unwrap();
        let orchestrator = EvaluationOrchestrator::new(
            preprocessor,
            backend,
            DistanceEvaluator::default(),
        );
        BatchEvaluator::new(Arc::new(orchestrator), workers)
    }

    fn job(id: &str, rgb: [u8; 3]) -> ImageJob {
        ImageJob::new(id, solid_image(2, 2, rgb), gps_exif_block(51.5074, -0.1278))
    }

    fn ids(report: &BatchReport) -> Vec<&str> {
        report.results.iter().map(EvaluationResult::image_id).collect()
    }

    #[test]
    fn worker_count_is_at_least_one() {
        let backend = Arc::new(ColorScriptedBackend::new());
        assert_eq!(evaluator(backend, 0).workers(), 1);
    }

    #[tokio::test]
    async fn results_keep_submission_order() {
        let backend = Arc::new(ColorScriptedBackend::new());
        let batch = evaluator(Arc::clone(&backend), 4);
        // Earlier images sleep longer, so they finish last.
        let jobs = vec![
            job("slow", [0, 250, 0]),
            job("medium", [0, 120, 0]),
            job("fast", [0, 0, 0]),
        ];

        let report = batch.run(jobs).await;
        assert_eq!(ids(&report), ["slow", "medium", "fast"]);
        assert!(report.skipped.is_empty());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn one_unavailable_backend_call_is_isolated() {
        let backend = Arc::new(ColorScriptedBackend::new());
        let report = evaluator(backend, 2)
            .run(vec![job("a", [255, 0, 0]), job("b", [10, 10, 10])])
            .await;

        assert_eq!(report.results[0].status(), EvaluationStatus::BackendFailed);
        assert!(report.results[0].ground_truth().is_some());
        assert_eq!(report.results[1].status(), EvaluationStatus::Complete);
    }

    #[tokio::test]
    async fn panicking_backend_becomes_backend_failed_with_ground_truth() {
        let backend = Arc::new(ColorScriptedBackend::new());
        let report = evaluator(backend, 2)
            .run(vec![job("boom", [0, 0, 255]), job("fine", [10, 10, 10])])
            .await;

        assert_eq!(ids(&report), ["boom", "fine"]);
        assert_eq!(report.results[0].status(), EvaluationStatus::BackendFailed);
        assert!(report.results[0].ground_truth().is_some());
        assert!(report.results[0]
            .failure()
            .unwrap()
            .contains("backend panicked: backend bug"));
        assert_eq!(report.results[1].status(), EvaluationStatus::Complete);
    }

    #[tokio::test]
    async fn cancelled_before_start_dispatches_nothing() {
        let backend = Arc::new(ColorScriptedBackend::new());
        let batch = evaluator(Arc::clone(&backend), 2);
        batch.cancellation_token().store(true, Ordering::SeqCst);

        let report = batch
            .run(vec![job("a", [0, 0, 0]), job("b", [0, 0, 0])])
            .await;

        assert!(report.results.is_empty());
        assert_eq!(report.skipped, ["a", "b"]);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancellation_lets_dispatched_images_finish() {
        let token: CancellationToken = Arc::new(AtomicBool::new(false));
        let backend = Arc::new(ColorScriptedBackend {
            calls: AtomicUsize::new(0),
            cancel_after_first: Some(Arc::clone(&token)),
        });
        let batch = evaluator(Arc::clone(&backend), 1).with_cancellation(token);

        let report = batch
            .run(vec![
                job("first", [0, 100, 0]),
                job("second", [0, 0, 0]),
                job("third", [0, 0, 0]),
            ])
            .await;

        assert_eq!(ids(&report), ["first"]);
        assert_eq!(report.results[0].status(), EvaluationStatus::Complete);
        assert_eq!(report.skipped, ["second", "third"]);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn jobs_without_pixels_or_metadata_still_report() {
        let backend = Arc::new(ColorScriptedBackend::new());
        let report = evaluator(backend, 3)
            .run(vec![ImageJob::new(
                "unreadable",
                crate::domain::media::DecodedImage::empty(),
                MetadataBlock::Absent,
            )])
            .await;

        assert_eq!(
            report.results[0].status(),
            EvaluationStatus::PreprocessingFailed
        );
    }

    #[tokio::test]
    async fn path_jobs_skipped_by_cancellation_are_never_read() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = ["one.png", "two.png", "three.png"]
            .iter()
            .map(|name| dir.path().join(name))
            .collect();
        let jobs: Vec<_> = paths.iter().map(ImageJob::from_path).collect();
        // Files appear only after the jobs exist; only the first is written.
        image_rs::RgbImage::from_pixel(4, 4, image_rs::Rgb([0, 50, 0]))
            .save(&paths[0])
            .unwrap();

        let token: CancellationToken = Arc::new(AtomicBool::new(false));
        let backend = Arc::new(ColorScriptedBackend {
            calls: AtomicUsize::new(0),
            cancel_after_first: Some(Arc::clone(&token)),
        });
        let report = evaluator(Arc::clone(&backend), 1)
            .with_cancellation(token)
            .run(jobs)
            .await;

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].status(), EvaluationStatus::Incomplete);
        assert_eq!(
            report.skipped,
            [paths[1].display().to_string(), paths[2].display().to_string()]
        );
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }
}
