// SPDX-License-Identifier: MPL-2.0
//! Geographic-cell classifier adapter implementing [`PredictionBackend`].
//!
//! The model takes the preprocessed image tensor and emits one logit per
//! cell of a [`CellTable`]. The session is loaded on first use, so a missing
//! model only fails the images evaluated with it.
//!
//! [`PredictionBackend`]: crate::application::port::PredictionBackend

use super::cells::CellTable;
use crate::application::port::{BackendError, PredictionBackend};
use crate::domain::evaluation::PredictionCandidate;
use crate::domain::geo::Confidence;
use crate::domain::media::FeatureInput;
use crate::infrastructure::scoring::{softmax, top_k_indices};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const BACKEND_NAME: &str = "onnx";

/// ONNX Runtime classifier over geographic cells.
///
/// # Thread Safety
///
/// This type is `Send + Sync` via internal locking; concurrent `predict`
/// calls run one inference at a time.
pub struct OnnxGeocellBackend {
    model_path: PathBuf,
    checksum: Option<String>,
    cells: CellTable,
    top_k: usize,
    min_confidence: f64,
    session: Mutex<Option<Session>>,
}

impl std::fmt::Debug for OnnxGeocellBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxGeocellBackend")
            .field("model_path", &self.model_path)
            .field("cells", &self.cells.len())
            .field("top_k", &self.top_k)
            .field("min_confidence", &self.min_confidence)
            .finish_non_exhaustive()
    }
}

impl OnnxGeocellBackend {
    /// Creates the backend. No file is touched until the first prediction.
    #[must_use]
    pub fn new(
        model_path: impl Into<PathBuf>,
        cells: CellTable,
        top_k: usize,
        min_confidence: f64,
    ) -> Self {
        Self {
            model_path: model_path.into(),
            checksum: None,
            cells,
            top_k: top_k.max(1),
            min_confidence,
            session: Mutex::new(None),
        }
    }

    /// Requires the model file to hash to `checksum` (BLAKE3, hex).
    #[must_use]
    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    /// Checks if the ONNX session is loaded and ready.
    #[must_use]
    pub fn is_session_ready(&self) -> bool {
        self.session.lock().is_ok_and(|s| s.is_some())
    }

    fn load_session(&self) -> Result<Session, BackendError> {
        if !self.model_path.exists() {
            return Err(BackendError::unavailable(
                BACKEND_NAME,
                format!("model not found at {}", self.model_path.display()),
            ));
        }

        if let Some(expected) = &self.checksum {
            verify_checksum(&self.model_path, expected)?;
        }

        let session = Session::builder()
            .map_err(unavailable)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(unavailable)?
            .commit_from_file(&self.model_path)
            .map_err(unavailable)?;

        tracing::info!(model = %self.model_path.display(), "loaded ONNX session");
        Ok(session)
    }

    /// Turns one logit per cell into ranked candidates.
    fn candidates_from_logits(
        &self,
        logits: &[f32],
    ) -> Result<Vec<PredictionCandidate>, BackendError> {
        if logits.len() != self.cells.len() {
            return Err(BackendError::InvalidResponse(format!(
                "model emitted {} logits for {} cells",
                logits.len(),
                self.cells.len()
            )));
        }

        let scores: Vec<f64> = logits.iter().map(|&l| f64::from(l)).collect();
        let probabilities = softmax(&scores, 1.0);

        let candidates = top_k_indices(&probabilities, self.top_k)
            .into_iter()
            .filter(|&i| probabilities[i] >= self.min_confidence)
            .filter_map(|i| {
                let cell = self.cells.get(i)?;
                let confidence = Confidence::new(probabilities[i])?;
                Some(PredictionCandidate::new(cell.center, confidence).with_label(&cell.label))
            })
            .collect();
        Ok(candidates)
    }
}

impl PredictionBackend for OnnxGeocellBackend {
    fn predict(&self, input: &FeatureInput) -> Result<Vec<PredictionCandidate>, BackendError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| BackendError::unavailable(BACKEND_NAME, "session lock poisoned"))?;

        if guard.is_none() {
            *guard = Some(self.load_session()?);
        }
        let session = guard
            .as_mut()
            .ok_or_else(|| BackendError::unavailable(BACKEND_NAME, "session not initialized"))?;

        // Ensure standard layout for ONNX Runtime
        let tensor = input.tensor().as_standard_layout().into_owned();

        let input_name = session
            .inputs()
            .first()
            .map_or_else(|| "input".to_string(), |i| i.name().to_string());

        let input_ref =
            ort::value::TensorRef::from_array_view(&tensor).map_err(invalid_response)?;

        let outputs = session
            .run(ort::inputs![input_name.as_str() => input_ref])
            .map_err(invalid_response)?;

        let (_, output) = outputs
            .iter()
            .next()
            .ok_or_else(|| BackendError::InvalidResponse("no output tensor".to_string()))?;

        let (_, logits) = output
            .try_extract_tensor::<f32>()
            .map_err(|e: ort::Error| invalid_response(e))?;

        self.candidates_from_logits(logits)
    }

    fn name(&self) -> &'static str {
        BACKEND_NAME
    }
}

fn unavailable<E: std::fmt::Display>(e: E) -> BackendError {
    BackendError::unavailable(BACKEND_NAME, format!("cannot load model: {e}"))
}

fn invalid_response<E: std::fmt::Display>(e: E) -> BackendError {
    BackendError::InvalidResponse(format!("inference failed: {e}"))
}

/// Verifies the model file integrity using BLAKE3 hash.
fn verify_checksum(path: &Path, expected: &str) -> Result<(), BackendError> {
    let data = std::fs::read(path).map_err(|e| {
        BackendError::unavailable(BACKEND_NAME, format!("cannot read model: {e}"))
    })?;
    let actual = blake3::hash(&data).to_hex().to_string();

    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(BackendError::unavailable(
            BACKEND_NAME,
            format!("model checksum mismatch: expected {expected}, got {actual}"),
        ));
    }
    Ok(())
}
