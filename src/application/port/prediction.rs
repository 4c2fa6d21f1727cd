// SPDX-License-Identifier: MPL-2.0
//! Prediction backend port definition.
//!
//! This module defines the [`PredictionBackend`] trait that every visual
//! geolocation method (local classifier, nearest-neighbor index, hosted
//! endpoint) implements.

use crate::domain::evaluation::PredictionCandidate;
use crate::domain::media::FeatureInput;
use std::fmt;

// =============================================================================
// BackendError
// =============================================================================

/// Errors a backend can report.
///
/// "No confident candidate" is not an error: it is an empty `Ok` sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Resources the backend needs (model weights, remote endpoint) could not
    /// be reached at call time.
    Unavailable {
        /// Name of the backend that failed.
        backend: &'static str,
        /// What could not be reached.
        reason: String,
    },

    /// The backend answered, but its output could not be turned into candidates.
    InvalidResponse(String),
}

impl BackendError {
    /// Shorthand for [`BackendError::Unavailable`].
    pub fn unavailable(backend: &'static str, reason: impl Into<String>) -> Self {
        BackendError::Unavailable {
            backend,
            reason: reason.into(),
        }
    }

    /// Returns `true` for [`BackendError::Unavailable`].
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, BackendError::Unavailable { .. })
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Unavailable { backend, reason } => {
                write!(f, "Backend '{backend}' unavailable: {reason}")
            }
            BackendError::InvalidResponse(msg) => write!(f, "Invalid backend response: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

// =============================================================================
// PredictionBackend Trait
// =============================================================================

/// Port for visual geolocation.
///
/// # Contract
///
/// - The returned candidates are ordered by descending confidence.
/// - Every candidate holds a validated [`Coordinate`](crate::domain::geo::Coordinate);
///   a backend never emits a placeholder such as `(0, 0)` for "unknown".
/// - When nothing is confident enough, the result is `Ok(vec![])`.
/// - [`BackendError::Unavailable`] is reserved for unreachable resources.
///   Backends wrapping a remote service apply their own timeout and retry
///   policy before reporting it.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: a single instance is shared by all
/// images of a batch.
///
/// # Example
///
/// ```ignore
/// use geolens::application::port::{BackendError, PredictionBackend};
/// use geolens::domain::media::FeatureInput;
///
/// fn best_guess(backend: &dyn PredictionBackend, input: &FeatureInput) -> Result<String, BackendError> {
///     let candidates = backend.predict(input)?;
///     Ok(candidates
///         .first()
///         .map_or_else(|| "no guess".to_string(), |c| c.coordinate.format()))
/// }
/// ```
pub trait PredictionBackend: Send + Sync {
    /// Predicts candidate locations for a preprocessed image.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the backend cannot serve the request.
    fn predict(&self, input: &FeatureInput) -> Result<Vec<PredictionCandidate>, BackendError>;

    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;
}
