// SPDX-License-Identifier: MPL-2.0
//! Color-statistics backend implementing [`PredictionBackend`].
//!
//! Scores six continental regions by how closely the image's average color
//! matches a characteristic palette for each region. It needs no model files
//! and is always available, which makes it the default backend and a
//! reference for the backend contract. Its predictions are coarse: the best
//! it can reach is a continent center.
//!
//! [`PredictionBackend`]: crate::application::port::PredictionBackend

use crate::application::port::{BackendError, PredictionBackend};
use crate::config::defaults::{DEFAULT_COLOR_MIN_CONFIDENCE, DEFAULT_COLOR_TEMPERATURE};
use crate::domain::evaluation::{rank_candidates, PredictionCandidate};
use crate::domain::geo::{Confidence, Coordinate};
use crate::domain::media::FeatureInput;
use crate::infrastructure::scoring::softmax;

/// Name reported in logs and errors.
const BACKEND_NAME: &str = "color";

/// Region label, center (latitude, longitude) and characteristic mean RGB.
const REGIONS: [(&str, (f64, f64), [f64; 3]); 6] = [
    ("North America", (40.7128, -74.0060), [0.30, 0.80, 0.30]),
    ("South America", (-15.7801, -47.9292), [0.35, 0.65, 0.45]),
    ("Europe", (48.8566, 2.3522), [0.50, 0.60, 0.40]),
    ("Africa", (-1.2921, 36.8219), [0.70, 0.50, 0.30]),
    ("Asia", (35.6762, 139.6503), [0.80, 0.30, 0.30]),
    ("Australia", (-33.8688, 151.2093), [0.30, 0.30, 0.80]),
];

/// Mean colors with a smaller norm carry no hue information.
const MIN_COLOR_NORM: f64 = 1e-6;

/// Continental guesses from average image color.
#[derive(Debug, Clone)]
pub struct ColorRegionBackend {
    min_confidence: f64,
    temperature: f64,
}

impl Default for ColorRegionBackend {
    fn default() -> Self {
        Self::new(DEFAULT_COLOR_MIN_CONFIDENCE, DEFAULT_COLOR_TEMPERATURE)
    }
}

impl ColorRegionBackend {
    /// Creates the backend.
    ///
    /// `temperature` sharpens (small) or flattens (large) the softmax over
    /// region similarities; non-positive values fall back to the default.
    #[must_use]
    pub fn new(min_confidence: f64, temperature: f64) -> Self {
        let temperature = if temperature > 0.0 && temperature.is_finite() {
            temperature
        } else {
            DEFAULT_COLOR_TEMPERATURE
        };
        Self {
            min_confidence: min_confidence.clamp(0.0, 1.0),
            temperature,
        }
    }

    fn similarities(mean: [f64; 3]) -> Option<[f64; 6]> {
        let norm = dot(mean, mean).sqrt();
        if norm < MIN_COLOR_NORM {
            return None;
        }
        let mut scores = [0.0; 6];
        for (score, (_, _, palette)) in scores.iter_mut().zip(REGIONS.iter()) {
            *score = dot(mean, *palette) / (norm * dot(*palette, *palette).sqrt());
        }
        Some(scores)
    }
}

impl PredictionBackend for ColorRegionBackend {
    fn predict(&self, input: &FeatureInput) -> Result<Vec<PredictionCandidate>, BackendError> {
        let mean = input.mean_rgb().map(f64::from);
        let Some(scores) = Self::similarities(mean) else {
            tracing::debug!("image too dark for a color guess");
            return Ok(Vec::new());
        };

        let probabilities = softmax(&scores, self.temperature);
        let mut candidates = Vec::new();
        for ((label, (lat, lon), _), p) in REGIONS.iter().zip(probabilities) {
            if p < self.min_confidence {
                continue;
            }
            let (Ok(coordinate), Some(confidence)) = (Coordinate::new(*lat, *lon), Confidence::new(p))
            else {
                continue;
            };
            candidates.push(PredictionCandidate::new(coordinate, confidence).with_label(*label));
        }

        rank_candidates(&mut candidates);
        Ok(candidates)
    }

    fn name(&self) -> &'static str {
        BACKEND_NAME
    }
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}
