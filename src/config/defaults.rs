// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the application. Constants are organized by category.
//!
//! # Categories
//!
//! - **Preprocessing**: Backend input geometry
//! - **Thresholds**: Accuracy-class radii (re-exported from the domain)
//! - **Color backend**: Softmax temperature and confidence floor
//! - **ONNX backend**: Model file names and candidate limits
//! - **Remote backend**: Timeouts and retry policy
//! - **Batch**: Worker pool size

pub use crate::domain::evaluation::default_thresholds::{CITY_M, COUNTRY_M, REGION_M, STREET_M};

// ==========================================================================
// Preprocessing Defaults
// ==========================================================================

/// Default square input side in pixels (the common vision backbone size).
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Largest accepted input side in pixels.
pub const MAX_INPUT_SIZE: u32 = 4096;

// ==========================================================================
// Color Backend Defaults
// ==========================================================================

/// Candidates below this confidence are not reported.
pub const DEFAULT_COLOR_MIN_CONFIDENCE: f64 = 0.05;

/// Softmax temperature over region similarities.
pub const DEFAULT_COLOR_TEMPERATURE: f64 = 0.05;

// ==========================================================================
// ONNX Backend Defaults
// ==========================================================================

/// Model file looked up in the data directory when no path is configured.
pub const DEFAULT_MODEL_FILENAME: &str = "geocells.onnx";

/// Cell table looked up in the data directory when no path is configured.
pub const DEFAULT_CELLS_FILENAME: &str = "geocells.toml";

/// Number of cells reported per image.
pub const DEFAULT_TOP_K: usize = 5;

/// Maximum number of cells reported per image.
pub const MAX_TOP_K: usize = 100;

/// Cells below this probability are not reported.
pub const DEFAULT_ONNX_MIN_CONFIDENCE: f64 = 0.01;

// ==========================================================================
// Remote Backend Defaults
// ==========================================================================

/// Per-request timeout in seconds.
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;

/// Retries after the first attempt for transient failures.
pub const DEFAULT_REMOTE_MAX_RETRIES: u32 = 3;

/// Delay before the first retry, doubled for each further retry.
pub const DEFAULT_REMOTE_BACKOFF_MS: u64 = 500;

/// Upper bound on retries.
pub const MAX_REMOTE_RETRIES: u32 = 10;

// ==========================================================================
// Batch Defaults
// ==========================================================================

/// Images evaluated concurrently.
pub const DEFAULT_WORKERS: usize = 4;

/// Minimum worker count.
pub const MIN_WORKERS: usize = 1;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    // Threshold ordering
    assert!(STREET_M < CITY_M);
    assert!(CITY_M < REGION_M);
    assert!(REGION_M < COUNTRY_M);

    // Preprocessing validation
    assert!(DEFAULT_INPUT_SIZE > 0);
    assert!(DEFAULT_INPUT_SIZE <= MAX_INPUT_SIZE);

    // Backend validation
    assert!(DEFAULT_COLOR_TEMPERATURE > 0.0);
    assert!(DEFAULT_COLOR_MIN_CONFIDENCE < 1.0);
    assert!(DEFAULT_TOP_K > 0);
    assert!(DEFAULT_TOP_K <= MAX_TOP_K);
    assert!(DEFAULT_REMOTE_TIMEOUT_SECS > 0);
    assert!(DEFAULT_REMOTE_MAX_RETRIES <= MAX_REMOTE_RETRIES);

    // Batch validation
    assert!(DEFAULT_WORKERS >= MIN_WORKERS);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_defaults_match_documented_values() {
        assert_eq!(STREET_M, 1_000.0);
        assert_eq!(CITY_M, 25_000.0);
        assert_eq!(REGION_M, 200_000.0);
        assert_eq!(COUNTRY_M, 750_000.0);
    }

    #[test]
    fn remote_defaults_are_valid() {
        assert_eq!(DEFAULT_REMOTE_TIMEOUT_SECS, 30);
        assert_eq!(DEFAULT_REMOTE_MAX_RETRIES, 3);
        assert_eq!(DEFAULT_REMOTE_BACKOFF_MS, 500);
    }

    #[test]
    fn default_file_names_are_distinct() {
        assert_ne!(DEFAULT_MODEL_FILENAME, DEFAULT_CELLS_FILENAME);
        assert!(DEFAULT_MODEL_FILENAME.ends_with(".onnx"));
    }
}
