// SPDX-License-Identifier: MPL-2.0
//! Domain error types.
//!
//! These errors describe rejected input at the value-object boundary and
//! carry the offending values. They depend on nothing outside `std`.

use std::fmt;

// =============================================================================
// CoordinateRangeError
// =============================================================================

/// A latitude/longitude pair that is non-finite or outside
/// `[-90, 90]` x `[-180, 180]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateRangeError {
    /// Rejected latitude.
    pub latitude: f64,
    /// Rejected longitude.
    pub longitude: f64,
}

impl fmt::Display for CoordinateRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Coordinate out of range: latitude {} (must be -90..=90), longitude {} (must be -180..=180)",
            self.latitude, self.longitude
        )
    }
}

impl std::error::Error for CoordinateRangeError {}

// =============================================================================
// InvalidImageError
// =============================================================================

/// Decoded image input that cannot be preprocessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidImageError {
    /// The pixel buffer holds no bytes.
    EmptyBuffer,

    /// Width or height is zero.
    ZeroDimension {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },

    /// Channel count other than 1 (gray), 3 (RGB) or 4 (RGBA).
    UnsupportedChannels(u8),

    /// Buffer length does not match `width * height * channels`.
    BufferSizeMismatch {
        /// Length implied by the declared geometry.
        expected: usize,
        /// Actual buffer length.
        actual: usize,
    },

    /// `width * height * channels` does not fit in memory addressing.
    TooLarge {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// Declared channel count.
        channels: u8,
    },

    /// The requested output geometry has a zero side.
    InvalidTargetSize {
        /// Target width.
        width: u32,
        /// Target height.
        height: u32,
    },
}

impl fmt::Display for InvalidImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidImageError::EmptyBuffer => write!(f, "Invalid image: empty pixel buffer"),
            InvalidImageError::ZeroDimension { width, height } => {
                write!(f, "Invalid image: zero dimension ({width}x{height})")
            }
            InvalidImageError::UnsupportedChannels(channels) => {
                write!(
                    f,
                    "Invalid image: unsupported channel count {channels} (expected 1, 3 or 4)"
                )
            }
            InvalidImageError::BufferSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "Invalid image: buffer holds {actual} bytes, expected {expected}"
                )
            }
            InvalidImageError::TooLarge {
                width,
                height,
                channels,
            } => {
                write!(
                    f,
                    "Invalid image: {width}x{height}x{channels} exceeds addressable size"
                )
            }
            InvalidImageError::InvalidTargetSize { width, height } => {
                write!(f, "Invalid target size: {width}x{height}")
            }
        }
    }
}

impl std::error::Error for InvalidImageError {}

// =============================================================================
// ThresholdError
// =============================================================================

/// An accuracy-class threshold that is negative or non-finite.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdError {
    /// Name of the class the threshold belongs to.
    pub class: &'static str,
    /// Rejected value in meters.
    pub meters: f64,
}

impl fmt::Display for ThresholdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid threshold for '{}': {} m (must be finite and >= 0)",
            self.class, self.meters
        )
    }
}

impl std::error::Error for ThresholdError {}
