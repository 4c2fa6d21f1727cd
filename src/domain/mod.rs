// SPDX-License-Identifier: MPL-2.0
//! Domain layer - Core evaluation types and rules.
//!
//! This module contains pure value objects and business rules. Apart from
//! `std` it only uses data crates (`chrono` timestamps, `ndarray` tensors,
//! `serde` derives); no I/O happens here.
//!
//! # Modules
//!
//! - [`error`]: Domain error types ([`CoordinateRangeError`](error::CoordinateRangeError),
//!   [`InvalidImageError`](error::InvalidImageError), [`ThresholdError`](error::ThresholdError))
//! - [`evaluation`]: Candidates, accuracy classes and results
//!   ([`EvaluationResult`](evaluation::EvaluationResult))
//! - [`geo`]: Coordinates and great-circle distance ([`Coordinate`](geo::Coordinate))
//! - [`media`]: Image buffers and feature tensors ([`DecodedImage`](media::DecodedImage),
//!   [`FeatureInput`](media::FeatureInput))
//! - [`metadata`]: Ground truth recovered from metadata ([`GroundTruth`](metadata::GroundTruth))

pub mod error;
pub mod evaluation;
pub mod geo;
pub mod media;
pub mod metadata;
