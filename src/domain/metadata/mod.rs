// SPDX-License-Identifier: MPL-2.0
//! Metadata domain types.
//!
//! - [`GroundTruth`]: reference location recovered from an image's own metadata
//! - [`CaptureTime`]: when the image was taken, tagged with the clock it came from
//! - [`MetadataBlock`]: the raw bytes the location is recovered from

mod types;

pub use types::{CaptureClock, CaptureTime, GroundTruth, MetadataBlock};
