// SPDX-License-Identifier: MPL-2.0
//! Media domain types.
//!
//! This module contains the image representations that flow through an
//! evaluation: the decoded pixel buffer handed in by the caller and the
//! feature tensor handed to a prediction backend.

pub mod types;

// Re-export commonly used types
pub use types::{DecodedImage, FeatureInput, Normalization, TensorLayout};
