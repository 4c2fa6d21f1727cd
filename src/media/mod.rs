// SPDX-License-Identifier: MPL-2.0
//! Image-side collaborators of the evaluation pipeline.
//!
//! - [`preprocess`]: decoded pixels to backend tensors
//! - [`exif_location`]: ground-truth coordinates from EXIF GPS tags
//! - [`loader`]: reading and decoding image files for path jobs

pub mod exif_location;
pub mod loader;
pub mod preprocess;

// Re-export commonly used types
pub use exif_location::ExifLocationExtractor;
pub use loader::{decode_bytes, is_supported_image, load_image_file, LoadedImage};
pub use preprocess::{ImagePreprocessor, PreprocessConfig, ResampleFilter, ResizeMode};
