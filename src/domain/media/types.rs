// SPDX-License-Identifier: MPL-2.0
//! Core media types for the domain layer.
//!
//! These types represent pure data. Decoding files into a [`DecodedImage`]
//! and turning one into a [`FeatureInput`] happen elsewhere.

use ndarray::{Array4, Axis};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// DecodedImage
// =============================================================================

/// An already-decoded pixel buffer.
///
/// Pixels are row-major, interleaved, one byte per channel. Any geometry is
/// accepted here; the preprocessor rejects invalid buffers.
///
/// # Example
///
/// ```
/// use geolens::domain::media::DecodedImage;
///
/// let pixels = vec![255u8; 4 * 3 * 3]; // 4x3 RGB
/// let image = DecodedImage::new(4, 3, 3, pixels);
///
/// assert_eq!(image.width(), 4);
/// assert_eq!(image.expected_len(), Some(36));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    channels: u8,
    pixels: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Creates a decoded image from its geometry and raw pixel bytes.
    #[must_use]
    pub fn new(width: u32, height: u32, channels: u8, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channels,
            pixels: Arc::new(pixels),
        }
    }

    /// An image with no pixels, used when decoding failed upstream.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(0, 0, 0, Vec::new())
    }

    /// Returns the image width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the image height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the number of interleaved channels per pixel.
    #[must_use]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Returns the raw pixel bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the buffer length implied by the declared geometry, or `None`
    /// if it overflows `usize`.
    #[must_use]
    pub fn expected_len(&self) -> Option<usize> {
        usize::try_from(self.width)
            .ok()?
            .checked_mul(usize::try_from(self.height).ok()?)?
            .checked_mul(usize::from(self.channels))
    }
}

// =============================================================================
// TensorLayout
// =============================================================================

/// Axis order of a 4D image tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TensorLayout {
    /// (batch, channel, height, width), the usual ONNX vision layout.
    #[default]
    Nchw,
    /// (batch, height, width, channel).
    Nhwc,
}

impl TensorLayout {
    /// Returns the axis holding the color channels.
    #[must_use]
    pub fn channel_axis(self) -> usize {
        match self {
            TensorLayout::Nchw => 1,
            TensorLayout::Nhwc => 3,
        }
    }

    /// Returns the layout name used in configuration and on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TensorLayout::Nchw => "nchw",
            TensorLayout::Nhwc => "nhwc",
        }
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// Per-channel standardization applied after scaling pixels to `[0, 1]`.
///
/// Each channel value becomes `(v - mean) / std`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    /// Per-channel mean (R, G, B).
    pub mean: [f32; 3],
    /// Per-channel standard deviation (R, G, B).
    pub std: [f32; 3],
}

impl Normalization {
    /// ImageNet statistics, used by most pretrained vision backbones.
    pub const IMAGENET: Self = Self {
        mean: [0.485, 0.456, 0.406],
        std: [0.229, 0.224, 0.225],
    };
}

// =============================================================================
// FeatureInput
// =============================================================================

/// Preprocessed image data handed to a prediction backend.
///
/// Holds a single-image RGB tensor (batch size 1) in `[0, 1]` or, if
/// [`normalization`](Self::normalization) is set, standardized per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInput {
    tensor: Array4<f32>,
    layout: TensorLayout,
    normalization: Option<Normalization>,
}

impl FeatureInput {
    /// Wraps a tensor produced by the preprocessor.
    #[must_use]
    pub fn new(
        tensor: Array4<f32>,
        layout: TensorLayout,
        normalization: Option<Normalization>,
    ) -> Self {
        Self {
            tensor,
            layout,
            normalization,
        }
    }

    /// Returns the tensor.
    #[must_use]
    pub fn tensor(&self) -> &Array4<f32> {
        &self.tensor
    }

    /// Returns the tensor's axis order.
    #[must_use]
    pub fn layout(&self) -> TensorLayout {
        self.layout
    }

    /// Returns the standardization applied, if any.
    #[must_use]
    pub fn normalization(&self) -> Option<Normalization> {
        self.normalization
    }

    /// Returns the tensor shape.
    #[must_use]
    pub fn shape(&self) -> [usize; 4] {
        let s = self.tensor.shape();
        [s[0], s[1], s[2], s[3]]
    }

    /// Returns `(width, height)` of the tensor image.
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        let [_, a, b, c] = self.shape();
        match self.layout {
            TensorLayout::Nchw => (c, b),
            TensorLayout::Nhwc => (b, a),
        }
    }

    /// Returns the mean R, G and B values in `[0, 1]` pixel space.
    ///
    /// Any standardization is undone so the result does not depend on the
    /// preprocessing configuration.
    #[must_use]
    pub fn mean_rgb(&self) -> [f32; 3] {
        let axis = Axis(self.layout.channel_axis());
        let mut means = [0.0f32; 3];
        for (channel, lane) in self.tensor.axis_iter(axis).take(3).enumerate() {
            let mean = lane.mean().unwrap_or(0.0);
            means[channel] = match self.normalization {
                Some(n) => mean * n.std[channel] + n.mean[channel],
                None => mean,
            };
        }
        means
    }
}
