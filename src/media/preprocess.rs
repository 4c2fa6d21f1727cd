// SPDX-License-Identifier: MPL-2.0
//! Conversion of decoded images into backend input tensors.
//!
//! The preprocessor validates the raw buffer, converts it to RGB, brings it to
//! the backend's input geometry and scales pixel values into a single-image
//! tensor. It performs no I/O and is deterministic for identical input.

use crate::domain::error::InvalidImageError;
use crate::domain::media::{DecodedImage, FeatureInput, Normalization, TensorLayout};
use image_rs::imageops::FilterType;
use image_rs::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use ndarray::Array4;
use serde::{Deserialize, Serialize};

/// How an image is brought to the target geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    /// Resize both axes independently, ignoring the aspect ratio.
    #[default]
    Stretch,
    /// Scale to cover the target, then crop the centered overflow.
    CenterCrop,
}

/// Resampling filter used when resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    Nearest,
    /// Bilinear.
    #[default]
    Triangle,
    /// Bicubic.
    CatmullRom,
    Lanczos3,
}

impl ResampleFilter {
    fn to_filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Input geometry and value range a backend expects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessConfig {
    pub width: u32,
    pub height: u32,
    pub resize: ResizeMode,
    pub filter: ResampleFilter,
    pub layout: TensorLayout,
    pub normalization: Option<Normalization>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            width: crate::config::defaults::DEFAULT_INPUT_SIZE,
            height: crate::config::defaults::DEFAULT_INPUT_SIZE,
            resize: ResizeMode::default(),
            filter: ResampleFilter::default(),
            layout: TensorLayout::default(),
            normalization: None,
        }
    }
}

/// Turns a [`DecodedImage`] into a [`FeatureInput`].
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    config: PreprocessConfig,
}

impl ImagePreprocessor {
    /// Creates a preprocessor for the given target geometry.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidImageError::InvalidTargetSize`] if either target side is zero.
    pub fn new(config: PreprocessConfig) -> Result<Self, InvalidImageError> {
        if config.width == 0 || config.height == 0 {
            return Err(InvalidImageError::InvalidTargetSize {
                width: config.width,
                height: config.height,
            });
        }
        Ok(Self { config })
    }

    /// Prepares `image` for a prediction backend.
    ///
    /// Gray images are replicated to three channels; an alpha channel is dropped.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidImageError`] if the buffer is empty, a side is
    /// zero, the channel count is not 1, 3 or 4, or the buffer length does not
    /// match the declared geometry.
    pub fn prepare(&self, image: &DecodedImage) -> Result<FeatureInput, InvalidImageError> {
        let rgb = to_rgb(image)?;
        let resized = self.resize(rgb);
        let tensor = self.to_tensor(&resized);
        Ok(FeatureInput::new(
            tensor,
            self.config.layout,
            self.config.normalization,
        ))
    }

    fn resize(&self, rgb: RgbImage) -> RgbImage {
        let PreprocessConfig {
            width,
            height,
            resize,
            filter,
            ..
        } = self.config;

        if rgb.dimensions() == (width, height) {
            return rgb;
        }

        let filter = filter.to_filter_type();
        match resize {
            ResizeMode::Stretch => image_rs::imageops::resize(&rgb, width, height, filter),
            ResizeMode::CenterCrop => DynamicImage::ImageRgb8(rgb)
                .resize_to_fill(width, height, filter)
                .to_rgb8(),
        }
    }

    fn to_tensor(&self, rgb: &RgbImage) -> Array4<f32> {
        let (width, height) = rgb.dimensions();
        let (w, h) = (width as usize, height as usize);
        let layout = self.config.layout;

        let mut tensor = match layout {
            TensorLayout::Nchw => Array4::<f32>::zeros((1, 3, h, w)),
            TensorLayout::Nhwc => Array4::<f32>::zeros((1, h, w, 3)),
        };

        for (x, y, pixel) in rgb.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for (c, &byte) in pixel.0.iter().enumerate() {
                let mut value = f32::from(byte) / 255.0;
                if let Some(n) = self.config.normalization {
                    value = (value - n.mean[c]) / n.std[c];
                }
                let index = match layout {
                    TensorLayout::Nchw => [0, c, y, x],
                    TensorLayout::Nhwc => [0, y, x, c],
                };
                tensor[index] = value;
            }
        }

        tensor
    }
}

/// Validates the raw buffer and converts it to 8-bit RGB.
fn to_rgb(image: &DecodedImage) -> Result<RgbImage, InvalidImageError> {
    if image.pixels().is_empty() {
        return Err(InvalidImageError::EmptyBuffer);
    }
    if image.width() == 0 || image.height() == 0 {
        return Err(InvalidImageError::ZeroDimension {
            width: image.width(),
            height: image.height(),
        });
    }
    if !matches!(image.channels(), 1 | 3 | 4) {
        return Err(InvalidImageError::UnsupportedChannels(image.channels()));
    }

    let expected = image
        .expected_len()
        .ok_or(InvalidImageError::TooLarge {
            width: image.width(),
            height: image.height(),
            channels: image.channels(),
        })?;
    let actual = image.pixels().len();
    let mismatch = InvalidImageError::BufferSizeMismatch { expected, actual };
    if expected != actual {
        return Err(mismatch);
    }

    let (width, height) = (image.width(), image.height());
    let pixels = image.pixels().to_vec();
    let rgb = match image.channels() {
        1 => GrayImage::from_raw(width, height, pixels)
            .map(|gray| DynamicImage::ImageLuma8(gray).to_rgb8()),
        3 => RgbImage::from_raw(width, height, pixels),
        _ => RgbaImage::from_raw(width, height, pixels)
            .map(|rgba| DynamicImage::ImageRgba8(rgba).to_rgb8()),
    };
    rgb.ok_or(mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;

    fn preprocessor(width: u32, height: u32) -> ImagePreprocessor {
        ImagePreprocessor::new(PreprocessConfig {
            width,
            height,
            ..PreprocessConfig::default()
        })
        .unwrap()
    }

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> DecodedImage {
        let pixels = rgb.repeat((width * height) as usize);
        DecodedImage::new(width, height, 3, pixels)
    }

    #[test]
    fn rejects_empty_buffer() {
        let result = preprocessor(4, 4).prepare(&DecodedImage::empty());
        assert_eq!(result, Err(InvalidImageError::EmptyBuffer));
    }

    #[test]
    fn rejects_zero_dimension() {
        let image = DecodedImage::new(0, 4, 3, vec![1, 2, 3]);
        assert_eq!(
            preprocessor(4, 4).prepare(&image),
            Err(InvalidImageError::ZeroDimension {
                width: 0,
                height: 4
            })
        );
    }

    #[test]
    fn rejects_unsupported_channel_counts() {
        for channels in [0u8, 2, 5] {
            let image = DecodedImage::new(2, 2, channels, vec![0; 8]);
            assert_eq!(
                preprocessor(4, 4).prepare(&image),
                Err(InvalidImageError::UnsupportedChannels(channels))
            );
        }
    }

    #[test]
    fn rejects_short_buffer() {
        let image = DecodedImage::new(2, 2, 3, vec![0; 11]);
        assert_eq!(
            preprocessor(4, 4).prepare(&image),
            Err(InvalidImageError::BufferSizeMismatch {
                expected: 12,
                actual: 11
            })
        );
    }

    #[test]
    fn rejects_overflowing_geometry() {
        let image = DecodedImage::new(u32::MAX, u32::MAX, 4, vec![1; 4]);
        assert_eq!(
            preprocessor(4, 4).prepare(&image),
            Err(InvalidImageError::TooLarge {
                width: u32::MAX,
                height: u32::MAX,
                channels: 4
            })
        );
    }

    #[test]
    fn rejects_zero_target() {
        let config = PreprocessConfig {
            width: 0,
            ..PreprocessConfig::default()
        };
        assert!(matches!(
            ImagePreprocessor::new(config),
            Err(InvalidImageError::InvalidTargetSize { width: 0, .. })
        ));
    }

    #[test]
    fn output_has_target_geometry() {
        let input = preprocessor(8, 6).prepare(&solid(20, 10, [0, 0, 0])).unwrap();
        assert_eq!(input.shape(), [1, 3, 6, 8]);
        assert_eq!(input.dimensions(), (8, 6));
    }

    #[test]
    fn center_crop_keeps_target_geometry() {
        let p = ImagePreprocessor::new(PreprocessConfig {
            width: 4,
            height: 4,
            resize: ResizeMode::CenterCrop,
            layout: TensorLayout::Nhwc,
            ..PreprocessConfig::default()
        })
        .unwrap();
        let input = p.prepare(&solid(16, 8, [255, 0, 0])).unwrap();
        assert_eq!(input.shape(), [1, 4, 4, 3]);
        let [r, g, b] = input.mean_rgb();
        assert_abs_diff_eq!(r, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(g, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(b, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn values_are_scaled_to_unit_range() {
        let input = preprocessor(2, 2).prepare(&solid(2, 2, [255, 0, 51])).unwrap();
        let t = input.tensor();
        assert_abs_diff_eq!(t[[0, 0, 1, 1]], 1.0);
        assert_abs_diff_eq!(t[[0, 1, 0, 1]], 0.0);
        assert_abs_diff_eq!(t[[0, 2, 1, 0]], 0.2, epsilon = 1e-6);
    }

    #[test]
    fn gray_input_is_replicated() {
        let image = DecodedImage::new(2, 1, 1, vec![128, 128]);
        let input = preprocessor(2, 1).prepare(&image).unwrap();
        let [r, g, b] = input.mean_rgb();
        assert_abs_diff_eq!(r, g);
        assert_abs_diff_eq!(g, b);
        assert_abs_diff_eq!(r, 128.0 / 255.0, epsilon = 1e-6);
    }

    #[test]
    fn alpha_is_dropped() {
        let image = DecodedImage::new(1, 1, 4, vec![0, 255, 0, 10]);
        let input = preprocessor(1, 1).prepare(&image).unwrap();
        assert_eq!(input.shape(), [1, 3, 1, 1]);
        assert_abs_diff_eq!(input.tensor()[[0, 1, 0, 0]], 1.0);
    }

    #[test]
    fn normalization_is_applied() {
        let p = ImagePreprocessor::new(PreprocessConfig {
            width: 1,
            height: 1,
            normalization: Some(Normalization {
                mean: [0.5, 0.5, 0.5],
                std: [0.5, 0.5, 0.5],
            }),
            ..PreprocessConfig::default()
        })
        .unwrap();
        let input = p.prepare(&solid(1, 1, [255, 0, 255])).unwrap();
        assert_abs_diff_eq!(input.tensor()[[0, 0, 0, 0]], 1.0);
        assert_abs_diff_eq!(input.tensor()[[0, 1, 0, 0]], -1.0);
    }

    #[test]
    fn preparation_is_deterministic() {
        let pixels: Vec<u8> = (0..=255u8).cycle().take(30 * 20 * 3).collect();
        let image = DecodedImage::new(30, 20, 3, pixels);
        let p = preprocessor(7, 5);
        assert_eq!(p.prepare(&image).unwrap(), p.prepare(&image).unwrap());
    }
}
