// SPDX-License-Identifier: MPL-2.0
//! Test utilities for float comparisons and other common test helpers.
//!
//! This module re-exports the `approx` crate's assertion macros for float comparison,
//! which properly handle floating-point precision issues that `assert_eq!` cannot.

// Re-export approx macros for convenient use in tests
pub use approx::{assert_abs_diff_eq, assert_relative_eq};

use crate::domain::geo::Coordinate;
use crate::domain::media::DecodedImage;
use crate::domain::metadata::MetadataBlock;

/// Default epsilon for f64 comparisons of distances in meters.
pub const METERS_EPSILON: f64 = 1e-6;

/// Builds a coordinate from literals known to be in range.
pub fn coord(latitude: f64, longitude: f64) -> Coordinate {
    Coordinate::new(latitude, longitude).expect("test coordinate in range")
}

/// A solid-color RGB image.
pub fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> DecodedImage {
    DecodedImage::new(width, height, 3, rgb.repeat((width * height) as usize))
}

/// Builds a raw EXIF block carrying the given GPS position.
pub fn gps_exif_block(latitude: f64, longitude: f64) -> MetadataBlock {
    gps_exif_block_with(latitude, longitude, &[])
}

/// Like [`gps_exif_block`], with `extra` fields written after the GPS tags.
pub fn gps_exif_block_with(
    latitude: f64,
    longitude: f64,
    extra: &[exif::Field],
) -> MetadataBlock {
    use exif::experimental::Writer;
    use exif::{Field, In, Tag, Value};

    let reference = |negative: bool, labels: [&str; 2]| {
        Value::Ascii(vec![labels[usize::from(negative)].as_bytes().to_vec()])
    };
    let fields = [
        Field {
            tag: Tag::GPSLatitudeRef,
            ifd_num: In::PRIMARY,
            value: reference(latitude < 0.0, ["N", "S"]),
        },
        Field {
            tag: Tag::GPSLatitude,
            ifd_num: In::PRIMARY,
            value: dms(latitude),
        },
        Field {
            tag: Tag::GPSLongitudeRef,
            ifd_num: In::PRIMARY,
            value: reference(longitude < 0.0, ["E", "W"]),
        },
        Field {
            tag: Tag::GPSLongitude,
            ifd_num: In::PRIMARY,
            value: dms(longitude),
        },
    ];

    let mut writer = Writer::new();
    for field in fields.iter().chain(extra) {
        writer.push_field(field);
    }
    let mut buf = std::io::Cursor::new(Vec::new());
    writer.write(&mut buf, false).expect("in-memory EXIF write");
    MetadataBlock::exif(buf.into_inner())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn dms(decimal: f64) -> exif::Value {
    let v = decimal.abs();
    let degrees = v.trunc();
    let minutes = ((v - degrees) * 60.0).trunc();
    let seconds = ((v - degrees) * 60.0 - minutes) * 60.0;
    exif::Value::Rational(vec![
        exif::Rational::from((degrees as u32, 1)),
        exif::Rational::from((minutes as u32, 1)),
        exif::Rational::from(((seconds * 10_000.0).round() as u32, 10_000)),
    ])
}
