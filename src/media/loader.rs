// SPDX-License-Identifier: MPL-2.0
//! Image file loading for the command-line front end.

use crate::domain::media::DecodedImage;
use crate::domain::metadata::MetadataBlock;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Supported image file extensions.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "tiff", "tif", "webp", "bmp", "ico",
];

/// An image file read from disk.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Decoded pixels, or [`DecodedImage::empty`] if the bytes did not decode.
    pub image: DecodedImage,
    /// The whole file, used as the EXIF container.
    pub metadata: MetadataBlock,
}

/// Reads `path` once and derives both the pixels and the metadata block from
/// the same bytes.
///
/// A file that reads but does not decode still yields its metadata, so ground
/// truth can be recovered from it.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read.
pub fn load_image_file<P: AsRef<Path>>(path: P) -> Result<LoadedImage> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::Io(format!("{}: {e}", path.display())))?;
    Ok(decode_bytes(bytes))
}

/// Decodes an in-memory image file.
#[must_use]
pub fn decode_bytes(bytes: Vec<u8>) -> LoadedImage {
    let image = match image_rs::load_from_memory(&bytes) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            DecodedImage::new(width, height, 4, rgba.into_vec())
        }
        Err(e) => {
            tracing::warn!("image did not decode: {e}");
            DecodedImage::empty()
        }
    };

    LoadedImage {
        image,
        metadata: MetadataBlock::container(bytes),
    }
}

/// Returns `true` if the path has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_rs::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use tempfile::tempdir;

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(3, 2, Rgb([10, 200, 30]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png_to_rgba() {
        let loaded = decode_bytes(png_bytes());
        assert_eq!(loaded.image.width(), 3);
        assert_eq!(loaded.image.height(), 2);
        assert_eq!(loaded.image.channels(), 4);
        assert_eq!(&loaded.image.pixels()[..4], &[10, 200, 30, 255]);
        assert!(!loaded.metadata.is_absent());
    }

    #[test]
    fn undecodable_bytes_keep_metadata() {
        let loaded = decode_bytes(b"definitely not an image".to_vec());
        assert!(loaded.image.pixels().is_empty());
        assert!(matches!(loaded.metadata, MetadataBlock::Container(_)));
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        fs::write(&path, png_bytes()).unwrap();

        let loaded = load_image_file(&path).unwrap();
        assert_eq!(loaded.image.width(), 3);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = load_image_file(dir.path().join("nope.jpg")).unwrap_err();
        assert!(matches!(err, Error::Io(msg) if msg.contains("nope.jpg")));
    }

    #[test]
    fn extension_check_ignores_case() {
        assert!(is_supported_image(Path::new("a/B.JPG")));
        assert!(is_supported_image(Path::new("photo.webp")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("no_extension")));
    }
}
