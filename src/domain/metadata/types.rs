// SPDX-License-Identifier: MPL-2.0
//! Metadata domain types.

use crate::domain::geo::Coordinate;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// CaptureTime
// =============================================================================

/// Clock a capture time was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureClock {
    /// GPS date and time stamps, always UTC.
    GpsUtc,
    /// The camera's own clock, in whatever zone it was set to.
    CameraLocal,
}

/// When an image was taken, and which clock says so.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaptureTime {
    at: NaiveDateTime,
    clock: CaptureClock,
}

impl CaptureTime {
    #[must_use]
    pub fn new(at: NaiveDateTime, clock: CaptureClock) -> Self {
        Self { at, clock }
    }

    /// A timestamp from the GPS receiver, in UTC.
    #[must_use]
    pub fn gps_utc(at: NaiveDateTime) -> Self {
        Self::new(at, CaptureClock::GpsUtc)
    }

    /// A timestamp from the camera clock, zone unknown.
    #[must_use]
    pub fn camera_local(at: NaiveDateTime) -> Self {
        Self::new(at, CaptureClock::CameraLocal)
    }

    /// Returns the wall-clock reading.
    #[must_use]
    pub fn at(&self) -> NaiveDateTime {
        self.at
    }

    #[must_use]
    pub fn clock(&self) -> CaptureClock {
        self.clock
    }
}

/// GPS times carry a ` UTC` suffix; camera times are printed as read.
impl fmt::Display for CaptureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.clock {
            CaptureClock::GpsUtc => write!(f, "{} UTC", self.at),
            CaptureClock::CameraLocal => write!(f, "{}", self.at),
        }
    }
}

// =============================================================================
// GroundTruth
// =============================================================================

/// Reference location recovered from an image's embedded metadata.
///
/// This is what the image claims about itself, not an externally verified
/// location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroundTruth {
    coordinate: Coordinate,
    captured_at: Option<CaptureTime>,
}

impl GroundTruth {
    /// Creates a ground truth from a validated coordinate.
    #[must_use]
    pub fn new(coordinate: Coordinate, captured_at: Option<CaptureTime>) -> Self {
        Self {
            coordinate,
            captured_at,
        }
    }

    /// Returns the reference coordinate.
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Returns the capture time, if the metadata carried one.
    #[must_use]
    pub fn captured_at(&self) -> Option<CaptureTime> {
        self.captured_at
    }
}

// =============================================================================
// MetadataBlock
// =============================================================================

/// Raw metadata supplied alongside a decoded image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MetadataBlock {
    /// A complete image file (JPEG, PNG, TIFF, WebP, HEIF) holding EXIF data.
    Container(Arc<[u8]>),
    /// A bare EXIF block in TIFF structure, without a container around it.
    Exif(Arc<[u8]>),
    /// No metadata available.
    #[default]
    Absent,
}

impl MetadataBlock {
    /// Wraps the bytes of a whole image file.
    #[must_use]
    pub fn container(bytes: impl Into<Arc<[u8]>>) -> Self {
        MetadataBlock::Container(bytes.into())
    }

    /// Wraps a bare EXIF block.
    #[must_use]
    pub fn exif(bytes: impl Into<Arc<[u8]>>) -> Self {
        MetadataBlock::Exif(bytes.into())
    }

    /// Returns `true` if there are no bytes to inspect.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        match self {
            MetadataBlock::Container(bytes) | MetadataBlock::Exif(bytes) => bytes.is_empty(),
            MetadataBlock::Absent => true,
        }
    }
}
