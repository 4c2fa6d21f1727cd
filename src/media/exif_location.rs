// SPDX-License-Identifier: MPL-2.0
//! Ground-truth location extraction from EXIF GPS tags.
//!
//! Absent, partial and malformed GPS tags all resolve to `None`: corrupt
//! metadata never fails an evaluation.

use crate::domain::geo::Coordinate;
use crate::domain::metadata::{CaptureTime, GroundTruth, MetadataBlock};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use exif::{Exif, In, Tag, Value};
use std::io::Cursor;

/// EXIF `DateTime`/`DateTimeOriginal` format.
const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
/// EXIF `GPSDateStamp` format.
const GPS_DATE_FORMAT: &str = "%Y:%m:%d";

/// Reads the reference location of an image from its metadata.
///
/// Stateless; one instance can be shared by any number of evaluations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifLocationExtractor;

impl ExifLocationExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Extracts the GPS position and capture time from `block`.
    ///
    /// Latitude is negated for reference `S`, longitude for reference `W`.
    /// The source bytes are only read.
    #[must_use]
    pub fn extract(&self, block: &MetadataBlock) -> Option<GroundTruth> {
        let exif = read_exif(block)?;
        let coordinate = gps_coordinate(&exif)?;
        let captured_at = capture_time(&exif);
        Some(GroundTruth::new(coordinate, captured_at))
    }
}

fn read_exif(block: &MetadataBlock) -> Option<Exif> {
    let reader = exif::Reader::new();
    let parsed = match block {
        MetadataBlock::Absent => return None,
        MetadataBlock::Container(bytes) => {
            reader.read_from_container(&mut Cursor::new(bytes.as_ref()))
        }
        MetadataBlock::Exif(bytes) => reader.read_raw(bytes.to_vec()),
    };

    match parsed {
        Ok(exif) => Some(exif),
        Err(e) => {
            tracing::debug!("no readable EXIF data: {e}");
            None
        }
    }
}

fn gps_coordinate(exif: &Exif) -> Option<Coordinate> {
    let field = |tag| exif.get_field(tag, In::PRIMARY).map(|f| &f.value);

    let coordinate = resolve_coordinate(
        field(Tag::GPSLatitude)?,
        field(Tag::GPSLatitudeRef)?,
        field(Tag::GPSLongitude)?,
        field(Tag::GPSLongitudeRef)?,
    );
    if coordinate.is_none() {
        tracing::debug!("GPS tags present but malformed, ignoring");
    }
    coordinate
}

/// Combines DMS values and hemisphere references into a signed coordinate.
///
/// Returns `None` if any part is malformed or the result is out of range.
fn resolve_coordinate(
    latitude: &Value,
    latitude_ref: &Value,
    longitude: &Value,
    longitude_ref: &Value,
) -> Option<Coordinate> {
    let latitude = match hemisphere(latitude_ref)? {
        'N' => parse_dms(latitude)?,
        'S' => -parse_dms(latitude)?,
        _ => return None,
    };
    let longitude = match hemisphere(longitude_ref)? {
        'E' => parse_dms(longitude)?,
        'W' => -parse_dms(longitude)?,
        _ => return None,
    };
    Coordinate::new(latitude, longitude).ok()
}

/// Parses degrees, minutes, seconds rationals into decimal degrees.
fn parse_dms(value: &Value) -> Option<f64> {
    match value {
        Value::Rational(rationals) if rationals.len() >= 3 => {
            let degrees = rationals[0].to_f64();
            let minutes = rationals[1].to_f64();
            let seconds = rationals[2].to_f64();
            let decimal = degrees + minutes / 60.0 + seconds / 3600.0;
            decimal.is_finite().then_some(decimal)
        }
        _ => None,
    }
}

/// Returns the uppercased first character of an ASCII reference tag.
fn hemisphere(value: &Value) -> Option<char> {
    let text = first_ascii(value)?;
    text.trim().chars().next().map(|c| c.to_ascii_uppercase())
}

fn first_ascii(value: &Value) -> Option<&str> {
    match value {
        Value::Ascii(strings) => strings
            .first()
            .and_then(|bytes| std::str::from_utf8(bytes).ok()),
        _ => None,
    }
}

/// Prefers the GPS timestamp (UTC), then the camera's original and
/// modification times (camera-local).
fn capture_time(exif: &Exif) -> Option<CaptureTime> {
    let field = |tag| exif.get_field(tag, In::PRIMARY).map(|f| &f.value);

    if let (Some(date), Some(time)) = (field(Tag::GPSDateStamp), field(Tag::GPSTimeStamp)) {
        if let Some(dt) = gps_timestamp(date, time) {
            return Some(CaptureTime::gps_utc(dt));
        }
    }

    [Tag::DateTimeOriginal, Tag::DateTime]
        .into_iter()
        .filter_map(field)
        .find_map(exif_datetime)
        .map(CaptureTime::camera_local)
}

fn gps_timestamp(date: &Value, time: &Value) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(first_ascii(date)?.trim(), GPS_DATE_FORMAT).ok()?;
    let Value::Rational(hms) = time else {
        return None;
    };
    if hms.len() < 3 {
        return None;
    }
    let part = |i: usize| {
        let v = hms[i].to_f64();
        (v.is_finite() && v >= 0.0).then_some(v)
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let time = NaiveTime::from_hms_opt(
        part(0)? as u32,
        part(1)? as u32,
        part(2)?.floor() as u32,
    )?;
    Some(date.and_time(time))
}

fn exif_datetime(value: &Value) -> Option<NaiveDateTime> {
    let text = first_ascii(value)?;
    NaiveDateTime::parse_from_str(text.trim(), EXIF_DATETIME_FORMAT).ok()
}
