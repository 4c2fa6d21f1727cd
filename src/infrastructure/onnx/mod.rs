// SPDX-License-Identifier: MPL-2.0
//! ONNX Runtime adapter implementing the [`PredictionBackend`] port trait.
//!
//! - [`OnnxGeocellBackend`]: classifier over geographic cells
//! - [`CellTable`]: the cell centers the classifier's outputs refer to
//!
//! [`PredictionBackend`]: crate::application::port::PredictionBackend

pub mod cells;
mod geocell;

pub use cells::{CellTable, CellTableError, GeoCell};
pub use geocell::OnnxGeocellBackend;
