// SPDX-License-Identifier: MPL-2.0
//! `geolens` predicts where a photograph was taken and scores the prediction
//! against the GPS position embedded in the photograph's own metadata.
//!
//! The pipeline for one image is: preprocess the decoded pixels into a
//! feature tensor, ask a [`PredictionBackend`] for ranked candidate
//! locations, read the ground truth from EXIF, then measure the great-circle
//! distance between the best candidate and the ground truth and bucket it
//! into an [`AccuracyClass`].
//!
//! [`PredictionBackend`]: application::port::PredictionBackend
//! [`AccuracyClass`]: domain::evaluation::AccuracyClass

#![doc(html_root_url = "https://docs.rs/geolens/0.1.0")]

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod media;

#[cfg(test)]
pub(crate) mod test_utils;
