// SPDX-License-Identifier: MPL-2.0
//! Infrastructure layer adapters.
//!
//! Concrete implementations of the [`PredictionBackend`] port.
//!
//! # Available Adapters
//!
//! - [`heuristic`]: average-color continental guess, no external files
//! - [`onnx`]: geographic-cell classifier via ONNX Runtime
//! - [`remote`]: hosted inference endpoint over HTTP
//!
//! [`PredictionBackend`]: crate::application::port::PredictionBackend

pub mod heuristic;
pub mod onnx;
pub mod remote;
mod scoring;

pub use heuristic::ColorRegionBackend;
pub use onnx::{CellTable, OnnxGeocellBackend};
pub use remote::{RemoteBackend, RemoteSettings};

use crate::application::port::PredictionBackend;
use crate::config::{paths, BackendKind, BackendSection};
use crate::error::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

/// Builds the backend selected by `section.kind`.
///
/// The ONNX model itself is only opened on first prediction; the cell table
/// is read here.
///
/// # Errors
///
/// Returns [`Error::Config`] if a required path or endpoint is missing or the
/// cell table cannot be loaded, and [`Error::Backend`] if the HTTP client
/// cannot be built.
pub fn build_backend(section: &BackendSection) -> Result<Arc<dyn PredictionBackend>> {
    let backend: Arc<dyn PredictionBackend> = match section.kind {
        BackendKind::Color => Arc::new(ColorRegionBackend::new(
            section.color.min_confidence,
            section.color.temperature,
        )),
        BackendKind::Onnx => {
            let onnx = &section.onnx;
            let model_path = onnx
                .model_path
                .clone()
                .or_else(paths::default_model_path)
                .ok_or_else(|| Error::Config("no model path and no data directory".into()))?;
            let cells_path = onnx
                .cells_path
                .clone()
                .or_else(paths::default_cells_path)
                .ok_or_else(|| Error::Config("no cells path and no data directory".into()))?;
            let cells = CellTable::load(&cells_path)
                .map_err(|e| Error::Config(format!("{}: {e}", cells_path.display())))?;

            let mut backend =
                OnnxGeocellBackend::new(model_path, cells, onnx.top_k, onnx.min_confidence);
            if let Some(checksum) = &onnx.checksum {
                backend = backend.with_checksum(checksum.clone());
            }
            Arc::new(backend)
        }
        BackendKind::Remote => {
            let remote = &section.remote;
            let endpoint = remote
                .endpoint
                .clone()
                .ok_or_else(|| Error::Config("[backend.remote] endpoint is required".into()))?;
            let settings = RemoteSettings {
                endpoint,
                timeout: Duration::from_secs(remote.timeout_secs),
                max_retries: remote.max_retries,
                backoff: Duration::from_millis(remote.backoff_ms),
                api_key: remote.api_key.clone(),
            };
            Arc::new(RemoteBackend::new(settings)?)
        }
    };

    tracing::debug!(backend = backend.name(), "prediction backend ready");
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_section_builds_color_backend() {
        let backend = build_backend(&BackendSection::default()).unwrap();
        assert_eq!(backend.name(), "color");
    }

    #[test]
    fn remote_without_endpoint_is_config_error() {
        let mut section = BackendSection::default();
        section.kind = BackendKind::Remote;
        assert!(matches!(build_backend(&section), Err(Error::Config(_))));
    }

    #[test]
    fn remote_with_bad_scheme_is_backend_error() {
        let mut section = BackendSection::default();
        section.kind = BackendKind::Remote;
        section.remote.endpoint = Some("localhost:8080".into());
        assert!(matches!(build_backend(&section), Err(Error::Backend(_))));
    }

    #[test]
    fn onnx_with_missing_cells_is_config_error() {
        let dir = tempdir().unwrap();
        let mut section = BackendSection::default();
        section.kind = BackendKind::Onnx;
        section.onnx.model_path = Some(dir.path().join("model.onnx"));
        section.onnx.cells_path = Some(dir.path().join("absent.toml"));

        let err = build_backend(&section).err().unwrap();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("absent.toml")));
    }

    #[test]
    fn onnx_builds_without_touching_the_model() {
        let dir = tempdir().unwrap();
        let cells = dir.path().join("cells.toml");
        std::fs::write(
            &cells,
            "[[cell]]\nlabel = \"Paris\"\nlatitude = 48.8566\nlongitude = 2.3522\n",
        )
        .unwrap();

        let mut section = BackendSection::default();
        section.kind = BackendKind::Onnx;
        section.onnx.model_path = Some(dir.path().join("not-yet.onnx"));
        section.onnx.cells_path = Some(cells);

        assert_eq!(build_backend(&section).unwrap().name(), "onnx");
    }
}
