// SPDX-License-Identifier: MPL-2.0
//! This module handles the application's configuration: preprocessing
//! geometry, accuracy thresholds, backend selection and batch size, loaded
//! from a `settings.toml` file.
//!
//! Every section and key is optional. A missing file yields the defaults; a
//! file that does not parse or holds out-of-range values is an error, since
//! silently falling back would change how predictions are scored.
//!
//! # Examples
//!
//! ```no_run
//! use geolens::config::{self, BackendKind};
//!
//! let mut config = config::load()?;
//! config.backend.kind = BackendKind::Onnx;
//! config.batch.workers = 8;
//!
//! let path = std::env::temp_dir().join("geolens-settings.toml");
//! config::save_to_path(&config, &path)?;
//! let loaded = config::load_from_path(&path)?;
//! assert_eq!(loaded.batch.workers, 8);
//! # Ok::<(), geolens::error::Error>(())
//! ```

pub mod defaults;
pub mod paths;

use crate::domain::evaluation::AccuracyThresholds;
use crate::domain::media::{Normalization, TensorLayout};
use crate::error::{Error, Result};
use crate::media::{PreprocessConfig, ResampleFilter, ResizeMode};
use defaults::{
    DEFAULT_COLOR_MIN_CONFIDENCE, DEFAULT_COLOR_TEMPERATURE, DEFAULT_INPUT_SIZE,
    DEFAULT_ONNX_MIN_CONFIDENCE, DEFAULT_REMOTE_BACKOFF_MS, DEFAULT_REMOTE_MAX_RETRIES,
    DEFAULT_REMOTE_TIMEOUT_SECS, DEFAULT_TOP_K, DEFAULT_WORKERS, MAX_INPUT_SIZE,
    MAX_REMOTE_RETRIES, MAX_TOP_K, MIN_WORKERS,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_FILE: &str = "settings.toml";

// ==========================================================================
// Sections
// ==========================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub preprocess: PreprocessSection,
    pub thresholds: AccuracyThresholds,
    pub backend: BackendSection,
    pub batch: BatchSection,
}

/// `[preprocess]`: backend input geometry and value range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreprocessSection {
    pub width: u32,
    pub height: u32,
    pub resize: ResizeMode,
    pub filter: ResampleFilter,
    pub layout: TensorLayout,
    /// Per-channel mean; setting `mean` or `std` enables standardization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<[f32; 3]>,
}

impl Default for PreprocessSection {
    fn default() -> Self {
        Self {
            width: DEFAULT_INPUT_SIZE,
            height: DEFAULT_INPUT_SIZE,
            resize: ResizeMode::default(),
            filter: ResampleFilter::default(),
            layout: TensorLayout::default(),
            mean: None,
            std: None,
        }
    }
}

impl PreprocessSection {
    /// Returns the preprocessor configuration this section describes.
    ///
    /// A lone `mean` implies unit `std`; a lone `std` implies zero `mean`.
    #[must_use]
    pub fn to_preprocess_config(&self) -> PreprocessConfig {
        let normalization = match (self.mean, self.std) {
            (None, None) => None,
            (mean, std) => Some(Normalization {
                mean: mean.unwrap_or([0.0; 3]),
                std: std.unwrap_or([1.0; 3]),
            }),
        };
        PreprocessConfig {
            width: self.width,
            height: self.height,
            resize: self.resize,
            filter: self.filter,
            layout: self.layout,
            normalization,
        }
    }

    fn validate(&self) -> Result<()> {
        for (key, side) in [("width", self.width), ("height", self.height)] {
            if side == 0 || side > MAX_INPUT_SIZE {
                return Err(Error::Config(format!(
                    "preprocess.{key} must be between 1 and {MAX_INPUT_SIZE}, got {side}"
                )));
            }
        }
        if let Some(mean) = self.mean {
            if mean.iter().any(|v| !v.is_finite()) {
                return Err(Error::Config("preprocess.mean must be finite".to_string()));
            }
        }
        if let Some(std) = self.std {
            if std.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                return Err(Error::Config(
                    "preprocess.std values must be finite and positive".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Which prediction backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Average-color heuristic; needs no external resources.
    #[default]
    Color,
    /// Local geographic-cell classifier run with ONNX Runtime.
    Onnx,
    /// Hosted inference endpoint.
    Remote,
}

impl BackendKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Color => "color",
            BackendKind::Onnx => "onnx",
            BackendKind::Remote => "remote",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "color" => Ok(BackendKind::Color),
            "onnx" => Ok(BackendKind::Onnx),
            "remote" => Ok(BackendKind::Remote),
            other => Err(Error::Config(format!(
                "unknown backend '{other}' (expected color, onnx or remote)"
            ))),
        }
    }
}

/// `[backend]`: the selected backend and per-backend settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendSection {
    pub kind: BackendKind,
    pub color: ColorSection,
    pub onnx: OnnxSection,
    pub remote: RemoteSection,
}

/// `[backend.color]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorSection {
    pub min_confidence: f64,
    pub temperature: f64,
}

impl Default for ColorSection {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_COLOR_MIN_CONFIDENCE,
            temperature: DEFAULT_COLOR_TEMPERATURE,
        }
    }
}

/// `[backend.onnx]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OnnxSection {
    /// Defaults to `geocells.onnx` in the data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,
    /// Defaults to `geocells.toml` in the data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cells_path: Option<PathBuf>,
    pub top_k: usize,
    pub min_confidence: f64,
    /// BLAKE3 hex digest the model file must match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl Default for OnnxSection {
    fn default() -> Self {
        Self {
            model_path: None,
            cells_path: None,
            top_k: DEFAULT_TOP_K,
            min_confidence: DEFAULT_ONNX_MIN_CONFIDENCE,
            checksum: None,
        }
    }
}

/// `[backend.remote]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_ms: u64,
    /// Sent as a bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: DEFAULT_REMOTE_TIMEOUT_SECS,
            max_retries: DEFAULT_REMOTE_MAX_RETRIES,
            backoff_ms: DEFAULT_REMOTE_BACKOFF_MS,
            api_key: None,
        }
    }
}

/// `[batch]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchSection {
    pub workers: usize,
}

impl Default for BatchSection {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

impl Config {
    /// Checks value ranges that the TOML schema cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        self.preprocess.validate()?;

        let unit = |key: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(Error::Config(format!("{key} must be in [0, 1], got {v}")))
            }
        };
        unit("backend.color.min_confidence", self.backend.color.min_confidence)?;
        unit("backend.onnx.min_confidence", self.backend.onnx.min_confidence)?;

        let temperature = self.backend.color.temperature;
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(Error::Config(format!(
                "backend.color.temperature must be positive, got {temperature}"
            )));
        }

        let top_k = self.backend.onnx.top_k;
        if top_k == 0 || top_k > MAX_TOP_K {
            return Err(Error::Config(format!(
                "backend.onnx.top_k must be between 1 and {MAX_TOP_K}, got {top_k}"
            )));
        }

        let remote = &self.backend.remote;
        if remote.timeout_secs == 0 {
            return Err(Error::Config(
                "backend.remote.timeout_secs must be at least 1".to_string(),
            ));
        }
        if remote.max_retries > MAX_REMOTE_RETRIES {
            return Err(Error::Config(format!(
                "backend.remote.max_retries must be at most {MAX_REMOTE_RETRIES}, got {}",
                remote.max_retries
            )));
        }

        if self.batch.workers < MIN_WORKERS {
            return Err(Error::Config(format!(
                "batch.workers must be at least {MIN_WORKERS}"
            )));
        }
        Ok(())
    }
}

// ==========================================================================
// Loading and Saving
// ==========================================================================

/// Returns `settings.toml` inside the resolved config directory.
fn get_default_config_path() -> Option<PathBuf> {
    paths::get_app_config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Loads the configuration from the default location, or the defaults if
/// no file exists there.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or is invalid.
pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    tracing::debug!("no configuration file, using defaults");
    Ok(Config::default())
}

/// Loads and validates the configuration at `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, [`Error::Config`] if
/// it does not parse or fails validation.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Io(format!("{}: {e}", path.display())))?;
    let config: Config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
    config.validate()?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Writes `config` to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
