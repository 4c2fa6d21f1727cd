// SPDX-License-Identifier: MPL-2.0
//! Centralized path management for application directories.
//!
//! # Path Resolution Order
//!
//! 1. **Explicit override** - parameter to `_with_override()` functions
//!    (`--config` on the command line, tests)
//! 2. **Environment variables** (`GEOLENS_DATA_DIR`, `GEOLENS_CONFIG_DIR`)
//! 3. **Platform default** - via `dirs` crate

use super::defaults::{DEFAULT_CELLS_FILENAME, DEFAULT_MODEL_FILENAME};
use std::path::PathBuf;

/// Application name used for directory naming.
const APP_NAME: &str = "geolens";

/// Environment variable to override the data directory.
pub const ENV_DATA_DIR: &str = "GEOLENS_DATA_DIR";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "GEOLENS_CONFIG_DIR";

/// Returns the application data directory path (model files).
///
/// Returns `None` if the data directory cannot be determined.
pub fn get_app_data_dir() -> Option<PathBuf> {
    get_app_data_dir_with_override(None)
}

/// Returns the application data directory path with an optional override.
pub fn get_app_data_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    resolve(override_path, ENV_DATA_DIR, dirs::data_dir)
}

/// Returns the application config directory path (`settings.toml`).
///
/// Returns `None` if the config directory cannot be determined.
pub fn get_app_config_dir() -> Option<PathBuf> {
    get_app_config_dir_with_override(None)
}

/// Returns the application config directory path with an optional override.
pub fn get_app_config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    resolve(override_path, ENV_CONFIG_DIR, dirs::config_dir)
}

/// Default location of the ONNX model file.
pub fn default_model_path() -> Option<PathBuf> {
    get_app_data_dir().map(|dir| dir.join(DEFAULT_MODEL_FILENAME))
}

/// Default location of the geographic cell table.
pub fn default_cells_path() -> Option<PathBuf> {
    get_app_data_dir().map(|dir| dir.join(DEFAULT_CELLS_FILENAME))
}

fn resolve(
    override_path: Option<PathBuf>,
    env_var: &str,
    platform_dir: fn() -> Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path);
    }

    if let Ok(env_path) = std::env::var(env_var) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    platform_dir().map(|mut path| {
        path.push(APP_NAME);
        path
    })
}
