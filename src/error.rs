// SPDX-License-Identifier: MPL-2.0
use crate::application::port::BackendError;
use std::fmt;

/// Errors surfaced outside per-image evaluation: startup, configuration and
/// file access.
///
/// Failures inside one image's evaluation never become an `Error`; they are
/// recorded on that image's result instead.
#[derive(Debug, Clone)]
pub enum Error {
    Io(String),
    Config(String),
    Backend(BackendError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Backend(e) => write!(f, "Backend Error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<BackendError> for Error {
    fn from(err: BackendError) -> Self {
        Error::Backend(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
