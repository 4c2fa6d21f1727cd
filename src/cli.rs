// SPDX-License-Identifier: MPL-2.0
//! Command-line arguments and human-readable output for the `geolens` binary.

use crate::config::BackendKind;
use crate::domain::evaluation::{EvaluationResult, EvaluationStatus};
use crate::error::{Error, Result};
use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: geolens [OPTIONS] IMAGE...

Predicts where each IMAGE was taken and scores the guess against its GPS tags.

Options:
  --config FILE        Read settings from FILE instead of the config directory
  --backend KIND       Prediction backend: color, onnx or remote
  --workers N          Images evaluated concurrently
  --json               Print one JSON object per image
  --verbose            Debug logging (RUST_LOG overrides)
  -h, --help           Print this help
";

/// Parsed command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub backend: Option<BackendKind>,
    pub workers: Option<usize>,
    pub json: bool,
    pub verbose: bool,
    pub help: bool,
    pub images: Vec<PathBuf>,
}

impl CliArgs {
    /// Parses the process arguments.
    ///
    /// # Errors
    ///
    /// See [`CliArgs::parse_from`].
    pub fn from_env() -> Result<Self> {
        Self::parse(pico_args::Arguments::from_env())
    }

    /// Parses `args`, which must not include the program name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a malformed option value, an unknown
    /// flag, or when no image is given outside of `--help`.
    pub fn parse_from(args: Vec<OsString>) -> Result<Self> {
        Self::parse(pico_args::Arguments::from_vec(args))
    }

    fn parse(mut args: pico_args::Arguments) -> Result<Self> {
        let usage = |e: pico_args::Error| Error::Config(format!("invalid arguments: {e}"));

        let help = args.contains(["-h", "--help"]);
        let json = args.contains("--json");
        let verbose = args.contains("--verbose");
        let config: Option<PathBuf> = args.opt_value_from_str("--config").map_err(usage)?;
        let backend: Option<BackendKind> = args.opt_value_from_str("--backend").map_err(usage)?;
        let workers: Option<usize> = args.opt_value_from_str("--workers").map_err(usage)?;

        let mut images = Vec::new();
        for arg in args.finish() {
            if arg.to_str().is_some_and(|s| s.starts_with("--")) {
                return Err(Error::Config(format!(
                    "unknown option '{}'",
                    arg.to_string_lossy()
                )));
            }
            images.push(PathBuf::from(arg));
        }

        if workers == Some(0) {
            return Err(Error::Config("--workers must be at least 1".into()));
        }
        if images.is_empty() && !help {
            return Err(Error::Config("no input images".into()));
        }

        Ok(Self {
            config,
            backend,
            workers,
            json,
            verbose,
            help,
            images,
        })
    }
}

/// Formats a distance in meters below 1 km and kilometers above.
#[must_use]
pub fn format_distance(meters: f64) -> String {
    if meters < 1_000.0 {
        format!("{meters:.0} m")
    } else {
        format!("{:.1} km", meters / 1_000.0)
    }
}

/// One status line for `result`.
#[must_use]
pub fn render_line(result: &EvaluationResult) -> String {
    let mut line = format!("{}: {}", result.image_id(), result.status());

    match result.status() {
        EvaluationStatus::Complete => {
            if let (Some(meters), Some(class)) = (result.distance_m(), result.accuracy()) {
                let _ = write!(line, ", {} ({class})", format_distance(meters));
            }
        }
        EvaluationStatus::Incomplete => {
            let missing = match (result.prediction(), result.ground_truth()) {
                (None, None) => "no prediction, no GPS tags",
                (None, Some(_)) => "no prediction",
                _ => "no GPS tags",
            };
            let _ = write!(line, ", {missing}");
        }
        EvaluationStatus::PreprocessingFailed | EvaluationStatus::BackendFailed => {
            if let Some(failure) = result.failure() {
                let _ = write!(line, ", {failure}");
            }
        }
    }

    if let Some(prediction) = result.prediction() {
        let _ = write!(line, "\n  predicted {}", prediction.coordinate.format());
        if let Some(label) = &prediction.label {
            let _ = write!(line, " [{label}]");
        }
        let _ = write!(line, " ({:.0}%)", prediction.confidence.value() * 100.0);
    }
    if let Some(truth) = result.ground_truth() {
        let _ = write!(line, "\n  actual    {}", truth.coordinate().format());
        if let Some(at) = truth.captured_at() {
            let _ = write!(line, " at {at}");
        }
    }
    line
}

/// Closing line with counts per status.
#[must_use]
pub fn render_summary(results: &[EvaluationResult], skipped: usize) -> String {
    let count = |status| results.iter().filter(|r| r.status() == status).count();
    let mut summary = format!(
        "{} evaluated: {} complete, {} incomplete, {} preprocessing failed, {} backend failed",
        results.len(),
        count(EvaluationStatus::Complete),
        count(EvaluationStatus::Incomplete),
        count(EvaluationStatus::PreprocessingFailed),
        count(EvaluationStatus::BackendFailed),
    );
    if skipped > 0 {
        let _ = write!(summary, ", {skipped} skipped");
    }
    summary
}
