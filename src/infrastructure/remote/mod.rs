// SPDX-License-Identifier: MPL-2.0
//! Hosted inference endpoint adapter implementing [`PredictionBackend`].
//!
//! # Wire format
//!
//! Request (`POST`, JSON):
//!
//! ```json
//! { "shape": [1, 3, 224, 224], "layout": "nchw", "data": [0.12, ...] }
//! ```
//!
//! Response:
//!
//! ```json
//! { "candidates": [ { "latitude": 48.85, "longitude": 2.35, "confidence": 0.7, "label": "Paris" } ] }
//! ```
//!
//! # Retry policy
//!
//! Connection failures, timeouts, `429` and `5xx` responses are retried with
//! exponential backoff. Any other failure, or running out of retries, is
//! [`BackendError::Unavailable`]. A response that does not decode is
//! [`BackendError::InvalidResponse`].
//!
//! [`PredictionBackend`]: crate::application::port::PredictionBackend

use crate::application::port::{BackendError, PredictionBackend};
use crate::config::defaults::{
    DEFAULT_REMOTE_BACKOFF_MS, DEFAULT_REMOTE_MAX_RETRIES, DEFAULT_REMOTE_TIMEOUT_SECS,
};
use crate::domain::evaluation::{rank_candidates, PredictionCandidate};
use crate::domain::geo::{Confidence, Coordinate};
use crate::domain::media::FeatureInput;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BACKEND_NAME: &str = "remote";

/// Connection and retry settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSettings {
    pub endpoint: String,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each further one.
    pub backoff: Duration,
    /// Bearer token.
    pub api_key: Option<String>,
}

impl RemoteSettings {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
            max_retries: DEFAULT_REMOTE_MAX_RETRIES,
            backoff: Duration::from_millis(DEFAULT_REMOTE_BACKOFF_MS),
            api_key: None,
        }
    }
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    shape: [usize; 4],
    layout: &'static str,
    data: &'a [f32],
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Deserialize)]
struct WireCandidate {
    latitude: f64,
    longitude: f64,
    confidence: f64,
    #[serde(default)]
    label: Option<String>,
}

/// Outcome of one HTTP attempt.
enum Attempt {
    Done(String),
    Transient(String),
    Fatal(String),
}

/// Prediction through a hosted endpoint.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: Client,
    settings: RemoteSettings,
}

impl RemoteBackend {
    /// Creates the backend.
    ///
    /// Must not be called from within an async context.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unavailable`] if the endpoint is not an
    /// `http(s)` URL or the HTTP client cannot be built.
    pub fn new(settings: RemoteSettings) -> Result<Self, BackendError> {
        let endpoint = settings.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(BackendError::unavailable(
                BACKEND_NAME,
                format!("endpoint must be an http(s) URL, got '{endpoint}'"),
            ));
        }

        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("geolens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::unavailable(BACKEND_NAME, e.to_string()))?;

        Ok(Self { client, settings })
    }

    fn attempt(&self, body: &[u8]) -> Attempt {
        let mut request = self
            .client
            .post(self.settings.endpoint.trim())
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec());
        if let Some(key) = &self.settings.api_key {
            request = request.bearer_auth(key);
        }

        let response = match request.send() {
            Ok(response) => response,
            Err(e) if is_transient_error(&e) => {
                return Attempt::Transient(e.to_string());
            }
            Err(e) => return Attempt::Fatal(e.to_string()),
        };

        let status = response.status();
        if status.is_success() {
            return match response.text() {
                Ok(text) => Attempt::Done(text),
                Err(e) => Attempt::Transient(format!("reading response: {e}")),
            };
        }
        if is_transient_status(status) {
            Attempt::Transient(format!("HTTP {status}"))
        } else {
            Attempt::Fatal(format!("HTTP {status}"))
        }
    }
}

impl PredictionBackend for RemoteBackend {
    fn predict(&self, input: &FeatureInput) -> Result<Vec<PredictionCandidate>, BackendError> {
        let data: Vec<f32> = input.tensor().iter().copied().collect();
        let request = PredictRequest {
            shape: input.shape(),
            layout: input.layout().as_str(),
            data: &data,
        };
        let body = serde_json::to_vec(&request)
            .map_err(|e| BackendError::InvalidResponse(format!("encoding request: {e}")))?;

        let mut attempt = 0;
        loop {
            match self.attempt(&body) {
                Attempt::Done(text) => return parse_response(&text),
                Attempt::Fatal(reason) => {
                    return Err(BackendError::unavailable(BACKEND_NAME, reason));
                }
                Attempt::Transient(reason) if attempt >= self.settings.max_retries => {
                    return Err(BackendError::unavailable(
                        BACKEND_NAME,
                        format!("{reason} (gave up after {} attempts)", attempt + 1),
                    ));
                }
                Attempt::Transient(reason) => {
                    let delay = backoff_delay(self.settings.backoff, attempt);
                    tracing::debug!(attempt, ?delay, "transient failure, retrying: {reason}");
                    std::thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        BACKEND_NAME
    }
}

/// Timeouts and failed connections may succeed on retry. Anything else,
/// such as an unbuildable request, fails the same way every time.
fn is_transient_error(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect()
}

/// `429 Too Many Requests` and server errors may succeed on retry.
fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Delay before retry number `attempt + 1`: `base * 2^attempt`.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}

/// Decodes a response body into ranked, validated candidates.
///
/// Candidates with an out-of-range coordinate or confidence are dropped.
fn parse_response(body: &str) -> Result<Vec<PredictionCandidate>, BackendError> {
    let response: PredictResponse = serde_json::from_str(body)
        .map_err(|e| BackendError::InvalidResponse(format!("decoding response: {e}")))?;

    let mut candidates = Vec::with_capacity(response.candidates.len());
    for wire in response.candidates {
        let Ok(coordinate) = Coordinate::new(wire.latitude, wire.longitude) else {
            tracing::warn!(
                latitude = wire.latitude,
                longitude = wire.longitude,
                "dropping candidate with out-of-range coordinate"
            );
            continue;
        };
        let Some(confidence) = Confidence::new(wire.confidence) else {
            tracing::warn!(
                confidence = wire.confidence,
                "dropping candidate with out-of-range confidence"
            );
            continue;
        };
        let candidate = PredictionCandidate::new(coordinate, confidence);
        candidates.push(match wire.label {
            Some(label) => candidate.with_label(label),
            None => candidate,
        });
    }

    rank_candidates(&mut candidates);
    Ok(candidates)
}
