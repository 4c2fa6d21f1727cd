// SPDX-License-Identifier: MPL-2.0
//! Port definitions (traits) for dependency inversion.
//!
//! This module defines abstract interfaces that infrastructure adapters implement.
//! These traits use only domain types, so the evaluation pipeline never
//! depends on a concrete inference method.
//!
//! # Available Ports
//!
//! - [`prediction`]: Visual geolocation backends
//! - [`geocoding`]: Reverse geocoding of coordinates to place names (contract only)
//!
//! # Design Notes
//!
//! - Traits are `Send + Sync` so one instance can serve a concurrent batch
//! - Methods return `Result` with port-specific error types
//! - No `async fn`: a backend that talks to the network blocks inside `predict`

pub mod geocoding;
pub mod prediction;

// Re-export main types for convenience
pub use geocoding::{Address, GeocodingError, ReverseGeocoder};
pub use prediction::{BackendError, PredictionBackend};
