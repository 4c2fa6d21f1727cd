// SPDX-License-Identifier: MPL-2.0
//! Application layer - Use cases and orchestration.
//!
//! This module contains the application layer of the Clean Architecture:
//!
//! - [`port`]: Trait definitions (interfaces) for dependency inversion
//! - [`evaluation`]: The per-image evaluation pipeline and its batch runner
//!
//! # Dependency Rule
//!
//! - Application layer depends on domain layer (uses domain types)
//! - Infrastructure layer implements application layer ports
//! - The binary wires a concrete backend into the orchestrator
//!
//! # Example
//!
//! ```ignore
//! use geolens::application::evaluation::EvaluationOrchestrator;
//! use geolens::domain::evaluation::DistanceEvaluator;
//! use geolens::infrastructure::heuristic::ColorRegionBackend;
//! use geolens::media::{ImagePreprocessor, PreprocessConfig};
//! use std::sync::Arc;
//!
//! let orchestrator = EvaluationOrchestrator::new(
//!     ImagePreprocessor::new(PreprocessConfig::default())?,
//!     Arc::new(ColorRegionBackend::default()),
//!     DistanceEvaluator::default(),
//! );
//! let result = orchestrator.evaluate("photo.jpg", &image, &metadata);
//! ```

pub mod evaluation;
pub mod port;
