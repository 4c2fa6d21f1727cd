// SPDX-License-Identifier: MPL-2.0
//! Evaluation use cases.
//!
//! - [`orchestrator`]: one image through preprocessing, prediction and scoring
//! - [`batch`]: many images concurrently on a bounded worker pool

pub mod batch;
pub mod orchestrator;

pub use batch::{is_cancelled, BatchEvaluator, BatchReport, CancellationToken};
pub use orchestrator::{EvaluationOrchestrator, ImageJob};
