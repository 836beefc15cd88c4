//! Model evaluation module
//!
//! The crate does not train models itself. It provides:
//! - The [`Regressor`] contract a caller's model implements
//! - Regression scorers in "greater is better" form
//! - A parallel cross-validation executor driven by a split provider
//! - [`ScoredEvaluator`], which averages fold scores per metric

pub mod cross_validation;
mod evaluator;
mod models;
pub mod scoring;

pub use cross_validation::{CrossValidationExecutor, CrossValidationReport, ParallelExecutor};
pub use evaluator::{EvaluatorConfig, ScoredEvaluator};
pub use models::Regressor;
pub use scoring::{default_metrics, MetricSpec, Scorer};
