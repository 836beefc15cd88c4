//! Chronofold - leakage-free validation for monthly sales data
//!
//! This crate provides the pieces of a time series regression workflow that
//! must never look into the future:
//! - Dense time index over sortable period labels
//! - Rolling time-based train/test splits
//! - Grouped lag features aligned strictly to earlier periods
//! - Parallel cross-validation of a caller-supplied regressor
//!
//! # Modules
//!
//! ## Core
//! - [`timeseries`] - Time index, splitter, lag features and feature pipeline
//! - [`training`] - Regressor contract, scorers and the scored evaluator
//!
//! ## Data Processing
//! - [`preprocessing`] - Cleaning, monthly aggregation and dummy encoding
//! - [`utils`] - Typed column access and CSV input/output
//!
//! ## Services
//! - [`config`] - JSON run configuration
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core modules
pub mod timeseries;
pub mod training;

// Data processing
pub mod preprocessing;
pub mod utils;

// Services
pub mod config;
pub mod cli;

pub use error::{ChronofoldError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{ChronofoldError, Result};

    // Configuration
    pub use crate::config::ChronofoldConfig;

    // Time series
    pub use crate::timeseries::{
        FeatureMatrix, FeaturePipeline, FeaturePipelineConfig, Fold, LagFeatureBuilder,
        LagFeatureSpec, LagStatistic, SplitConfig, SplitPlan, SplitProvider, TimeBasedSplitter,
        TimeIndex, TimeIndexer,
    };

    // Evaluation
    pub use crate::training::{
        default_metrics, CrossValidationExecutor, EvaluatorConfig, MetricSpec, ParallelExecutor,
        Regressor, ScoredEvaluator, Scorer,
    };

    // Preprocessing
    pub use crate::preprocessing::{DummyEncoder, SalesPreprocessingConfig, SalesPreprocessor};

    // Utilities
    pub use crate::utils::{DataLoader, DataSaver};
}
