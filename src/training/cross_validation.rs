//! Cross-validation executors
//!
//! An executor receives a split provider, fits one clone of the model per
//! fold and reports raw per-fold scores. It knows nothing about how the
//! folds were built.

use super::models::Regressor;
use super::scoring::MetricSpec;
use crate::error::{ChronofoldError, Result};
use crate::timeseries::{Fold, SplitProvider};
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::debug;

/// Raw results of a cross-validation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationReport {
    /// Per-fold scores keyed by metric name, in fold order
    pub test_scores: BTreeMap<String, Vec<f64>>,
    /// Fit time of each fold in seconds
    pub fit_times_secs: Vec<f64>,
    /// Number of folds evaluated
    pub n_folds: usize,
}

impl CrossValidationReport {
    pub fn scores(&self, metric: &str) -> Option<&[f64]> {
        self.test_scores.get(metric).map(Vec::as_slice)
    }
}

/// Runs fold fit/predict for an evaluator
pub trait CrossValidationExecutor {
    fn cross_validate<M: Regressor>(
        &self,
        model: &M,
        features: &Array2<f64>,
        target: &Array1<f64>,
        splits: &dyn SplitProvider,
        metrics: &[MetricSpec],
    ) -> Result<CrossValidationReport>;
}

/// Evaluates folds concurrently on a rayon pool
#[derive(Debug, Clone, Default)]
pub struct ParallelExecutor {
    /// Worker threads, `None` uses the global pool
    n_jobs: Option<usize>,
}

struct FoldOutcome {
    scores: Vec<f64>,
    fit_time_secs: f64,
}

impl ParallelExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads
    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = Some(n_jobs.max(1));
        self
    }

    fn check_fold(fold: &Fold, n_rows: usize) -> Result<()> {
        if fold.train_indices.is_empty() || fold.test_indices.is_empty() {
            return Err(ChronofoldError::ValidationError(format!(
                "fold {} has an empty train or test set",
                fold.fold
            )));
        }
        let out_of_range = fold
            .train_indices
            .iter()
            .chain(&fold.test_indices)
            .find(|&&row| row >= n_rows);
        if let Some(row) = out_of_range {
            return Err(ChronofoldError::ShapeError {
                expected: format!("row index below {}", n_rows),
                actual: row.to_string(),
            });
        }
        Ok(())
    }

    fn run_fold<M: Regressor>(
        model: &M,
        features: &Array2<f64>,
        target: &Array1<f64>,
        fold: &Fold,
        metrics: &[MetricSpec],
    ) -> Result<FoldOutcome> {
        let x_train = features.select(Axis(0), &fold.train_indices);
        let y_train = target.select(Axis(0), &fold.train_indices);
        let x_test = features.select(Axis(0), &fold.test_indices);
        let y_test = target.select(Axis(0), &fold.test_indices);

        let mut fold_model = model.clone();
        let start = Instant::now();
        fold_model.fit(&x_train, &y_train)?;
        let fit_time_secs = start.elapsed().as_secs_f64();

        let y_pred = fold_model.predict(&x_test)?;
        let scores = metrics
            .iter()
            .map(|m| m.scorer.score(&y_test, &y_pred))
            .collect::<Result<Vec<f64>>>()?;

        debug!(
            fold = fold.fold,
            train_records = fold.train_indices.len(),
            test_records = fold.test_indices.len(),
            fit_time_secs,
            "Evaluated fold"
        );

        Ok(FoldOutcome {
            scores,
            fit_time_secs,
        })
    }

    fn run_all<M: Regressor>(
        model: &M,
        features: &Array2<f64>,
        target: &Array1<f64>,
        folds: &[Fold],
        metrics: &[MetricSpec],
    ) -> Result<Vec<FoldOutcome>> {
        folds
            .par_iter()
            .map(|fold| Self::run_fold(model, features, target, fold, metrics))
            .collect()
    }
}

impl CrossValidationExecutor for ParallelExecutor {
    fn cross_validate<M: Regressor>(
        &self,
        model: &M,
        features: &Array2<f64>,
        target: &Array1<f64>,
        splits: &dyn SplitProvider,
        metrics: &[MetricSpec],
    ) -> Result<CrossValidationReport> {
        if features.nrows() != target.len() {
            return Err(ChronofoldError::ShapeError {
                expected: format!("{} target values", features.nrows()),
                actual: target.len().to_string(),
            });
        }

        let folds = splits.folds();
        for fold in folds {
            Self::check_fold(fold, features.nrows())?;
        }

        let outcomes = match self.n_jobs {
            Some(n) => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ChronofoldError::ConfigError(e.to_string()))?
                .install(|| Self::run_all(model, features, target, folds, metrics))?,
            None => Self::run_all(model, features, target, folds, metrics)?,
        };

        let mut report = CrossValidationReport {
            n_folds: outcomes.len(),
            ..Default::default()
        };
        for (i, metric) in metrics.iter().enumerate() {
            let scores = outcomes.iter().map(|o| o.scores[i]).collect();
            report.test_scores.insert(metric.name.clone(), scores);
        }
        report.fit_times_secs = outcomes.iter().map(|o| o.fit_time_secs).collect();

        Ok(report)
    }
}
