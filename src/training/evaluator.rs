//! Scored evaluation over time-based folds

use super::cross_validation::{CrossValidationExecutor, ParallelExecutor};
use super::models::Regressor;
use super::scoring::MetricSpec;
use crate::error::{ChronofoldError, Result};
use crate::timeseries::SplitProvider;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::info;

/// Configuration for the evaluator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Metric reported as-is. Every other metric is a negated loss and gets
    /// its sign flipped back.
    pub higher_is_better: String,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            higher_is_better: "R2".to_string(),
        }
    }
}

/// Feeds a split plan to an executor and averages the per-fold scores
#[derive(Debug, Clone)]
pub struct ScoredEvaluator<E = ParallelExecutor> {
    executor: E,
    config: EvaluatorConfig,
}

impl ScoredEvaluator<ParallelExecutor> {
    pub fn new() -> Self {
        Self::with_executor(ParallelExecutor::new())
    }
}

impl Default for ScoredEvaluator<ParallelExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CrossValidationExecutor> ScoredEvaluator<E> {
    pub fn with_executor(executor: E) -> Self {
        Self {
            executor,
            config: EvaluatorConfig::default(),
        }
    }

    /// Builder method to set the configuration
    pub fn with_config(mut self, config: EvaluatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Mean score of each metric across the folds of `split_plan`.
    ///
    /// Loss metrics come back as positive error magnitudes, the
    /// higher-is-better metric unchanged.
    pub fn evaluate<M: Regressor>(
        &self,
        model: &M,
        features: &Array2<f64>,
        target: &Array1<f64>,
        split_plan: &dyn SplitProvider,
        metrics: &[MetricSpec],
    ) -> Result<BTreeMap<String, f64>> {
        let n_folds = split_plan.n_splits();
        if n_folds == 0 {
            return Err(ChronofoldError::ValidationError(
                "split plan has no folds to evaluate".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = metrics.iter().find(|m| !seen.insert(m.name.as_str())) {
            return Err(ChronofoldError::ConfigError(format!(
                "metric '{}' requested twice",
                dup.name
            )));
        }

        let report = self
            .executor
            .cross_validate(model, features, target, split_plan, metrics)?;

        let mut results = BTreeMap::new();
        for metric in metrics {
            let scores = report.scores(&metric.name).ok_or_else(|| {
                ChronofoldError::ValidationError(format!(
                    "executor returned no scores for '{}'",
                    metric.name
                ))
            })?;
            if scores.len() != n_folds {
                return Err(ChronofoldError::ValidationError(format!(
                    "expected {} scores for '{}', got {}",
                    n_folds,
                    metric.name,
                    scores.len()
                )));
            }

            let mean = scores.iter().sum::<f64>() / n_folds as f64;
            let reported = if metric.name == self.config.higher_is_better {
                mean
            } else {
                -mean
            };
            results.insert(metric.name.clone(), reported);
        }

        info!(n_folds, scores = ?results, "Cross-validation finished");

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeseries::TimeBasedSplitter;
    use crate::training::cross_validation::CrossValidationReport;
    use crate::training::scoring::{default_metrics, Scorer};

    /// Returns canned scores without touching the model
    struct FixedExecutor {
        scores: BTreeMap<String, Vec<f64>>,
    }

    impl CrossValidationExecutor for FixedExecutor {
        fn cross_validate<M: Regressor>(
            &self,
            _model: &M,
            _features: &Array2<f64>,
            _target: &Array1<f64>,
            _splits: &dyn SplitProvider,
            _metrics: &[MetricSpec],
        ) -> Result<CrossValidationReport> {
            Ok(CrossValidationReport {
                test_scores: self.scores.clone(),
                fit_times_secs: vec![],
                n_folds: 2,
            })
        }
    }

    #[derive(Clone)]
    struct Unused;

    impl Regressor for Unused {
        fn fit(&mut self, _x: &Array2<f64>, _y: &Array1<f64>) -> Result<()> {
            Ok(())
        }

        fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
            Ok(Array1::zeros(x.nrows()))
        }
    }

    fn two_fold_plan() -> crate::timeseries::SplitPlan {
        TimeBasedSplitter::new(1, 1).unwrap().split_times(&[0, 1, 2])
    }

    #[test]
    fn test_losses_flipped_r2_kept() {
        let mut scores = BTreeMap::new();
        scores.insert("MAE".to_string(), vec![-2.0, -4.0]);
        scores.insert("RMSE".to_string(), vec![-3.0, -5.0]);
        scores.insert("R2".to_string(), vec![0.5, 0.7]);
        let evaluator = ScoredEvaluator::with_executor(FixedExecutor { scores });

        let x = Array2::zeros((4, 1));
        let y = Array1::zeros(4);
        let plan = two_fold_plan();
        assert_eq!(plan.len(), 2);

        let result = evaluator
            .evaluate(&Unused, &x, &y, &plan, &default_metrics())
            .unwrap();

        assert_eq!(result.len(), 3);
        assert!((result["MAE"] - 3.0).abs() < 1e-12);
        assert!((result["RMSE"] - 4.0).abs() < 1e-12);
        assert!((result["R2"] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_custom_higher_is_better() {
        let mut scores = BTreeMap::new();
        scores.insert("score".to_string(), vec![1.0, 3.0]);
        let evaluator = ScoredEvaluator::with_executor(FixedExecutor { scores }).with_config(
            EvaluatorConfig {
                higher_is_better: "score".to_string(),
            },
        );

        let result = evaluator
            .evaluate(
                &Unused,
                &Array2::zeros((4, 1)),
                &Array1::zeros(4),
                &two_fold_plan(),
                &[MetricSpec::new("score", Scorer::R2)],
            )
            .unwrap();
        assert_eq!(result["score"], 2.0);
    }

    #[test]
    fn test_empty_plan_rejected() {
        let evaluator = ScoredEvaluator::new();
        let plan = TimeBasedSplitter::new(4, 1).unwrap().split_times(&[0, 1]);
        let err = evaluator
            .evaluate(&Unused, &Array2::zeros((2, 1)), &Array1::zeros(2), &plan, &default_metrics())
            .unwrap_err();
        assert!(matches!(err, ChronofoldError::ValidationError(_)));
    }

    #[test]
    fn test_duplicate_metric_rejected() {
        let evaluator = ScoredEvaluator::new();
        let metrics = vec![
            MetricSpec::new("MAE", Scorer::NegMeanAbsoluteError),
            MetricSpec::new("MAE", Scorer::NegMeanSquaredError),
        ];
        let err = evaluator
            .evaluate(&Unused, &Array2::zeros((4, 1)), &Array1::zeros(4), &two_fold_plan(), &metrics)
            .unwrap_err();
        assert!(matches!(err, ChronofoldError::ConfigError(_)));
    }

    #[test]
    fn test_missing_metric_from_executor() {
        let evaluator = ScoredEvaluator::with_executor(FixedExecutor {
            scores: BTreeMap::new(),
        });
        let err = evaluator
            .evaluate(
                &Unused,
                &Array2::zeros((4, 1)),
                &Array1::zeros(4),
                &two_fold_plan(),
                &default_metrics(),
            )
            .unwrap_err();
        assert!(matches!(err, ChronofoldError::ValidationError(_)));
    }
}
