//! Regression scorers
//!
//! Every scorer follows the "greater is better" convention: loss metrics are
//! reported negated, so `-12.5` for a mean absolute error of 12.5.

use crate::error::{ChronofoldError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Scoring function applied to each test fold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scorer {
    NegMeanAbsoluteError,
    NegMeanSquaredError,
    NegRootMeanSquaredError,
    R2,
}

impl Scorer {
    /// Conventional scorer name, e.g. `neg_mean_absolute_error`
    pub fn name(&self) -> &'static str {
        match self {
            Scorer::NegMeanAbsoluteError => "neg_mean_absolute_error",
            Scorer::NegMeanSquaredError => "neg_mean_squared_error",
            Scorer::NegRootMeanSquaredError => "neg_root_mean_squared_error",
            Scorer::R2 => "r2",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "neg_mean_absolute_error" => Ok(Scorer::NegMeanAbsoluteError),
            "neg_mean_squared_error" => Ok(Scorer::NegMeanSquaredError),
            "neg_root_mean_squared_error" => Ok(Scorer::NegRootMeanSquaredError),
            "r2" => Ok(Scorer::R2),
            other => Err(ChronofoldError::ConfigError(format!(
                "unknown scorer '{}'",
                other
            ))),
        }
    }

    /// Score predictions against the truth
    pub fn score(&self, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
        if y_true.len() != y_pred.len() {
            return Err(ChronofoldError::ShapeError {
                expected: format!("{} predictions", y_true.len()),
                actual: y_pred.len().to_string(),
            });
        }
        if y_true.is_empty() {
            return Err(ChronofoldError::ValidationError(
                "cannot score an empty fold".to_string(),
            ));
        }

        let n = y_true.len() as f64;
        let errors = y_true - y_pred;
        let mse = errors.mapv(|e| e * e).sum() / n;

        let score = match self {
            Scorer::NegMeanAbsoluteError => -(errors.mapv(f64::abs).sum() / n),
            Scorer::NegMeanSquaredError => -mse,
            Scorer::NegRootMeanSquaredError => -mse.sqrt(),
            Scorer::R2 => {
                let y_mean = y_true.sum() / n;
                let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
                let ss_res = mse * n;
                if ss_tot > 0.0 {
                    1.0 - ss_res / ss_tot
                } else if ss_res == 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        };

        Ok(score)
    }
}

/// A requested metric: the reporting name and the scorer behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub name: String,
    pub scorer: Scorer,
}

impl MetricSpec {
    pub fn new(name: impl Into<String>, scorer: Scorer) -> Self {
        Self {
            name: name.into(),
            scorer,
        }
    }
}

/// `MAE`, `RMSE` and `R2`
pub fn default_metrics() -> Vec<MetricSpec> {
    vec![
        MetricSpec::new("MAE", Scorer::NegMeanAbsoluteError),
        MetricSpec::new("RMSE", Scorer::NegRootMeanSquaredError),
        MetricSpec::new("R2", Scorer::R2),
    ]
}
