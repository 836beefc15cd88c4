//! Model contract used by cross-validation

use crate::error::Result;
use ndarray::{Array1, Array2};

/// A regression model supplied by the caller.
///
/// Executors clone the model once per fold, so every fold trains on a fresh,
/// unfitted copy.
pub trait Regressor: Clone + Send + Sync {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Make predictions
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}
