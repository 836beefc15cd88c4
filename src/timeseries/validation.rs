//! Time-based cross-validation
//!
//! Folds are defined on the dense time axis, not on row positions: a window of
//! `train_period` distinct periods is followed by a window of `test_period`
//! distinct periods, and both windows roll forward by `test_period`.

use crate::error::{ChronofoldError, Result};
use crate::utils::columns::time_values;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Configuration for the time-based splitter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Number of distinct periods in each training window
    pub train_period: usize,
    /// Number of distinct periods in each test window, also the step size
    pub test_period: usize,
    /// Column holding the dense time index
    pub split_column: String,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_period: 4,
            test_period: 1,
            split_column: "YEAR_MONTH".to_string(),
        }
    }
}

impl SplitConfig {
    pub fn new(train_period: usize, test_period: usize) -> Self {
        Self {
            train_period,
            test_period,
            ..Default::default()
        }
    }

    /// Builder method to set the time-index column
    pub fn with_split_column(mut self, column: impl Into<String>) -> Self {
        self.split_column = column.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.train_period == 0 {
            return Err(ChronofoldError::ConfigError(
                "train_period must be at least 1".to_string(),
            ));
        }
        if self.test_period == 0 {
            return Err(ChronofoldError::ConfigError(
                "test_period must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Cursor positions of one fold on the dense axis. Ranges are half open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldWindow {
    pub train_start: usize,
    pub train_stop: usize,
    pub test_start: usize,
    pub test_stop: usize,
}

/// One train/test partition of the dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fold {
    /// Fold number, starting at 0
    pub fold: usize,
    /// Row positions of the training set
    pub train_indices: Vec<usize>,
    /// Row positions of the test set
    pub test_indices: Vec<usize>,
    /// Time index values covered by the training window
    pub train_periods: Vec<i64>,
    /// Time index values covered by the test window
    pub test_periods: Vec<i64>,
}

/// Anything that can hand train/test row positions to a cross-validation
/// executor.
pub trait SplitProvider {
    fn folds(&self) -> &[Fold];

    fn n_splits(&self) -> usize {
        self.folds().len()
    }
}

/// Ordered sequence of folds produced by [`TimeBasedSplitter::split`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitPlan {
    folds: Vec<Fold>,
}

impl SplitPlan {
    pub fn new(folds: Vec<Fold>) -> Self {
        Self { folds }
    }

    pub fn len(&self) -> usize {
        self.folds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folds.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fold> {
        self.folds.iter()
    }

    /// Plain `(train, test)` pairs
    pub fn to_pairs(&self) -> Vec<(Vec<usize>, Vec<usize>)> {
        self.folds
            .iter()
            .map(|f| (f.train_indices.clone(), f.test_indices.clone()))
            .collect()
    }
}

impl SplitProvider for SplitPlan {
    fn folds(&self) -> &[Fold] {
        &self.folds
    }
}

impl<'a> IntoIterator for &'a SplitPlan {
    type Item = &'a Fold;
    type IntoIter = std::slice::Iter<'a, Fold>;

    fn into_iter(self) -> Self::IntoIter {
        self.folds.iter()
    }
}

/// Rolling-window splitter over a dense time axis
#[derive(Debug, Clone)]
pub struct TimeBasedSplitter {
    config: SplitConfig,
    n_splits: Option<usize>,
}

impl TimeBasedSplitter {
    /// Create a splitter. Both periods must be positive.
    pub fn new(train_period: usize, test_period: usize) -> Result<Self> {
        Self::from_config(SplitConfig::new(train_period, test_period))
    }

    pub fn from_config(config: SplitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            n_splits: None,
        })
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Number of folds produced by the most recent [`split`](Self::split).
    pub fn fold_count(&self) -> Result<usize> {
        self.n_splits
            .ok_or_else(|| ChronofoldError::StateError("not yet split".to_string()))
    }

    /// Cursor positions of every fold for an axis of `axis_len` periods.
    ///
    /// Yields `floor((L - p - q) / q) + 1` windows when `L > p + q` and none
    /// otherwise. The last test window may end exactly at the end of the axis.
    pub fn windows(&self, axis_len: usize) -> Vec<FoldWindow> {
        let p = self.config.train_period;
        let q = self.config.test_period;
        let mut windows = Vec::new();

        if axis_len <= p + q {
            return windows;
        }

        let mut train_start = 0;
        loop {
            let train_stop = train_start + p;
            let test_start = train_stop;
            let test_stop = test_start + q;
            if test_stop > axis_len {
                break;
            }
            windows.push(FoldWindow {
                train_start,
                train_stop,
                test_start,
                test_stop,
            });
            train_start += q;
        }

        windows
    }

    /// Partition the rows of `df` by the values of `time_column`.
    pub fn split(&mut self, df: &DataFrame, time_column: &str) -> Result<SplitPlan> {
        let times = time_values(df, time_column)?;
        let plan = self.split_times(&times);
        self.n_splits = Some(plan.len());
        Ok(plan)
    }

    /// Partition row positions given each row's time index.
    pub fn split_times(&self, times: &[i64]) -> SplitPlan {
        let axis: Vec<i64> = times
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let position: HashMap<i64, usize> =
            axis.iter().enumerate().map(|(pos, &t)| (t, pos)).collect();
        let row_positions: Vec<usize> = times.iter().map(|t| position[t]).collect();

        let rows_in = |start: usize, stop: usize| -> Vec<usize> {
            row_positions
                .iter()
                .enumerate()
                .filter(|(_, &pos)| pos >= start && pos < stop)
                .map(|(row, _)| row)
                .collect()
        };

        let folds: Vec<Fold> = self
            .windows(axis.len())
            .into_iter()
            .enumerate()
            .map(|(fold, w)| {
                let fold = Fold {
                    fold,
                    train_indices: rows_in(w.train_start, w.train_stop),
                    test_indices: rows_in(w.test_start, w.test_stop),
                    train_periods: axis[w.train_start..w.train_stop].to_vec(),
                    test_periods: axis[w.test_start..w.test_stop].to_vec(),
                };
                debug!(
                    fold = fold.fold,
                    train_periods = ?fold.train_periods,
                    test_periods = ?fold.test_periods,
                    train_records = fold.train_indices.len(),
                    test_records = fold.test_indices.len(),
                    "Fold"
                );
                fold
            })
            .collect();

        info!(
            axis_len = axis.len(),
            train_period = self.config.train_period,
            test_period = self.config.test_period,
            n_folds = folds.len(),
            "Built time-based split plan"
        );

        SplitPlan::new(folds)
    }
}
