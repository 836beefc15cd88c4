//! Grouped lag features
//!
//! A lag-`k` feature of row `r` at time `t` summarizes the rows of the same
//! group observed at `t - k`. Aggregates are keyed on `(group, t + k)` and
//! joined back on `(group, t)`, so a row only ever sees strictly earlier
//! periods.

use crate::error::{ChronofoldError, Result};
use crate::utils::columns::{key_values, numeric_values, require_columns, time_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Statistic computed over the lagged group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LagStatistic {
    Mean,
    Sum,
}

impl LagStatistic {
    /// Every statistic, in output column order
    pub const ALL: [LagStatistic; 2] = [LagStatistic::Mean, LagStatistic::Sum];

    pub fn as_str(&self) -> &'static str {
        match self {
            LagStatistic::Mean => "MEAN",
            LagStatistic::Sum => "SUM",
        }
    }
}

impl fmt::Display for LagStatistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured key of a lag feature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LagFeatureSpec {
    /// Column whose values define the groups
    pub group_key: String,
    /// Numeric column being summarized
    pub value_column: String,
    /// Number of periods to look back, at least 1
    pub lag: usize,
}

impl LagFeatureSpec {
    pub fn new(group_key: impl Into<String>, value_column: impl Into<String>, lag: usize) -> Self {
        Self {
            group_key: group_key.into(),
            value_column: value_column.into(),
            lag,
        }
    }

    /// Output column name, e.g. `GB_CONTRAGENT_PREV_MEAN_SALES_1`
    pub fn column_name(&self, stat: LagStatistic) -> String {
        format!(
            "GB_{}_PREV_{}_{}_{}",
            self.group_key, stat, self.value_column, self.lag
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Computes lag features against a fixed time-index column
#[derive(Debug, Clone)]
pub struct LagFeatureBuilder {
    time_column: String,
}

impl LagFeatureBuilder {
    pub fn new(time_column: impl Into<String>) -> Self {
        Self {
            time_column: time_column.into(),
        }
    }

    pub fn time_column(&self) -> &str {
        &self.time_column
    }

    /// Return a copy of `df` with the mean and sum columns of `spec` appended.
    ///
    /// Row count and row order are preserved. Rows whose group has no
    /// observation `spec.lag` periods earlier get 0 for both statistics.
    pub fn apply(&self, df: &DataFrame, spec: &LagFeatureSpec) -> Result<DataFrame> {
        if spec.lag == 0 {
            return Err(ChronofoldError::ConfigError(format!(
                "lag for '{}' must be at least 1",
                spec.column_name(LagStatistic::Mean)
            )));
        }
        let lag = i64::try_from(spec.lag)
            .map_err(|_| ChronofoldError::ConfigError(format!("lag {} is too large", spec.lag)))?;

        require_columns(
            df,
            &[
                spec.group_key.as_str(),
                spec.value_column.as_str(),
                self.time_column.as_str(),
            ],
        )?;

        let keys = key_values(df, &spec.group_key)?;
        let times = time_values(df, &self.time_column)?;
        let values = numeric_values(df, &spec.value_column)?;

        // Keyed on the period the observation becomes visible to
        let mut aggregates: HashMap<(&str, i64), Accumulator> = HashMap::new();
        for ((key, &t), value) in keys.iter().zip(&times).zip(&values) {
            let (Some(key), Some(value)) = (key, value) else {
                continue;
            };
            let shifted = t.checked_add(lag).ok_or_else(|| {
                ChronofoldError::DataError(format!("time index {} overflows when shifted", t))
            })?;
            let acc = aggregates.entry((key.as_str(), shifted)).or_default();
            acc.sum += value;
            acc.count += 1;
        }

        let n_rows = df.height();
        let mut means = Vec::with_capacity(n_rows);
        let mut sums = Vec::with_capacity(n_rows);
        let mut matched = 0usize;

        for (key, &t) in keys.iter().zip(&times) {
            let hit = key
                .as_deref()
                .and_then(|k| aggregates.get(&(k, t)));
            match hit {
                Some(acc) => {
                    matched += 1;
                    means.push(acc.mean());
                    sums.push(acc.sum);
                }
                None => {
                    means.push(0.0);
                    sums.push(0.0);
                }
            }
        }

        debug!(
            group_key = %spec.group_key,
            value_column = %spec.value_column,
            lag = spec.lag,
            n_groups = aggregates.len(),
            matched,
            "Applied lag feature"
        );

        let mut out = df.clone();
        out.with_column(Series::new(
            spec.column_name(LagStatistic::Mean).into(),
            means,
        ))?;
        out.with_column(Series::new(
            spec.column_name(LagStatistic::Sum).into(),
            sums,
        ))?;
        Ok(out)
    }
}
