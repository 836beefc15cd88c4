//! Dense integer time axis built from sortable period labels

use crate::error::{ChronofoldError, Result};
use crate::utils::columns::key_values;
use polars::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use tracing::debug;

/// `YYYY_NN`: four digit year, underscore, zero padded two digit unit.
static PERIOD_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}_\d{2}$").expect("period label pattern is valid"));

/// Builds a [`TimeIndex`] from period labels.
///
/// Sentinel labels are always part of the axis, even when no row carries them.
/// They are used to anchor index 0 at a reference period before the data
/// starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeIndexer {
    sentinels: Vec<String>,
}

impl TimeIndexer {
    /// Create an indexer without sentinels
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sentinel label that must be part of the axis
    pub fn with_sentinel(mut self, label: impl Into<String>) -> Self {
        self.sentinels.push(label.into());
        self
    }

    /// Add several sentinel labels
    pub fn with_sentinels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sentinels.extend(labels.into_iter().map(Into::into));
        self
    }

    pub fn sentinels(&self) -> &[String] {
        &self.sentinels
    }

    /// Render a sortable label, e.g. `(2017, 7)` -> `2017_07`.
    pub fn format_label(year: i64, unit: u32) -> Result<String> {
        let label = format!("{}_{:02}", year, unit);
        Self::validate_label(&label)?;
        Ok(label)
    }

    /// Check that a label has the lexicographically sortable shape.
    pub fn validate_label(label: &str) -> Result<()> {
        if PERIOD_LABEL.is_match(label) {
            Ok(())
        } else {
            Err(ChronofoldError::FormatError(format!(
                "period label '{}' is not of the form YYYY_NN",
                label
            )))
        }
    }

    /// Build the index over the distinct labels plus the sentinels.
    pub fn build<I, S>(&self, periods: I) -> Result<TimeIndex>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut distinct: BTreeSet<String> = BTreeSet::new();
        let mut observed = 0usize;

        for period in periods {
            let label = period.as_ref();
            Self::validate_label(label)?;
            observed += 1;
            distinct.insert(label.to_string());
        }

        for sentinel in &self.sentinels {
            Self::validate_label(sentinel)?;
            distinct.insert(sentinel.clone());
        }

        let labels: Vec<String> = distinct.into_iter().collect();
        let positions = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i as i64))
            .collect();

        debug!(
            observed,
            n_periods = labels.len(),
            n_sentinels = self.sentinels.len(),
            "Built time index"
        );

        Ok(TimeIndex { positions, labels })
    }

    /// Build the index from a period-label column. Null labels are rejected.
    pub fn build_from_column(&self, df: &DataFrame, period_column: &str) -> Result<TimeIndex> {
        let labels = non_null_labels(df, period_column)?;
        self.build(labels)
    }
}

/// Injective, strictly monotonic mapping from period label to dense index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeIndex {
    positions: BTreeMap<String, i64>,
    labels: Vec<String>,
}

impl TimeIndex {
    pub fn index_of(&self, label: &str) -> Option<i64> {
        self.positions.get(label).copied()
    }

    pub fn label_of(&self, index: i64) -> Option<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }

    /// Labels in axis order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Return a copy of `df` with `index_column` holding the dense index of
    /// each row's `period_column` label. An existing `index_column` is
    /// replaced, so the two names may be equal.
    pub fn apply(&self, df: &DataFrame, period_column: &str, index_column: &str) -> Result<DataFrame> {
        let indices: Vec<i64> = non_null_labels(df, period_column)?
            .iter()
            .map(|label| {
                self.index_of(label).ok_or_else(|| {
                    ChronofoldError::DataError(format!(
                        "period label '{}' is not part of the time index",
                        label
                    ))
                })
            })
            .collect::<Result<_>>()?;

        let mut out = df.clone();
        out.with_column(Series::new(index_column.into(), indices))?;
        Ok(out)
    }
}

fn non_null_labels(df: &DataFrame, period_column: &str) -> Result<Vec<String>> {
    key_values(df, period_column)?
        .into_iter()
        .enumerate()
        .map(|(row, label)| {
            label.ok_or_else(|| {
                ChronofoldError::DataError(format!(
                    "period column '{}' has a null at row {}",
                    period_column, row
                ))
            })
        })
        .collect()
}
