//! Monthly sales preprocessing
//!
//! Turns raw per-article sales rows into the monthly, lag-featured dataset
//! the evaluator consumes:
//! 1. Cast sales to integers, fill the missing article group, drop rows
//!    without a contragent
//! 2. Give every article code a single canonical name
//! 3. Sum sales per year, month, contragent, article name and group
//! 4. Index the `YEAR_MONTH` period on a dense axis anchored by sentinels
//! 5. Build lag features, then drop excluded groups and warm-up rows
//! 6. Optionally dummy-encode categorical columns

use super::config::SalesPreprocessingConfig;
use super::encoder::DummyEncoder;
use crate::error::{ChronofoldError, Result};
use crate::timeseries::{FeatureMatrix, FeaturePipeline, TimeIndex, TimeIndexer};
use crate::utils::columns::{filter_rows, int_values, key_values, require_columns};
use polars::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

/// Column names of the raw sales schema
pub mod schema {
    pub const YEAR: &str = "YEAR";
    pub const MONTH: &str = "MONTH";
    pub const CONTRAGENT: &str = "CONTRAGENT";
    pub const ARTICLE_CODE: &str = "ARTICLE_CODE";
    pub const ARTICLE_NAME: &str = "ARTICLE_NAME";
    pub const ARTICLE_GROUP: &str = "ARTICLE_GROUP";
    pub const SALES: &str = "SALES";
    pub const STORE_SALES: &str = "STORE_SALES";

    /// Summed when rows are aggregated per month
    pub const VALUE_COLUMNS: [&str; 2] = [SALES, STORE_SALES];

    pub const REQUIRED: [&str; 8] = [
        YEAR,
        MONTH,
        CONTRAGENT,
        ARTICLE_CODE,
        ARTICLE_NAME,
        ARTICLE_GROUP,
        SALES,
        STORE_SALES,
    ];
}

type GroupKey = (i64, i64, String, String, String);

/// Cleans, aggregates and featurizes a raw sales table
#[derive(Debug, Clone)]
pub struct SalesPreprocessor {
    config: SalesPreprocessingConfig,
    pipeline: FeaturePipeline,
}

impl SalesPreprocessor {
    pub fn new(config: SalesPreprocessingConfig) -> Result<Self> {
        config.validate()?;
        let pipeline = FeaturePipeline::new(config.features.clone())?;
        Ok(Self { config, pipeline })
    }

    pub fn config(&self) -> &SalesPreprocessingConfig {
        &self.config
    }

    /// Name of the period column, shared with the feature pipeline
    pub fn period_column(&self) -> &str {
        &self.config.features.time_column
    }

    /// Clean the raw rows and sum them per month and article.
    ///
    /// Output columns are `YEAR, MONTH, CONTRAGENT, ARTICLE_NAME,
    /// ARTICLE_GROUP, SALES, STORE_SALES`, one row per group in sorted group
    /// order.
    pub fn aggregate(&self, df: &DataFrame) -> Result<DataFrame> {
        require_columns(df, &schema::REQUIRED)?;

        let years = int_values(df, schema::YEAR)?;
        let months = int_values(df, schema::MONTH)?;
        let contragents = key_values(df, schema::CONTRAGENT)?;
        let codes = key_values(df, schema::ARTICLE_CODE)?;
        let names = key_values(df, schema::ARTICLE_NAME)?;
        let groups: Vec<Option<String>> = key_values(df, schema::ARTICLE_GROUP)?
            .into_iter()
            .map(|g| g.or_else(|| self.config.article_group_fill.clone()))
            .collect();
        let values: Vec<Vec<i64>> = schema::VALUE_COLUMNS
            .iter()
            .map(|name| int_values(df, name))
            .collect::<Result<_>>()?;

        let kept: Vec<usize> = (0..df.height())
            .filter(|&row| contragents[row].is_some())
            .collect();

        // First name seen for each code among the kept rows
        let mut canonical: HashMap<&str, &str> = HashMap::new();
        for &row in &kept {
            if let (Some(code), Some(name)) = (&codes[row], &names[row]) {
                canonical.entry(code.as_str()).or_insert(name.as_str());
            }
        }

        let mut totals: BTreeMap<GroupKey, Vec<i64>> = BTreeMap::new();
        let mut incomplete = 0usize;
        for &row in &kept {
            let name = codes[row]
                .as_deref()
                .and_then(|code| canonical.get(code).copied());
            let (Some(contragent), Some(name), Some(group)) =
                (&contragents[row], name, &groups[row])
            else {
                incomplete += 1;
                continue;
            };

            let key = (
                years[row],
                months[row],
                contragent.clone(),
                name.to_string(),
                group.clone(),
            );
            let sums = totals
                .entry(key)
                .or_insert_with(|| vec![0; schema::VALUE_COLUMNS.len()]);
            for (sum, column) in sums.iter_mut().zip(&values) {
                *sum += column[row];
            }
        }

        debug!(
            rows_in = df.height(),
            dropped_no_contragent = df.height() - kept.len(),
            dropped_incomplete_key = incomplete,
            groups = totals.len(),
            "Aggregated monthly sales"
        );

        let n = totals.len();
        let mut year_col = Vec::with_capacity(n);
        let mut month_col = Vec::with_capacity(n);
        let mut contragent_col = Vec::with_capacity(n);
        let mut name_col = Vec::with_capacity(n);
        let mut group_col = Vec::with_capacity(n);
        let mut value_cols = vec![Vec::with_capacity(n); schema::VALUE_COLUMNS.len()];

        for ((year, month, contragent, name, group), sums) in totals {
            year_col.push(year);
            month_col.push(month);
            contragent_col.push(contragent);
            name_col.push(name);
            group_col.push(group);
            for (col, sum) in value_cols.iter_mut().zip(sums) {
                col.push(sum);
            }
        }

        let mut columns = vec![
            Column::new(schema::YEAR.into(), year_col),
            Column::new(schema::MONTH.into(), month_col),
            Column::new(schema::CONTRAGENT.into(), contragent_col),
            Column::new(schema::ARTICLE_NAME.into(), name_col),
            Column::new(schema::ARTICLE_GROUP.into(), group_col),
        ];
        for (name, col) in schema::VALUE_COLUMNS.iter().zip(value_cols) {
            columns.push(Column::new((*name).into(), col));
        }

        Ok(DataFrame::new(columns)?)
    }

    /// Add the period column as a dense index over `YEAR_MM` labels.
    pub fn index_periods(&self, df: &DataFrame) -> Result<(DataFrame, TimeIndex)> {
        let years = int_values(df, schema::YEAR)?;
        let months = int_values(df, schema::MONTH)?;

        let labels: Vec<String> = years
            .iter()
            .zip(&months)
            .map(|(&year, &month)| {
                let unit = u32::try_from(month).map_err(|_| {
                    ChronofoldError::FormatError(format!("month {} is out of range", month))
                })?;
                TimeIndexer::format_label(year, unit)
            })
            .collect::<Result<_>>()?;

        let period = self.period_column();
        let mut labelled = df.clone();
        labelled.with_column(Series::new(period.into(), labels))?;

        let index = TimeIndexer::new()
            .with_sentinels(self.config.sentinel_periods.iter().cloned())
            .build_from_column(&labelled, period)?;
        let indexed = index.apply(&labelled, period, period)?;

        Ok((indexed, index))
    }

    /// Full preprocessing of a raw sales table
    pub fn run(&self, df: &DataFrame) -> Result<FeatureMatrix> {
        let aggregated = self.aggregate(df)?;
        let (indexed, index) = self.index_periods(&aggregated)?;
        let matrix = self.pipeline.run(&indexed)?;

        let matrix = if self.config.excluded_groups.is_empty() {
            matrix
        } else {
            matrix.map_frame(|frame| self.drop_excluded_groups(frame))?
        };

        let matrix = if self.config.dummy_columns.is_empty() {
            matrix
        } else {
            let columns = self.config.dummy_columns.clone();
            matrix.map_frame(|frame| DummyEncoder::new().fit_transform(&frame, &columns))?
        };

        info!(
            rows = matrix.height(),
            columns = matrix.frame().width(),
            periods = index.len(),
            "Preprocessed sales data"
        );

        Ok(matrix)
    }

    fn drop_excluded_groups(&self, frame: DataFrame) -> Result<DataFrame> {
        let excluded: HashSet<&str> = self
            .config
            .excluded_groups
            .iter()
            .map(String::as_str)
            .collect();
        let keep: Vec<bool> = key_values(&frame, schema::ARTICLE_GROUP)?
            .iter()
            .map(|g| !g.as_deref().is_some_and(|g| excluded.contains(g)))
            .collect();
        filter_rows(&frame, &keep)
    }
}
