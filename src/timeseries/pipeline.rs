//! Lag-feature pipeline
//!
//! Applies [`LagFeatureBuilder`] for every `(lag, group key, value column)`
//! combination and trims the warm-up periods afterwards.

use super::features::{LagFeatureBuilder, LagFeatureSpec, LagStatistic};
use crate::error::{ChronofoldError, Result};
use crate::utils::columns::{column_to_array1, columns_to_array2, filter_rows, time_values};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Configuration for the feature pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePipelineConfig {
    /// Dense time-index column
    pub time_column: String,
    /// Lags to generate, outermost loop
    pub lags: Vec<usize>,
    /// Grouping keys, middle loop
    pub group_keys: Vec<String>,
    /// Value columns, innermost loop
    pub value_columns: Vec<String>,
    /// Rows with a time index below this are dropped once features are built.
    /// They only exist to feed the lags of later periods.
    pub drop_before_index: Option<i64>,
}

impl Default for FeaturePipelineConfig {
    fn default() -> Self {
        Self {
            time_column: "YEAR_MONTH".to_string(),
            lags: vec![1, 2, 3],
            group_keys: vec![
                "CONTRAGENT".to_string(),
                "ARTICLE_NAME".to_string(),
                "ARTICLE_GROUP".to_string(),
            ],
            value_columns: vec!["SALES".to_string(), "STORE_SALES".to_string()],
            drop_before_index: Some(1),
        }
    }
}

impl FeaturePipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the time-index column
    pub fn with_time_column(mut self, column: impl Into<String>) -> Self {
        self.time_column = column.into();
        self
    }

    /// Builder method to set the lags
    pub fn with_lags(mut self, lags: Vec<usize>) -> Self {
        self.lags = lags;
        self
    }

    /// Builder method to set the grouping keys
    pub fn with_group_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the value columns
    pub fn with_value_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set or disable the warm-up cut
    pub fn with_drop_before_index(mut self, index: Option<i64>) -> Self {
        self.drop_before_index = index;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(lag) = self.lags.iter().find(|&&lag| lag == 0) {
            return Err(ChronofoldError::ConfigError(format!(
                "lags must be at least 1, got {}",
                lag
            )));
        }
        Ok(())
    }
}

/// Dataset with its generated features
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    frame: DataFrame,
    features: Vec<(LagFeatureSpec, LagStatistic)>,
}

impl FeatureMatrix {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Generated features in column order
    pub fn features(&self) -> &[(LagFeatureSpec, LagStatistic)] {
        &self.features
    }

    /// Column names of the generated features
    pub fn feature_names(&self) -> Vec<String> {
        self.features
            .iter()
            .map(|(spec, stat)| spec.column_name(*stat))
            .collect()
    }

    /// Column name of a feature, if this matrix contains it
    pub fn column_for(&self, spec: &LagFeatureSpec, stat: LagStatistic) -> Option<String> {
        self.features
            .iter()
            .any(|(s, st)| s == spec && *st == stat)
            .then(|| spec.column_name(stat))
    }

    /// Values of one feature
    pub fn feature_values(&self, spec: &LagFeatureSpec, stat: LagStatistic) -> Result<Array1<f64>> {
        let name = self
            .column_for(spec, stat)
            .ok_or_else(|| ChronofoldError::SchemaError(spec.column_name(stat)))?;
        column_to_array1(&self.frame, &name)
    }

    /// Named numeric columns as a row-major matrix
    pub fn to_array(&self, columns: &[String]) -> Result<Array2<f64>> {
        columns_to_array2(&self.frame, columns)
    }

    /// One numeric column, typically the regression target
    pub fn target(&self, column: &str) -> Result<Array1<f64>> {
        column_to_array1(&self.frame, column)
    }

    /// Replace the frame through a row or column transformation that keeps
    /// the generated feature columns.
    pub fn map_frame<F>(self, f: F) -> Result<Self>
    where
        F: FnOnce(DataFrame) -> Result<DataFrame>,
    {
        let frame = f(self.frame)?;
        Ok(Self {
            frame,
            features: self.features,
        })
    }
}

/// Builds every configured lag feature over a dataset
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    config: FeaturePipelineConfig,
    builder: LagFeatureBuilder,
}

impl FeaturePipeline {
    pub fn new(config: FeaturePipelineConfig) -> Result<Self> {
        config.validate()?;
        let builder = LagFeatureBuilder::new(config.time_column.clone());
        Ok(Self { config, builder })
    }

    pub fn config(&self) -> &FeaturePipelineConfig {
        &self.config
    }

    /// Feature specs in application order: lag, then group key, then value column.
    pub fn specs(&self) -> Vec<LagFeatureSpec> {
        let mut specs = Vec::with_capacity(
            self.config.lags.len() * self.config.group_keys.len() * self.config.value_columns.len(),
        );
        for &lag in &self.config.lags {
            for key in &self.config.group_keys {
                for column in &self.config.value_columns {
                    specs.push(LagFeatureSpec::new(key.clone(), column.clone(), lag));
                }
            }
        }
        specs
    }

    /// Build all features, then drop the warm-up rows.
    pub fn run(&self, df: &DataFrame) -> Result<FeatureMatrix> {
        let specs = self.specs();
        let mut frame = df.clone();
        let mut features = Vec::with_capacity(specs.len() * LagStatistic::ALL.len());

        for spec in specs {
            frame = self.builder.apply(&frame, &spec)?;
            for stat in LagStatistic::ALL {
                features.push((spec.clone(), stat));
            }
        }

        let rows_in = frame.height();
        if let Some(first_kept) = self.config.drop_before_index {
            let keep: Vec<bool> = time_values(&frame, &self.config.time_column)?
                .into_iter()
                .map(|t| t >= first_kept)
                .collect();
            frame = filter_rows(&frame, &keep)?;
        }

        info!(
            n_features = features.len(),
            rows_in,
            rows_out = frame.height(),
            "Built lag features"
        );

        Ok(FeatureMatrix { frame, features })
    }
}
