//! Preprocessing configuration

use crate::error::Result;
use crate::timeseries::{FeaturePipelineConfig, TimeIndexer};
use serde::{Deserialize, Serialize};

/// Configuration for [`SalesPreprocessor`](super::SalesPreprocessor)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesPreprocessingConfig {
    /// Replacement for a missing article group, `None` leaves nulls in place
    pub article_group_fill: Option<String>,

    /// Period labels forced onto the time axis. The earliest one anchors
    /// index 0 when it precedes the data.
    pub sentinel_periods: Vec<String>,

    /// Article groups removed once features are built. Their rows still
    /// contribute to the lag aggregates of other rows.
    pub excluded_groups: Vec<String>,

    /// Columns to dummy-encode at the end, empty to skip encoding
    pub dummy_columns: Vec<String>,

    /// Lag feature settings. Its time column also names the period column.
    pub features: FeaturePipelineConfig,
}

impl Default for SalesPreprocessingConfig {
    fn default() -> Self {
        Self {
            article_group_fill: Some("WINE".to_string()),
            sentinel_periods: vec!["2017_07".to_string()],
            excluded_groups: vec!["DUNNAGE".to_string()],
            dummy_columns: Vec::new(),
            features: FeaturePipelineConfig::default(),
        }
    }
}

impl SalesPreprocessingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the article group fill value
    pub fn with_article_group_fill(mut self, fill: Option<String>) -> Self {
        self.article_group_fill = fill;
        self
    }

    /// Builder method to set the sentinel periods
    pub fn with_sentinel_periods<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sentinel_periods = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the excluded article groups
    pub fn with_excluded_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the columns to dummy-encode
    pub fn with_dummy_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dummy_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the feature pipeline configuration
    pub fn with_features(mut self, features: FeaturePipelineConfig) -> Self {
        self.features = features;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.features.validate()?;
        for label in &self.sentinel_periods {
            TimeIndexer::validate_label(label)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChronofoldError;

    #[test]
    fn test_defaults() {
        let config = SalesPreprocessingConfig::default();
        assert_eq!(config.article_group_fill.as_deref(), Some("WINE"));
        assert_eq!(config.sentinel_periods, vec!["2017_07"]);
        assert_eq!(config.excluded_groups, vec!["DUNNAGE"]);
        assert!(config.dummy_columns.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_sentinel_rejected() {
        let config = SalesPreprocessingConfig::new().with_sentinel_periods(["2017-07"]);
        assert!(matches!(
            config.validate(),
            Err(ChronofoldError::FormatError(_))
        ));
    }
}
