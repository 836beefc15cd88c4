//! Run configuration
//!
//! Bundles the component configurations so a whole run can be described in
//! one JSON file. Missing sections fall back to their defaults.

use crate::error::{ChronofoldError, Result};
use crate::preprocessing::SalesPreprocessingConfig;
use crate::timeseries::SplitConfig;
use crate::training::EvaluatorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration of a complete preprocessing and evaluation run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChronofoldConfig {
    pub preprocessing: SalesPreprocessingConfig,
    pub split: SplitConfig,
    pub evaluator: EvaluatorConfig,
}

impl ChronofoldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the preprocessing configuration
    pub fn with_preprocessing(mut self, preprocessing: SalesPreprocessingConfig) -> Self {
        self.preprocessing = preprocessing;
        self
    }

    /// Builder method to set the split configuration
    pub fn with_split(mut self, split: SplitConfig) -> Self {
        self.split = split;
        self
    }

    /// Builder method to set the evaluator configuration
    pub fn with_evaluator(mut self, evaluator: EvaluatorConfig) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.preprocessing.validate()?;
        self.split.validate()?;
        if self.split.split_column != self.preprocessing.features.time_column {
            return Err(ChronofoldError::ConfigError(format!(
                "split column '{}' differs from the feature time column '{}'",
                self.split.split_column, self.preprocessing.features.time_column
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
