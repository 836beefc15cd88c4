//! Dummy (one-hot) encoding of categorical columns

use crate::error::{ChronofoldError, Result};
use crate::utils::columns::key_values;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Replaces categorical columns with one indicator column per category.
///
/// Indicator columns are named `<column>_<category>`, appended in sorted
/// category order after the remaining columns. Nulls and categories unseen
/// during `fit` encode as all zeros.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DummyEncoder {
    // column name -> sorted categories
    categories: BTreeMap<String, Vec<String>>,
    columns: Vec<String>,
    is_fitted: bool,
}

impl DummyEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the distinct values of each column
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        self.categories.clear();
        for name in columns {
            let distinct: BTreeSet<String> = key_values(df, name)?.into_iter().flatten().collect();
            self.categories
                .insert(name.clone(), distinct.into_iter().collect());
        }
        self.columns = columns.to_vec();
        self.is_fitted = true;
        Ok(self)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Categories learned for a column
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.categories.get(column).map(Vec::as_slice)
    }

    /// Names of the indicator columns `transform` produces, in order
    pub fn output_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|col| {
                self.categories
                    .get(col)
                    .into_iter()
                    .flatten()
                    .map(move |cat| format!("{}_{}", col, cat))
            })
            .collect()
    }

    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(ChronofoldError::StateError(
                "DummyEncoder has not been fitted".to_string(),
            ));
        }

        let mut indicators = Vec::new();
        for col_name in &self.columns {
            let values = key_values(df, col_name)?;
            let Some(categories) = self.categories.get(col_name) else {
                continue;
            };
            for category in categories {
                let flags: Vec<i32> = values
                    .iter()
                    .map(|v| i32::from(v.as_deref() == Some(category.as_str())))
                    .collect();
                indicators.push(Series::new(format!("{}_{}", col_name, category).into(), flags));
            }
        }

        let n_indicators = indicators.len();
        let mut result = df.drop_many(self.columns.iter().map(String::as_str));
        for series in indicators {
            result.with_column(series)?;
        }

        debug!(
            encoded = self.columns.len(),
            indicators = n_indicators,
            "Dummy-encoded columns"
        );

        Ok(result)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }
}
