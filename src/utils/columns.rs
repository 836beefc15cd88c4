//! Typed column access over polars frames
//!
//! Every core component reads its inputs through these helpers so that a
//! missing column is always a `SchemaError` and a malformed value is always a
//! `DataError`.

use crate::error::{ChronofoldError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Look up a column, failing with `SchemaError` if it is absent.
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| ChronofoldError::SchemaError(name.to_string()))
}

/// Check that every named column is present.
pub fn require_columns(df: &DataFrame, names: &[&str]) -> Result<()> {
    for name in names {
        require_column(df, name)?;
    }
    Ok(())
}

/// Read a column as string keys. Integer and float keys are rendered as text.
pub fn key_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = require_column(df, name)?;
    let as_text = column
        .as_materialized_series()
        .cast(&DataType::String)
        .map_err(|e| ChronofoldError::DataError(format!("column '{}': {}", name, e)))?;

    let values = as_text
        .str()
        .map_err(|e| ChronofoldError::DataError(format!("column '{}': {}", name, e)))?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();

    Ok(values)
}

/// Read an integer column. Nulls, fractional floats and non-integer text
/// are rejected.
pub fn int_values(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let column = require_column(df, name)?;
    let series = column.as_materialized_series();

    if series.dtype().is_float() {
        return numeric_values(df, name)?
            .into_iter()
            .enumerate()
            .map(|(row, v)| match v {
                Some(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
                Some(v) => Err(ChronofoldError::DataError(format!(
                    "column '{}' has non-integer value {} at row {}",
                    name, v, row
                ))),
                None => Err(ChronofoldError::DataError(format!(
                    "column '{}' has a null at row {}",
                    name, row
                ))),
            })
            .collect();
    }

    let as_int = series
        .strict_cast(&DataType::Int64)
        .map_err(|e| ChronofoldError::DataError(format!("column '{}' is not integer: {}", name, e)))?;

    as_int
        .i64()
        .map_err(|e| ChronofoldError::DataError(format!("column '{}': {}", name, e)))?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                ChronofoldError::DataError(format!("column '{}' has a null at row {}", name, row))
            })
        })
        .collect()
}

/// Read a dense time-index column.
pub fn time_values(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    int_values(df, name)
}

/// Read a numeric column as `f64`. Nulls are kept, unparsable values fail.
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = require_column(df, name)?;
    let as_float = column
        .as_materialized_series()
        .strict_cast(&DataType::Float64)
        .map_err(|e| {
            ChronofoldError::DataError(format!("column '{}' is not numeric: {}", name, e))
        })?;

    let values = as_float
        .f64()
        .map_err(|e| ChronofoldError::DataError(format!("column '{}': {}", name, e)))?
        .into_iter()
        .collect();

    Ok(values)
}

/// Extract a single numeric column as an `Array1<f64>`. Nulls are rejected.
pub fn column_to_array1(df: &DataFrame, name: &str) -> Result<Array1<f64>> {
    numeric_values(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                ChronofoldError::DataError(format!("column '{}' has a null at row {}", name, row))
            })
        })
        .collect::<Result<Vec<f64>>>()
        .map(Array1::from_vec)
}

/// Extract named columns into a row-major `Array2<f64>`.
pub fn columns_to_array2(df: &DataFrame, names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let col_data: Vec<Array1<f64>> = names
        .iter()
        .map(|name| column_to_array1(df, name))
        .collect::<Result<_>>()?;

    Ok(Array2::from_shape_fn((n_rows, names.len()), |(r, c)| col_data[c][r]))
}

/// Keep the rows whose flag is set, preserving order.
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> Result<DataFrame> {
    if keep.len() != df.height() {
        return Err(ChronofoldError::ShapeError {
            expected: format!("{} row flags", df.height()),
            actual: keep.len().to_string(),
        });
    }
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    Ok(df.filter(&mask)?)
}
