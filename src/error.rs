//! Error types for chronofold

use thiserror::Error;

/// Result type alias for chronofold operations
pub type Result<T> = std::result::Result<T, ChronofoldError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum ChronofoldError {
    /// A period label is not a lexicographically sortable `YYYY_NN` token
    #[error("Format error: {0}")]
    FormatError(String),

    /// A required column is missing from the dataset
    #[error("Schema error: column '{0}' not found")]
    SchemaError(String),

    /// A query was made before the step it depends on
    #[error("State error: {0}")]
    StateError(String),

    /// Malformed values encountered while reading or aggregating
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },
}

impl From<polars::error::PolarsError> for ChronofoldError {
    fn from(err: polars::error::PolarsError) -> Self {
        ChronofoldError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for ChronofoldError {
    fn from(err: serde_json::Error) -> Self {
        ChronofoldError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for ChronofoldError {
    fn from(err: ndarray::ShapeError) -> Self {
        ChronofoldError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
