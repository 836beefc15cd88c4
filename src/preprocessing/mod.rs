//! Data preprocessing module
//!
//! Prepares raw monthly sales tables for the time series core:
//! - Cleaning and monthly aggregation of sales rows
//! - Period indexing and lag features through [`crate::timeseries`]
//! - Dummy encoding of categorical columns

mod config;
mod encoder;
mod sales;

pub use config::SalesPreprocessingConfig;
pub use encoder::DummyEncoder;
pub use sales::{schema, SalesPreprocessor};
