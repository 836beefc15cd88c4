//! Time series module
//!
//! Provides the leakage-free pieces of the workflow:
//! - Dense time index over sortable period labels
//! - Rolling time-based train/test splits
//! - Grouped lag features and the pipeline that applies them

mod features;
mod pipeline;
mod time_index;
mod validation;

pub use features::{LagFeatureBuilder, LagFeatureSpec, LagStatistic};
pub use pipeline::{FeatureMatrix, FeaturePipeline, FeaturePipelineConfig};
pub use time_index::{TimeIndex, TimeIndexer};
pub use validation::{Fold, FoldWindow, SplitConfig, SplitPlan, SplitProvider, TimeBasedSplitter};
