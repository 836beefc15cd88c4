//! Chronofold CLI Module
//!
//! Command-line interface for building the lag-feature dataset and
//! inspecting time-based split plans.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::ChronofoldConfig;
use crate::preprocessing::SalesPreprocessor;
use crate::timeseries::{SplitConfig, TimeBasedSplitter};
use crate::utils::{DataLoader, DataSaver};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "chronofold")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Leakage-free time-based validation and lag features for sales data")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the lag-feature dataset from raw sales rows
    Features {
        /// Raw sales CSV
        #[arg(short, long)]
        data: PathBuf,

        /// Output CSV
        #[arg(short, long)]
        output: PathBuf,

        /// JSON run configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show the train/test folds of a time-based split
    Split {
        /// CSV with a dense time-index column
        #[arg(short, long)]
        data: PathBuf,

        /// Time-index column
        #[arg(long, default_value = "YEAR_MONTH")]
        time_column: String,

        /// Periods per training window
        #[arg(long, default_value = "4")]
        train_period: usize,

        /// Periods per test window
        #[arg(long, default_value = "1")]
        test_period: usize,
    },

    /// Show data information
    Info {
        /// Input CSV
        #[arg(short, long)]
        data: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_features(data_path: &Path, output: &Path, config_path: Option<&Path>) -> anyhow::Result<()> {
    section("Features");

    let config = match config_path {
        Some(path) => ChronofoldConfig::load(path)?,
        None => ChronofoldConfig::default(),
    };

    step_run("Loading data");
    let start = Instant::now();
    let raw = DataLoader::new().load_csv(data_path)?;
    step_done(&format!("{} rows in {:.2?}", raw.height(), start.elapsed()));

    step_run("Building lag features");
    let start = Instant::now();
    let preprocessor = SalesPreprocessor::new(config.preprocessing)?;
    let matrix = preprocessor.run(&raw)?;
    step_done(&format!(
        "{} features, {} rows in {:.2?}",
        matrix.features().len(),
        matrix.height(),
        start.elapsed()
    ));

    step_run("Writing output");
    let mut frame = matrix.into_frame();
    DataSaver::save_csv(&mut frame, output)?;
    step_done(&output.display().to_string());

    println!();
    Ok(())
}

pub fn cmd_split(
    data_path: &Path,
    time_column: &str,
    train_period: usize,
    test_period: usize,
) -> anyhow::Result<()> {
    section("Split");

    let df = DataLoader::new().load_csv(data_path)?;
    let config = SplitConfig::new(train_period, test_period).with_split_column(time_column);
    let mut splitter = TimeBasedSplitter::from_config(config)?;
    let plan = splitter.split(&df, time_column)?;

    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Folds"), plan.len());
    println!();

    if plan.is_empty() {
        println!("  {}", dim("not enough periods for a single fold"));
        println!();
        return Ok(());
    }

    println!(
        "  {:<6} {:<16} {:<16} {:>8} {:>8}",
        muted("Fold"),
        muted("Train periods"),
        muted("Test periods"),
        muted("Train"),
        muted("Test")
    );
    println!("  {}", dim(&"─".repeat(58)));

    for fold in &plan {
        println!(
            "  {:<6} {:<16} {:<16} {:>8} {:>8}",
            fold.fold,
            period_range(&fold.train_periods),
            period_range(&fold.test_periods),
            fold.train_indices.len(),
            fold.test_indices.len()
        );
    }

    println!();
    Ok(())
}

pub fn cmd_info(data_path: &Path) -> anyhow::Result<()> {
    section("Data Info");

    let df = DataLoader::new().load_csv(data_path)?;

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!();

    println!("  {:<32} {:<12} {:>6}", muted("Column"), muted("Type"), muted("Nulls"));
    println!("  {}", dim(&"─".repeat(52)));

    for col in df.get_columns() {
        println!(
            "  {:<32} {:<12} {:>6}",
            col.name(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count()
        );
    }

    println!();
    Ok(())
}

fn period_range(periods: &[i64]) -> String {
    match (periods.first(), periods.last()) {
        (Some(first), Some(last)) if first == last => first.to_string(),
        (Some(first), Some(last)) => format!("{}..={}", first, last),
        _ => "-".to_string(),
    }
}
