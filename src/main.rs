//! Chronofold - Main Entry Point

use chronofold::cli::{cmd_features, cmd_info, cmd_split, Cli, Commands};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chronofold=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Features { data, output, config } => {
            cmd_features(&data, &output, config.as_deref())?;
        }
        Commands::Split { data, time_column, train_period, test_period } => {
            cmd_split(&data, &time_column, train_period, test_period)?;
        }
        Commands::Info { data } => {
            cmd_info(&data)?;
        }
    }

    Ok(())
}
