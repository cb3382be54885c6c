mod runner;
mod scheduler;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ukfuel")]
#[command(about = "Track UK retailer fuel prices from the published gov.uk table")]
struct Cli {
    /// Tracking file to use instead of `UKFUEL_TRACKING_PATH`.
    #[arg(long, global = true)]
    tracking: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Refresh every tracked pair once and print the entities as JSON.
    Once,
    /// Refresh on a fixed interval until interrupted.
    Watch {
        /// Hours between refreshes; defaults to the tracking file's
        /// `update_frequency`.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        interval_hours: Option<u32>,
    },
    /// Fetch and parse the price table once and print the snapshot as JSON.
    Snapshot,
    /// Validate configuration and list the tracked pairs.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = ukfuel_core::load_app_config_from_env()?;
    if let Some(path) = cli.tracking {
        config.tracking_path = path;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Once => runner::run_once(&config).await,
        Commands::Watch { interval_hours } => runner::run_watch(&config, interval_hours).await,
        Commands::Snapshot => runner::run_snapshot(&config).await,
        Commands::CheckConfig => runner::run_check_config(&config),
    }
}
