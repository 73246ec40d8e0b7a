mod cli;
mod commands;
mod terminal;

use clap::Parser;
use cli::{Cli, Commands};
use posner_leaderboard::WatchConfig;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            subject_id,
            config,
            overwrite,
        } => commands::run(subject_id, &config, overwrite),
        Commands::Test {
            subject_id,
            config,
            keep,
            seed,
            quiet,
        } => commands::test(subject_id, &config, keep, seed, quiet),
        Commands::Validate { config } => commands::validate(&config),
        Commands::Leaderboard {
            data_dir,
            output_dir,
            interval_secs,
            refresh_secs,
            once,
        } => {
            let config = WatchConfig {
                data_dir,
                output_dir,
                interval: Duration::from_secs(interval_secs.max(1)),
                refresh_secs,
            };
            commands::leaderboard(config, once)
        }
    }
}
