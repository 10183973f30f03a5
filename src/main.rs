//! meetsync - Sync Fireflies meeting transcripts into a RAG-ready store
//!
//! Entry point for the meetsync CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use meetsync::cli::{Cli, Commands};
use meetsync::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Completions { shell } => {
            meetsync::cli::completions::print(shell);
        }
        command => {
            // Load configuration only for runtime commands.
            let settings = Settings::load()?;

            // Execute command
            match command {
                Commands::Sync {
                    id,
                    limit,
                    dry_run,
                    watch,
                    interval_mins,
                } => {
                    meetsync::cli::commands::sync(&settings, id, limit, dry_run, watch, interval_mins)
                        .await?;
                }
                Commands::List { limit } => {
                    meetsync::cli::commands::list_transcripts(&settings, limit).await?;
                }
                Commands::Doctor { json } => {
                    meetsync::cli::commands::run_doctor(&settings, json).await?;
                }
                Commands::Config(config_cmd) => {
                    meetsync::cli::commands::config_command(&settings, config_cmd)?;
                }
                Commands::Completions { .. } => unreachable!(),
            }
        }
    }

    Ok(())
}
