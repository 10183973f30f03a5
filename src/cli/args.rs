//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// meetsync - Sync Fireflies meeting transcripts into a RAG-ready store
#[derive(Parser, Debug)]
#[command(name = "meetsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync transcripts from Fireflies into the store
    Sync {
        /// Sync a single transcript by its Fireflies ID
        #[arg(long)]
        id: Option<String>,

        /// Cap the number of new transcripts handled in this pass
        #[arg(short, long)]
        limit: Option<usize>,

        /// Fetch and chunk without embedding or storing anything
        #[arg(long)]
        dry_run: bool,

        /// Keep running, repeating the sync on an interval
        #[arg(long)]
        watch: bool,

        /// Minutes between watch-mode passes (defaults to sync.watch_interval_mins)
        #[arg(long)]
        interval_mins: Option<u64>,
    },

    /// List transcripts available at the source
    List {
        /// Maximum number of transcripts to show
        #[arg(short, long, default_value = "25")]
        limit: usize,
    },

    /// Check configuration and prerequisites
    Doctor {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
