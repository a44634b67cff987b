//! Recast CLI: rebuild recorded conferencing sessions as videos.
//!
//! Usage:
//!   recast assemble <URL> [OPTIONS]   Assemble a recording into one video
//!   recast info <URL>                 Show the reconciled slide timeline
//!   recast check                      Check the transcoder and configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use recast_common::config::{config_file_path, AppConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "recast",
    about = "Rebuild recorded conferencing sessions as side-by-side slide and webcam videos",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a recording and assemble the composite video
    Assemble {
        /// Playback URL of the recording
        url: String,

        /// Directory for the finished video
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Concurrent slide fetches and renders
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Keep intermediate files after a successful run
        #[arg(long)]
        keep_staging: bool,

        /// Parent directory for intermediate files
        #[arg(long)]
        staging_root: Option<PathBuf>,
    },

    /// Show recording information and the reconciled timeline
    Info {
        /// Playback URL of the recording
        url: String,

        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the transcoder and configuration
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if cli.json_logs {
        config.logging.json = true;
    }
    recast_common::logging::init_logging(&config.logging);
    tracing::debug!(path = %config_file_path().display(), "Configuration loaded");

    match cli.command {
        Commands::Assemble {
            url,
            output_dir,
            jobs,
            keep_staging,
            staging_root,
        } => {
            if let Some(jobs) = jobs {
                config.pipeline.jobs = jobs;
            }
            if keep_staging {
                config.pipeline.keep_staging = true;
            }
            if staging_root.is_some() {
                config.pipeline.staging_root = staging_root;
            }
            commands::assemble::run(config, url, output_dir).await
        }
        Commands::Info { url, json } => commands::info::run(config, url, json).await,
        Commands::Check => commands::check::run(config).await,
    }
}
