//! Handweave CLI: drive the choreography engine from detector dumps.
//!
//! Usage:
//!   handweave replay <FILE>     Run a detector dump through the engine
//!   handweave classify <FILE>   Classify every sample in a dump
//!   handweave catalog           Print generated formation coordinates
//!   handweave synth <SCRIPT>    Write a synthetic detector dump
//!   handweave config            Show or write the configuration

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use handweave_common::config::AppConfig;
use handweave_model::spatial::FormationKind;

mod commands;

#[derive(Parser)]
#[command(
    name = "handweave",
    about = "Hand-gesture driven 3D formation choreography",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the standard location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a detector dump through classification, formations, and motion
    Replay {
        /// JSONL detector dump
        file: PathBuf,

        /// Run live on the tokio session, paced by sample timestamps
        #[arg(long)]
        realtime: bool,

        /// Override the object count
        #[arg(long)]
        count: Option<usize>,

        /// Extra render ticks after the last sample (offline mode)
        #[arg(long, default_value = "120")]
        settle_ticks: u64,

        /// Print the final summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify each sample and print one JSON line per sample
    Classify {
        /// JSONL detector dump
        file: PathBuf,
    },

    /// Print generated formation coordinates as JSON
    Catalog {
        /// Only this formation: scatter|tree|focus
        #[arg(short, long)]
        formation: Option<FormationKind>,

        /// Override the object count
        #[arg(long)]
        count: Option<usize>,
    },

    /// Write a synthetic detector dump from a gesture script
    Synth {
        /// Comma-separated steps: open_palm,fist,pinch,none,no_hand
        script: String,

        /// Frames emitted per step
        #[arg(long, default_value = "30")]
        frames_per_step: usize,

        /// Detector frame rate
        #[arg(long, default_value = "30")]
        fps: u32,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config {
        /// Save it to the standard location
        #[arg(long)]
        write: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(AppConfig::load()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    // Initialize logging
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    handweave_common::logging::init_logging(&config.logging)
        .context("Failed to initialize logging")?;

    match cli.command {
        Commands::Replay {
            file,
            realtime,
            count,
            settle_ticks,
            json,
        } => {
            if let Some(count) = count {
                config.formation.object_count = count;
            }
            if realtime {
                commands::replay::run_realtime(config, file, json).await
            } else {
                commands::replay::run_offline(config, file, settle_ticks, json)
            }
        }
        Commands::Classify { file } => commands::classify::run(&config, file),
        Commands::Catalog { formation, count } => {
            if let Some(count) = count {
                config.formation.object_count = count;
            }
            commands::catalog::run(&config, formation)
        }
        Commands::Synth {
            script,
            frames_per_step,
            fps,
            output,
        } => commands::synth::run(&script, frames_per_step, fps, output),
        Commands::Config { write } => commands::config::run(&config, write),
    }
}
