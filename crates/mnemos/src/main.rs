// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mnemos - memory retrieval and normalization core.
//!
//! This is the binary entry point. It exposes the offline operations of the
//! memory core: parsing extraction output, merging profiles and fusing
//! ranked result lists.

mod fuse;
mod input;
mod parse;
mod profile;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mnemos_core::MnemosError;

/// Mnemos - memory retrieval and normalization core.
#[derive(Parser, Debug)]
#[command(name = "mnemos", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the default hierarchy.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse extraction-model output into typed memory sections (JSON).
    Parse {
        /// Input file, or `-` for stdin.
        input: String,
    },
    /// Merge new profile facts into an existing profile.
    MergeProfile {
        /// Existing profile JSON (`{"items": [...]}` or a bare array).
        existing: PathBuf,
        /// Incoming facts, same format.
        incoming: PathBuf,
    },
    /// Fuse ranked result lists with reciprocal rank fusion.
    Fuse {
        /// JSON files, each holding one ranked list of results.
        #[arg(required = true)]
        lists: Vec<PathBuf>,
        /// RRF constant; defaults to `retrieval.rrf_k`.
        #[arg(long)]
        k: Option<f32>,
        /// Keep only the top N fused results.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => mnemos_config::load_and_validate_path(path),
        None => mnemos_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            mnemos_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);

    let result = match cli.command {
        Some(Commands::Parse { input }) => parse::run(&input),
        Some(Commands::MergeProfile { existing, incoming }) => {
            profile::run(&config.profile, &existing, &incoming).await
        }
        Some(Commands::Fuse { lists, k, limit }) => {
            fuse::run(&lists, k.unwrap_or(config.retrieval.rrf_k), limit)
        }
        Some(Commands::Config) => print_config(&config),
        None => {
            println!("mnemos: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("mnemos: {e}");
        std::process::exit(1);
    }
}

fn print_config(config: &mnemos_config::MnemosConfig) -> Result<(), MnemosError> {
    let rendered =
        mnemos_config::render_toml(config).map_err(|e| MnemosError::Config(e.to_string()))?;
    print!("{rendered}");
    Ok(())
}

/// Initialize the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mnemos={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
