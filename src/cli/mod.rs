//! Poolwatch CLI entry surface.

pub mod commands;
pub mod context;
pub mod output;

use clap::{Parser, Subcommand};

use crate::services::{DEFAULT_THRESHOLD, DEFAULT_TOP_K};

#[derive(Parser)]
#[command(
    name = "poolwatch",
    about = "Harvests DeFi pool metrics and serves similarity search over them",
    version
)]
pub struct Cli {
    /// Path to a configuration file (defaults to ./poolwatch.yaml)
    #[arg(long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Emit machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the ingestion scheduler until interrupted
    Run,

    /// Run a single ingestion cycle and exit
    Once,

    /// List stored pool snapshots, newest first
    List {
        /// Maximum number of snapshots to show
        #[arg(long, short = 'n')]
        limit: Option<u32>,
    },

    /// Search stored snapshots by semantic similarity
    Search {
        /// Free-text query, e.g. "stablecoin pools with high APY"
        query: String,

        /// Minimum cosine similarity in [0, 1]
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f32,

        /// Maximum number of results
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },
}

/// Print an error and exit non-zero, honoring the JSON flag.
pub fn handle_error(err: anyhow::Error, json: bool) -> ! {
    if json {
        let payload = serde_json::json!({ "error": format!("{err:#}") });
        eprintln!("{payload}");
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
