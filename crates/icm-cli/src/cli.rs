//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use icm_core::{ConfigError, MinerConfig};

/// Information-content process miner.
///
/// Scores the activities of an event log along four information-content
/// dimensions and synthesizes a Petri net from the resulting ranking.
#[derive(Debug, Parser)]
#[command(name = "icm", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Mine a process model from an event log.
    Mine {
        #[command(flatten)]
        miner: MinerArgs,

        /// Write the model as Graphviz DOT to this file.
        #[arg(long)]
        dot: Option<PathBuf>,

        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show per-dimension and fused scores for every activity.
    Scores {
        #[command(flatten)]
        miner: MinerArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Log location and configuration overrides shared by the mining commands.
#[derive(Debug, Clone, Args)]
pub struct MinerArgs {
    /// JSON log file, or a directory of them.
    pub log: PathBuf,

    /// Weight applied to temporal and contextual information.
    #[arg(long)]
    pub lambda: Option<f64>,

    /// Maximum number of traces to read.
    #[arg(long)]
    pub max_traces: Option<usize>,
}

impl MinerArgs {
    /// Applies the overrides on top of `base` and validates the result.
    pub fn resolve(&self, base: &MinerConfig) -> Result<MinerConfig, ConfigError> {
        let mut config = base.clone();
        if let Some(lambda) = self.lambda {
            config.lambda = lambda;
        }
        if let Some(max_traces) = self.max_traces {
            config.max_traces = max_traces;
        }
        config.validate()?;
        Ok(config)
    }
}
