//! CLI subcommand implementations.

pub mod mine;
pub mod scores;

use std::path::Path;

use anyhow::{Context, Result};
use icm_core::{MinerConfig, MiningReport};

/// Loads the log at `path` and mines it.
fn load_and_mine(path: &Path, config: &MinerConfig) -> Result<MiningReport> {
    let log = icm_log::load_log(path, config.max_traces)
        .with_context(|| format!("failed to load log from {}", path.display()))?;
    icm_core::mine(&log, config).context("mining failed")
}
