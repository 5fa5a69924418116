//! Information-content process miner CLI library.

mod cli;
pub mod commands;
mod config;
pub mod render;

pub use cli::{Cli, Commands, MinerArgs};
pub use config::Config;
