use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use icm_cli::commands::{mine, scores};
use icm_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = std::io::stdout().lock();
    match &cli.command {
        Some(Commands::Mine { miner, dot, json }) => {
            let settings = miner
                .resolve(&config.miner)
                .context("invalid configuration")?;
            mine::run(&mut stdout, &miner.log, &settings, dot.as_deref(), *json)?;
        }
        Some(Commands::Scores { miner, json }) => {
            let settings = miner
                .resolve(&config.miner)
                .context("invalid configuration")?;
            scores::run(&mut stdout, &miner.log, &settings, *json)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
