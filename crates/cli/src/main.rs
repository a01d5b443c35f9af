//! postfeed CLI entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod commands;
mod config;

use args::{Cli, Commands};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // `config init` must work even when the current config is broken
    let config = match &cli.command {
        Commands::Config(_) | Commands::Doctor(_) => None,
        _ => Some(AppConfig::load(cli.config.as_deref())?),
    };

    let log_level = cli
        .log_level
        .as_deref()
        .or(config.as_ref().map(|c| c.general.log_level.as_str()))
        .unwrap_or("info");
    init_logging(log_level)?;

    match (cli.command, config) {
        (Commands::Fetch(args), Some(config)) => {
            commands::fetch::execute(args, &config, cli.offline).await
        }
        (Commands::Topic(args), Some(config)) => {
            commands::topic::execute(args, &config, cli.offline).await
        }
        (Commands::Show(args), Some(config)) => {
            commands::show::execute(args, &config, cli.offline).await
        }
        (Commands::Listing(args), Some(config)) => {
            commands::listing::execute(args, &config, cli.offline).await
        }
        (Commands::Config(args), _) => commands::config::execute(args, cli.config).await,
        (Commands::Doctor(args), _) => commands::doctor::execute(args, cli.config).await,
        (_, None) => anyhow::bail!("Configuration was not loaded"),
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
