//! Strategy research CLI.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use quant_config::load_config;
use quant_monitor::setup_logging;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    // Setup logging
    let level = cli
        .log_level
        .map(|level| level.as_str())
        .unwrap_or(config.logging.level.as_str());
    let json = cli.json_logs || config.logging.format.eq_ignore_ascii_case("json");
    let _guard = setup_logging(level, json, config.logging.file.as_deref().map(Path::new));

    // Execute command
    match cli.command {
        Commands::Backtest(args) => cli::commands::backtest::run(args, &config),
        Commands::Grid(args) => cli::commands::grid::run(args, &config),
        Commands::Strategies { name } => cli::commands::strategies::run(name.as_deref()),
        Commands::ValidateConfig => cli::commands::validate::run(&config),
    }
}
