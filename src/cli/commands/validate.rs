//! Validate configuration command.

use anyhow::{Context, Result};
use quant_config::AppConfig;

pub fn run(config: &AppConfig) -> Result<()> {
    config.validate().context("Configuration error")?;

    println!("Configuration is valid!");
    println!();
    print!("{}", config.to_toml()?);

    Ok(())
}
