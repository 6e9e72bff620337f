//! List strategies command.

use anyhow::{anyhow, Result};
use quant_strategies::{StrategyInfo, StrategyRegistry};

pub fn run(name: Option<&str>) -> Result<()> {
    let registry = StrategyRegistry::new();

    if let Some(name) = name {
        let info = registry.get(name).ok_or_else(|| {
            anyhow!(
                "Unknown strategy '{}', expected one of: {}",
                name,
                registry.names().join(", ")
            )
        })?;
        print_info(info);
        return Ok(());
    }

    println!("Available Strategies");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for info in registry.list() {
        print_info(info);
    }

    println!("Use --strategy <name> to select a strategy.");
    println!();
    println!("Strategy names: {}", registry.names().join(", "));

    Ok(())
}

fn print_info(info: &StrategyInfo) {
    println!("  {} ({}, {})", info.name, info.key, info.style);
    println!("  ───────────────────────────────────────────────────────");
    println!("  {}", info.description);
    println!("  Defaults: {}", info.default_params.describe());
    println!("  Warm-up:  {} bars", info.warmup_period);
    println!();
}
