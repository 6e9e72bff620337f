//! Grid search command implementation.

use anyhow::{Context, Result};
use quant_backtest::{grid_table, rank, GridSearch, ParamGrid};
use quant_config::AppConfig;
use quant_data::load_csv;
use tracing::info;

use crate::cli::GridArgs;

/// Replace a configured list when values were given on the command line.
fn override_list<T: Clone>(target: &mut Vec<T>, values: &[T]) {
    if !values.is_empty() {
        *target = values.to_vec();
    }
}

fn apply_overrides(grid: &mut ParamGrid, args: &GridArgs) {
    match grid {
        ParamGrid::Sma { fast, slow } => {
            override_list(fast, &args.fast);
            override_list(slow, &args.slow);
        }
        ParamGrid::Rsi {
            period,
            oversold,
            overbought,
        } => {
            override_list(period, &args.period);
            override_list(oversold, &args.oversold);
            override_list(overbought, &args.overbought);
        }
        ParamGrid::Macd { fast, slow, signal } => {
            override_list(fast, &args.fast);
            override_list(slow, &args.slow);
            override_list(signal, &args.signal);
        }
        ParamGrid::Bollinger { period, std_dev } => {
            override_list(period, &args.period);
            override_list(std_dev, &args.std_dev);
        }
    }
}

pub fn run(args: GridArgs, config: &AppConfig) -> Result<()> {
    let mut grid = config.param_grid(args.strategy);
    apply_overrides(&mut grid, &args);
    info!(
        "Starting grid search for {} over {} combinations",
        args.strategy,
        grid.size()
    );

    let bars = load_csv(&args.data)
        .with_context(|| format!("Failed to load data from {}", args.data.display()))?;

    let search = GridSearch::new(config.backtest_config())
        .with_base(config.strategy_params(args.strategy))
        .parallel(!args.sequential);
    let results = search.run(&bars, &grid);

    if let Some(save_path) = &args.save {
        let json = serde_json::to_string_pretty(&results)?;
        std::fs::write(save_path, json)
            .with_context(|| format!("Failed to write {}", save_path.display()))?;
        info!("Results saved to {:?}", save_path);
    }

    let total = results.len();
    let top_n = args.top.unwrap_or(config.grid.top_n);
    let top = rank(results, args.rank, top_n);

    println!(
        "Grid search: {} ({} valid combinations), top {} by {}",
        args.strategy,
        total,
        top.len(),
        args.rank
    );
    println!();
    print!("{}", grid_table(&top));

    Ok(())
}
