//! Backtest command implementation.

use anyhow::{bail, Context, Result};
use quant_backtest::{BacktestEngine, BacktestReport};
use quant_config::AppConfig;
use quant_core::Strategy;
use quant_data::load_csv;
use quant_strategies::{RegimeConfig, StrategyParams, StrategyRegistry};
use serde_json::Value;
use tracing::info;

use crate::cli::{BacktestArgs, OutputFormat};

pub fn run(args: BacktestArgs, config: &AppConfig) -> Result<()> {
    info!("Starting backtest for strategy: {}", args.strategy);

    // Create strategy
    let registry = StrategyRegistry::new();
    let fields = strategy_fields(config.strategy_params(args.strategy), args.params.as_deref())?;
    let symbol = args.symbol.as_deref().unwrap_or(&config.trading.symbol);
    let strategy = registry
        .create(args.strategy.key(), fields, symbol)
        .context("Failed to create strategy")?;

    // Load data
    let bars = load_csv(&args.data)
        .with_context(|| format!("Failed to load data from {}", args.data.display()))?;

    // Create backtest config
    let mut backtest_config = config.backtest_config();
    if args.max_drawdown.is_some() {
        backtest_config.max_drawdown_pct = args.max_drawdown;
    }
    if args.regime && backtest_config.regime_filter.is_none() {
        backtest_config.regime_filter = Some(RegimeConfig {
            atr_period: config.regime.atr_period,
            atr_threshold: config.regime.atr_threshold,
        });
    }

    // Run backtest
    let result = BacktestEngine::new(backtest_config.clone()).run(&bars, &strategy);
    let report = BacktestReport::new(
        strategy.name(),
        strategy.params().describe(),
        backtest_config,
        result,
    );

    // Output results
    let rendered = match args.output {
        OutputFormat::Text => report.summary(),
        OutputFormat::Json => report.to_json()?,
        OutputFormat::Csv => report.trades_to_csv()?,
    };
    println!("{}", rendered);

    // Save if requested
    if let Some(save_path) = &args.save {
        std::fs::write(save_path, &rendered)
            .with_context(|| format!("Failed to write {}", save_path.display()))?;
        info!("Results saved to {:?}", save_path);
    }

    Ok(())
}

/// Configured parameters as a JSON object, with `overrides` merged on top.
fn strategy_fields(params: StrategyParams, overrides: Option<&str>) -> Result<Value> {
    let mut fields = serde_json::to_value(params)?;
    let Some(overrides) = overrides else {
        return Ok(fields);
    };

    let overrides: Value =
        serde_json::from_str(overrides).context("--params is not valid JSON")?;
    match (&mut fields, overrides) {
        (Value::Object(fields), Value::Object(overrides)) => fields.extend(overrides),
        _ => bail!("--params must be a JSON object"),
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quant_core::StrategyKind;

    #[test]
    fn test_strategy_fields_merge() {
        let params = StrategyParams::default_for(StrategyKind::SmaCrossover);
        let fields = strategy_fields(params, Some(r#"{"fast_period": 5}"#)).unwrap();

        assert_eq!(fields["fast_period"], 5);
        assert_eq!(fields["slow_period"], 100);

        let strategy = StrategyRegistry::new()
            .create("sma", fields, "ETH/USD")
            .unwrap();
        assert_eq!(strategy.params().symbol(), "ETH/USD");
        assert_eq!(strategy.warmup_period(), 101);
    }

    #[test]
    fn test_strategy_fields_rejects_non_object() {
        let params = StrategyParams::default_for(StrategyKind::RsiReversion);
        assert!(strategy_fields(params.clone(), Some("[1, 2]")).is_err());
        assert!(strategy_fields(params.clone(), Some("{oops")).is_err());
        assert!(strategy_fields(params, None).unwrap().is_object());
    }
}
