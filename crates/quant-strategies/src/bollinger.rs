//! Bollinger Bands Mean-Reversion Strategy.
//!
//! Buys when the close drops below the lower band and sells the full base
//! balance when it rises above the upper band.

use crate::orders::{
    enter_long, exit_full_balance, quote_fraction_amount, stop_hit, validate_sizing,
};
use quant_core::{
    closes, error::StrategyError, BalanceProvider, Bar, Signal, SignalReason, Strategy,
    StrategyConfig, StrategyKind, StrategyState,
};
use quant_indicators::bollinger_bands;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the Bollinger strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerConfig {
    /// Trading pair, `BASE/QUOTE`
    pub symbol: String,
    /// Band lookback period
    pub period: usize,
    /// Band width in standard deviations
    pub num_std_dev: f64,
    /// Fraction of the free quote balance spent per entry
    pub order_fraction: f64,
    /// Stop distance below entry, as a fraction
    pub stop_loss_pct: f64,
}

impl Default for BollingerConfig {
    fn default() -> Self {
        Self {
            symbol: "SOL/USD".to_string(),
            period: 20,
            num_std_dev: 2.0,
            order_fraction: 0.02,
            stop_loss_pct: 0.01,
        }
    }
}

impl StrategyConfig for BollingerConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.period < 2 {
            return Err(StrategyError::InvalidConfig(
                "Bollinger period must be at least 2".into(),
            ));
        }
        if self.num_std_dev.is_nan() || self.num_std_dev <= 0.0 {
            return Err(StrategyError::InvalidConfig(
                "Standard deviation multiplier must be positive".into(),
            ));
        }
        validate_sizing(self.order_fraction, self.stop_loss_pct)
    }
}

/// Bollinger Bands Mean-Reversion Strategy.
#[derive(Debug, Clone)]
pub struct BollingerReversion {
    config: BollingerConfig,
}

impl BollingerReversion {
    /// Create a new Bollinger strategy.
    pub fn new(config: BollingerConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BollingerConfig {
        &self.config
    }
}

impl Strategy for BollingerReversion {
    fn name(&self) -> &str {
        "Bollinger Reversion"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::BollingerReversion
    }

    fn symbol(&self) -> &str {
        &self.config.symbol
    }

    fn description(&self) -> &str {
        "Buys below the lower Bollinger band, sells above the upper band"
    }

    fn evaluate(
        &self,
        history: &[Bar],
        state: &mut StrategyState,
        provider: &dyn BalanceProvider,
    ) -> Option<Signal> {
        state.bars_processed += 1;

        if !self.is_warmed_up(history.len()) {
            return None;
        }

        let bar = history.last()?;
        let symbol = self.config.symbol.as_str();
        let price = bar.close;

        if stop_hit(state, price) {
            debug!("{}: stop-loss hit at {:.4}", symbol, price);
            return exit_full_balance(state, bar, provider, symbol, SignalReason::StopLoss);
        }

        let window = closes(&history[history.len() - self.config.period..]);
        let (lower, _, upper) =
            bollinger_bands(&window, self.config.period, self.config.num_std_dev)
                .ok()?
                .latest()?;

        if state.is_flat() && price < lower {
            debug!("{}: close {:.4} below lower band {:.4}", symbol, price, lower);
            let amount =
                quote_fraction_amount(provider, symbol, self.config.order_fraction, price)?;
            return Some(enter_long(
                state,
                bar,
                amount,
                Some(self.config.stop_loss_pct),
                SignalReason::BbLower,
            ));
        }

        if state.is_long() && price > upper {
            debug!("{}: close {:.4} above upper band {:.4}", symbol, price, upper);
            return exit_full_balance(state, bar, provider, symbol, SignalReason::BbUpper);
        }

        None
    }

    fn warmup_period(&self) -> usize {
        self.config.period
    }
}
