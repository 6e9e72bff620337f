//! SMA Crossover Strategy.
//!
//! Buys when the fast SMA crosses above the slow SMA and sells the full base
//! balance when it crosses back below. A hard stop below the entry price is
//! checked first on every bar.

use crate::orders::{
    enter_long, exit_full_balance, quote_fraction_amount, stop_hit, validate_sizing,
};
use quant_core::{
    closes, error::StrategyError, BalanceProvider, Bar, Signal, SignalReason, Strategy,
    StrategyConfig, StrategyKind, StrategyState,
};
use quant_indicators::sma_prev_now;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the SMA Crossover strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmaCrossoverConfig {
    /// Trading pair, `BASE/QUOTE`
    pub symbol: String,
    /// Fast moving average period
    pub fast_period: usize,
    /// Slow moving average period
    pub slow_period: usize,
    /// Fraction of the free quote balance spent per entry
    pub order_fraction: f64,
    /// Stop distance below entry, as a fraction
    pub stop_loss_pct: f64,
}

impl Default for SmaCrossoverConfig {
    fn default() -> Self {
        Self {
            symbol: "SOL/USD".to_string(),
            fast_period: 10,
            slow_period: 100,
            order_fraction: 0.02,
            stop_loss_pct: 0.01,
        }
    }
}

impl StrategyConfig for SmaCrossoverConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.fast_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Fast period must be greater than 0".into(),
            ));
        }
        if self.fast_period >= self.slow_period {
            return Err(StrategyError::InvalidConfig(
                "Fast period must be less than slow period".into(),
            ));
        }
        validate_sizing(self.order_fraction, self.stop_loss_pct)
    }
}

/// SMA Crossover Strategy.
#[derive(Debug, Clone)]
pub struct SmaCrossover {
    config: SmaCrossoverConfig,
}

impl SmaCrossover {
    /// Create a new SMA Crossover strategy.
    pub fn new(config: SmaCrossoverConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SmaCrossoverConfig {
        &self.config
    }
}

impl Strategy for SmaCrossover {
    fn name(&self) -> &str {
        "SMA Crossover"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::SmaCrossover
    }

    fn symbol(&self) -> &str {
        &self.config.symbol
    }

    fn description(&self) -> &str {
        "Buys on a fast/slow SMA upward cross, sells on the downward cross, with a hard stop"
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

        if stop_hit(state, bar.close) {
            debug!("{}: stop-loss hit at {:.4}", symbol, bar.close);
            return exit_full_balance(state, bar, provider, symbol, SignalReason::StopLoss);
        }

        let window = closes(&history[history.len() - self.warmup_period()..]);
        let (fast_prev, fast_now) = sma_prev_now(&window, self.config.fast_period).ok()?;
        let (slow_prev, slow_now) = sma_prev_now(&window, self.config.slow_period).ok()?;

        if state.is_flat() && fast_prev <= slow_prev && fast_now > slow_now {
            debug!(
                "{}: fast SMA ({:.4}) crossed above slow SMA ({:.4})",
                symbol, fast_now, slow_now
            );
            let amount =
                quote_fraction_amount(provider, symbol, self.config.order_fraction, bar.close)?;
            return Some(enter_long(
                state,
                bar,
                amount,
                Some(self.config.stop_loss_pct),
                SignalReason::SmaCrossUp,
            ));
        }

        if state.is_long() && fast_prev >= slow_prev && fast_now < slow_now {
            debug!(
                "{}: fast SMA ({:.4}) crossed below slow SMA ({:.4})",
                symbol, fast_now, slow_now
            );
            return exit_full_balance(state, bar, provider, symbol, SignalReason::SmaCrossDown);
        }

        None
    }

    fn warmup_period(&self) -> usize {
        self.config.slow_period + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quant_core::{bars_from_closes, Side, UnlimitedBalance};

    fn create_strategy(fast: usize, slow: usize) -> SmaCrossover {
        SmaCrossover::new(SmaCrossoverConfig {
            fast_period: fast,
            slow_period: slow,
            ..Default::default()
        })
        .unwrap()
    }

    fn run(strategy: &SmaCrossover, closes: &[f64]) -> Vec<(usize, Signal)> {
        let bars = bars_from_closes(closes, 60_000);
        let provider = UnlimitedBalance::default();
        let mut state = StrategyState::new();
        (0..bars.len())
            .filter_map(|i| {
                strategy
                    .evaluate(&bars[..=i], &mut state, &provider)
                    .map(|s| (i, s))
            })
            .collect()
    }

    #[test]
    fn test_config_validation() {
        assert!(SmaCrossoverConfig::default().validate().is_ok());

        let config = SmaCrossoverConfig {
            fast_period: 20,
            slow_period: 10,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SmaCrossoverConfig {
            order_fraction: 0.0,
            ..Default::default()
        };
        assert!(SmaCrossover::new(config).is_err());
    }

    #[test]
    fn test_single_buy_on_upward_cross() {
        let strategy = create_strategy(2, 5);
        let mut closes = vec![10.0; 11];
        closes.extend([15.0, 15.0, 15.0]);

        let signals = run(&strategy, &closes);
        assert_eq!(signals.len(), 1);

        let (index, signal) = &signals[0];
        assert_eq!(*index, 11);
        assert_eq!(signal.side, Side::Buy);
        assert_eq!(signal.reason, Some(SignalReason::SmaCrossUp));
        // 2% of the stub's 1,000,000 quote balance at 15
        assert!((signal.amount - 20_000.0 / 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_sell_on_downward_cross() {
        let strategy = create_strategy(2, 5);
        let mut closes = vec![10.0; 11];
        closes.extend([15.0, 15.0, 15.0, 14.9, 14.9, 10.0, 10.0]);

        let signals = run(&strategy, &closes);
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[1].1.side, Side::Sell);
    }

    #[test]
    fn test_stop_loss_preempts_cross() {
        let strategy = create_strategy(2, 5);
        let mut closes = vec![10.0; 11];
        closes.extend([15.0, 14.0]);

        let signals = run(&strategy, &closes);
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[1].0, 12);
        assert_eq!(signals[1].1.reason, Some(SignalReason::StopLoss));
    }

    #[test]
    fn test_warmup_silence() {
        let strategy = create_strategy(2, 5);
        assert_eq!(strategy.warmup_period(), 6);

        let bars = bars_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0], 60_000);
        let mut state = StrategyState::new();
        for i in 0..bars.len() {
            assert!(strategy
                .evaluate(&bars[..=i], &mut state, &UnlimitedBalance::default())
                .is_none());
        }
        assert_eq!(state.bars_processed, 5);
    }
}
