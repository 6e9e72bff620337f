//! MACD Crossover Strategy.
//!
//! Buys when the MACD histogram turns positive and sells the full base
//! balance when it turns negative, behind the same hard stop as the SMA
//! crossover.

use crate::orders::{
    enter_long, exit_full_balance, quote_fraction_amount, stop_hit, validate_sizing,
};
use quant_core::{
    closes, error::StrategyError, BalanceProvider, Bar, Signal, SignalReason, Strategy,
    StrategyConfig, StrategyKind, StrategyState,
};
use quant_indicators::macd_lines;
use serde::{Deserialize, Serialize};
use tracing::debug;

const LOOKBACK_MULTIPLE: usize = 10;

/// Configuration for the MACD strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdCrossoverConfig {
    /// Trading pair, `BASE/QUOTE`
    pub symbol: String,
    /// Fast EMA period
    pub fast_period: usize,
    /// Slow EMA period
    pub slow_period: usize,
    /// Signal line EMA period
    pub signal_period: usize,
    /// Fraction of the free quote balance spent per entry
    pub order_fraction: f64,
    /// Stop distance below entry, as a fraction
    pub stop_loss_pct: f64,
}

impl Default for MacdCrossoverConfig {
    fn default() -> Self {
        Self {
            symbol: "SOL/USD".to_string(),
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
            order_fraction: 0.02,
            stop_loss_pct: 0.01,
        }
    }
}

impl StrategyConfig for MacdCrossoverConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.fast_period == 0 || self.signal_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "MACD periods must be greater than 0".into(),
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

/// MACD Crossover Strategy.
#[derive(Debug, Clone)]
pub struct MacdCrossover {
    config: MacdCrossoverConfig,
}

impl MacdCrossover {
    /// Create a new MACD strategy.
    pub fn new(config: MacdCrossoverConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MacdCrossoverConfig {
        &self.config
    }

    /// Trailing bars fed to the EMAs. Older bars have no weight left in
    /// the histogram at `f64` precision.
    fn lookback(&self) -> usize {
        (self.config.slow_period + self.config.signal_period) * LOOKBACK_MULTIPLE
    }
}

impl Strategy for MacdCrossover {
    fn name(&self) -> &str {
        "MACD Crossover"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::MacdCrossover
    }

    fn symbol(&self) -> &str {
        &self.config.symbol
    }

    fn description(&self) -> &str {
        "Buys when the MACD histogram turns positive, sells when it turns negative"
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

        let start = history.len().saturating_sub(self.lookback());
        let lines = macd_lines(
            &closes(&history[start..]),
            self.config.fast_period,
            self.config.slow_period,
            self.config.signal_period,
        )
        .ok()?;
        let (prev, now) = lines.last_two_histogram()?;

        if state.is_flat() && prev <= 0.0 && now > 0.0 {
            debug!("{}: MACD histogram turned positive ({:.6})", symbol, now);
            let amount =
                quote_fraction_amount(provider, symbol, self.config.order_fraction, bar.close)?;
            return Some(enter_long(
                state,
                bar,
                amount,
                Some(self.config.stop_loss_pct),
                SignalReason::MacdCrossUp,
            ));
        }

        if state.is_long() && prev >= 0.0 && now < 0.0 {
            debug!("{}: MACD histogram turned negative ({:.6})", symbol, now);
            return exit_full_balance(state, bar, provider, symbol, SignalReason::MacdCrossDown);
        }

        None
    }

    fn warmup_period(&self) -> usize {
        self.config.slow_period + self.config.signal_period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quant_core::{bars_from_closes, Side, UnlimitedBalance};

    fn create_strategy(stop_loss_pct: f64) -> MacdCrossover {
        MacdCrossover::new(MacdCrossoverConfig {
            fast_period: 2,
            slow_period: 4,
            signal_period: 2,
            stop_loss_pct,
            ..Default::default()
        })
        .unwrap()
    }

    fn run(strategy: &MacdCrossover, closes: &[f64]) -> Vec<(usize, Signal)> {
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

    const CLOSES: [f64; 9] = [10.0, 9.0, 8.0, 7.0, 6.0, 7.0, 8.0, 7.0, 6.0];

    #[test]
    fn test_config_validation() {
        assert!(MacdCrossoverConfig::default().validate().is_ok());

        let config = MacdCrossoverConfig {
            fast_period: 26,
            slow_period: 12,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_warmup_silence() {
        let strategy = create_strategy(0.01);
        assert_eq!(strategy.warmup_period(), 6);

        let bars = bars_from_closes(&CLOSES, 60_000);
        let mut state = StrategyState::new();
        for i in 0..5 {
            assert!(strategy
                .evaluate(&bars[..=i], &mut state, &UnlimitedBalance::default())
                .is_none());
        }
        assert!(state.is_flat());
        assert_eq!(state.bars_processed, 5);
    }

    #[test]
    fn test_histogram_cross_buy_and_sell() {
        let strategy = create_strategy(0.5);
        let signals = run(&strategy, &CLOSES);

        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].0, 5);
        assert_eq!(signals[0].1.side, Side::Buy);
        assert_eq!(signals[0].1.reason, Some(SignalReason::MacdCrossUp));
        assert_eq!(signals[1].0, 8);
        assert_eq!(signals[1].1.side, Side::Sell);
        assert_eq!(signals[1].1.reason, Some(SignalReason::MacdCrossDown));
    }

    #[test]
    fn test_stop_loss_preempts_cross() {
        // Entry at 7 puts the 1% stop at 6.93; the final close of 6 hits it
        let strategy = create_strategy(0.01);
        let signals = run(&strategy, &CLOSES);

        assert_eq!(signals.len(), 2);
        assert_eq!(signals[1].0, 8);
        assert_eq!(signals[1].1.reason, Some(SignalReason::StopLoss));
    }

    #[test]
    fn test_trailing_window_matches_full_history() {
        let strategy = MacdCrossover::new(MacdCrossoverConfig::default()).unwrap();
        assert_eq!(strategy.lookback(), 350);

        let closes: Vec<f64> = (0..1200)
            .map(|i| 100.0 + (i as f64 * 0.07).sin() * 5.0 + i as f64 * 0.01)
            .collect();
        let full = macd_lines(&closes, 12, 26, 9).unwrap();
        let trailing = macd_lines(&closes[closes.len() - strategy.lookback()..], 12, 26, 9).unwrap();

        let (full_prev, full_now) = full.last_two_histogram().unwrap();
        let (prev, now) = trailing.last_two_histogram().unwrap();
        assert!((full_prev - prev).abs() < 1e-8);
        assert!((full_now - now).abs() < 1e-8);
    }
}
