//! RSI Mean-Reversion Strategy.
//!
//! Buys a fixed quote amount when RSI crosses up through the oversold level.
//! While long, exits are checked in a fixed order and the first match wins:
//! take-profit, trailing stop, time cap, then RSI crossing down through the
//! overbought level. Exits sell the quantity bought at entry.

use crate::orders::{enter_long, exit_long, fixed_quote_amount};
use quant_core::{
    closes, error::StrategyError, BalanceProvider, Bar, Signal, SignalReason, Strategy,
    StrategyConfig, StrategyKind, StrategyState,
};
use quant_indicators::rsi;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the RSI strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiReversionConfig {
    /// Trading pair, `BASE/QUOTE`
    pub symbol: String,
    /// RSI calculation period
    pub period: usize,
    /// Entry level (buy on upward cross)
    pub oversold: f64,
    /// Exit level (sell on downward cross)
    pub overbought: f64,
    /// Quote currency spent per entry
    pub quote_amount: f64,
    /// Take-profit distance above entry
    pub take_profit_pct: f64,
    /// Trailing-stop distance below the high-water mark
    pub trail_pct: f64,
    /// Maximum holding time
    pub max_hold_mins: u64,
}

impl Default for RsiReversionConfig {
    fn default() -> Self {
        Self {
            symbol: "SOL/USD".to_string(),
            period: 14,
            oversold: 25.0,
            overbought: 75.0,
            quote_amount: 10.0,
            take_profit_pct: 0.005,
            trail_pct: 0.002,
            max_hold_mins: 15,
        }
    }
}

impl StrategyConfig for RsiReversionConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.period == 0 {
            return Err(StrategyError::InvalidConfig(
                "RSI period must be greater than 0".into(),
            ));
        }
        if self.overbought <= self.oversold {
            return Err(StrategyError::InvalidConfig(
                "Overbought must be greater than oversold".into(),
            ));
        }
        if self.overbought > 100.0 || self.oversold < 0.0 {
            return Err(StrategyError::InvalidConfig(
                "RSI thresholds must be between 0 and 100".into(),
            ));
        }
        if self.quote_amount <= 0.0 {
            return Err(StrategyError::InvalidConfig(
                "Quote amount must be positive".into(),
            ));
        }
        if self.take_profit_pct < 0.0 || !(0.0..1.0).contains(&self.trail_pct) {
            return Err(StrategyError::InvalidConfig(
                "Take-profit must be non-negative and trail pct in [0, 1)".into(),
            ));
        }
        Ok(())
    }
}

/// RSI Mean-Reversion Strategy.
#[derive(Debug, Clone)]
pub struct RsiReversion {
    config: RsiReversionConfig,
}

impl RsiReversion {
    /// Create a new RSI strategy.
    pub fn new(config: RsiReversionConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RsiReversionConfig {
        &self.config
    }

    /// First exit rule that fires for an open long, in priority order.
    ///
    /// Raises the high-water mark to the current close before anything else,
    /// so it moves on every long bar whether or not an exit fires.
    fn exit_reason(
        &self,
        state: &mut StrategyState,
        bar: &Bar,
        prev_rsi: Option<f64>,
        current_rsi: f64,
    ) -> Option<SignalReason> {
        let price = bar.close;
        let high = state.update_high_water(price);
        let entry = state.entry_price?;

        if price >= entry * (1.0 + self.config.take_profit_pct) {
            return Some(SignalReason::TakeProfit);
        }
        if price <= high * (1.0 - self.config.trail_pct) {
            return Some(SignalReason::TrailingStop);
        }
        let max_hold_ms = i64::try_from(self.config.max_hold_mins)
            .unwrap_or(i64::MAX)
            .saturating_mul(60_000);
        if state
            .entry_time
            .is_some_and(|entered| bar.open_time.saturating_sub(entered) > max_hold_ms)
        {
            return Some(SignalReason::TimeCap);
        }
        if prev_rsi.is_some_and(|prev| prev > self.config.overbought)
            && current_rsi <= self.config.overbought
        {
            return Some(SignalReason::RsiCrossDown);
        }
        None
    }
}

impl Strategy for RsiReversion {
    fn name(&self) -> &str {
        "RSI Reversion"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::RsiReversion
    }

    fn symbol(&self) -> &str {
        &self.config.symbol
    }

    fn description(&self) -> &str {
        "Buys RSI oversold recoveries; exits on take-profit, trailing stop, time cap or overbought"
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
        let window = closes(&history[history.len() - self.warmup_period()..]);
        let current = rsi(&window, self.config.period).ok()?;
        let prev = state.prev_indicator.replace(current);

        if state.is_long() {
            let reason = self.exit_reason(state, bar, prev, current)?;
            debug!(
                "{}: {} exit at {:.4} (RSI {:.2})",
                self.config.symbol, reason, bar.close, current
            );
            let amount = state.position_amount;
            return Some(exit_long(state, bar, amount, reason));
        }

        if prev.is_some_and(|p| p < self.config.oversold) && current >= self.config.oversold {
            debug!(
                "{}: RSI crossed above oversold ({:.2} -> {:.2})",
                self.config.symbol,
                prev.unwrap_or_default(),
                current
            );
            let amount = fixed_quote_amount(
                provider,
                &self.config.symbol,
                self.config.quote_amount,
                bar.close,
            )?;
            return Some(enter_long(state, bar, amount, None, SignalReason::RsiCrossUp));
        }

        None
    }

    fn warmup_period(&self) -> usize {
        self.config.period + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quant_core::error::ProviderError;
    use quant_core::{bars_from_closes, BalanceProvider, Side, UnlimitedBalance};

    /// Quote currency only; any base-balance query returns zero.
    struct QuoteOnly;

    impl BalanceProvider for QuoteOnly {
        fn free_balance(&self, asset: &str) -> Result<f64, ProviderError> {
            Ok(if asset == "USD" { 1000.0 } else { 0.0 })
        }

        fn round_to_tradable_precision(
            &self,
            _symbol: &str,
            quantity: f64,
        ) -> Result<f64, ProviderError> {
            Ok(quantity)
        }
    }

    fn create_strategy(config: RsiReversionConfig) -> RsiReversion {
        RsiReversion::new(config).unwrap()
    }

    fn small_config() -> RsiReversionConfig {
        RsiReversionConfig {
            period: 3,
            oversold: 30.0,
            overbought: 70.0,
            ..Default::default()
        }
    }

    /// A falling run (RSI 0) followed by a bounce that lifts RSI above 30.
    fn oversold_then_bounce() -> Vec<f64> {
        vec![100.0, 99.0, 98.0, 97.0, 96.0, 97.0]
    }

    #[test]
    fn test_config_validation() {
        assert!(RsiReversionConfig::default().validate().is_ok());

        let config = RsiReversionConfig {
            overbought: 30.0,
            oversold: 70.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversold_entry() {
        let strategy = create_strategy(small_config());
        let bars = bars_from_closes(&oversold_then_bounce(), 60_000);
        let provider = UnlimitedBalance::default();
        let mut state = StrategyState::new();

        let mut signals = Vec::new();
        for i in 0..bars.len() {
            if let Some(s) = strategy.evaluate(&bars[..=i], &mut state, &provider) {
                signals.push((i, s));
            }
        }

        assert_eq!(signals.len(), 1);
        let (index, signal) = &signals[0];
        assert_eq!(*index, 5);
        assert_eq!(signal.side, Side::Buy);
        assert_eq!(signal.reason, Some(SignalReason::RsiCrossUp));
        assert!((signal.amount - 10.0 / 97.0).abs() < 1e-12);

        assert!(state.is_long());
        assert_eq!(state.entry_price, Some(97.0));
        assert_eq!(state.entry_time, Some(5 * 60_000));
        assert_eq!(state.highest_price, Some(97.0));
    }

    #[test]
    fn test_take_profit_wins_over_trailing_stop() {
        let strategy = create_strategy(small_config());
        let mut state = StrategyState::new();
        state.open_long(100.0, 0, 0.1, None);
        // High-water mark well above the current price: trailing stop also fires
        state.highest_price = Some(110.0);

        let bar = Bar::from_close(60_000, 102.0);
        let reason = strategy.exit_reason(&mut state, &bar, Some(50.0), 50.0);
        assert_eq!(reason, Some(SignalReason::TakeProfit));
    }

    #[test]
    fn test_exit_priority_order() {
        let strategy = create_strategy(small_config());

        // Trailing stop before time cap
        let mut state = StrategyState::new();
        state.open_long(100.0, 0, 0.1, None);
        state.highest_price = Some(101.0);
        let late = Bar::from_close(60 * 60_000, 100.0);
        assert_eq!(
            strategy.exit_reason(&mut state, &late, Some(80.0), 60.0),
            Some(SignalReason::TrailingStop)
        );

        // Time cap before RSI cross-down
        let mut state = StrategyState::new();
        state.open_long(100.0, 0, 0.1, None);
        assert_eq!(
            strategy.exit_reason(&mut state, &late, Some(80.0), 60.0),
            Some(SignalReason::TimeCap)
        );

        // RSI cross-down
        let mut state = StrategyState::new();
        state.open_long(100.0, 0, 0.1, None);
        let early = Bar::from_close(60_000, 100.0);
        assert_eq!(
            strategy.exit_reason(&mut state, &early, Some(80.0), 60.0),
            Some(SignalReason::RsiCrossDown)
        );
        assert_eq!(strategy.exit_reason(&mut state, &early, Some(60.0), 55.0), None);
    }

    #[test]
    fn test_time_cap_is_strict() {
        let strategy = create_strategy(small_config());
        let mut state = StrategyState::new();
        state.open_long(100.0, 0, 0.1, None);

        let at_cap = Bar::from_close(15 * 60_000, 100.0);
        assert_eq!(strategy.exit_reason(&mut state, &at_cap, None, 50.0), None);
        let past_cap = Bar::from_close(15 * 60_000 + 1, 100.0);
        assert_eq!(
            strategy.exit_reason(&mut state, &past_cap, None, 50.0),
            Some(SignalReason::TimeCap)
        );
    }

    #[test]
    fn test_huge_max_hold_never_caps() {
        for max_hold_mins in [u64::MAX, i64::MAX as u64 / 60_000 + 1] {
            let strategy = create_strategy(RsiReversionConfig {
                max_hold_mins,
                ..small_config()
            });
            let mut state = StrategyState::new();
            state.open_long(100.0, 0, 0.1, None);

            let years_later = Bar::from_close(100 * 365 * 24 * 60 * 60_000, 100.0);
            assert_eq!(strategy.exit_reason(&mut state, &years_later, None, 50.0), None);
        }
    }

    #[test]
    fn test_high_water_mark_tracks_every_bar() {
        let strategy = create_strategy(small_config());
        let mut state = StrategyState::new();
        state.open_long(100.0, 0, 0.1, None);

        let bar = Bar::from_close(60_000, 100.4);
        assert_eq!(strategy.exit_reason(&mut state, &bar, None, 50.0), None);
        assert_eq!(state.highest_price, Some(100.4));
    }

    #[test]
    fn test_exit_sells_remembered_amount() {
        let strategy = create_strategy(small_config());
        let mut closes = oversold_then_bounce();
        // Take-profit on the next bar
        closes.push(98.0);
        let bars = bars_from_closes(&closes, 60_000);
        // Balance query would return 0 for the base asset
        let provider = QuoteOnly;
        let mut state = StrategyState::new();

        let mut signals = Vec::new();
        for i in 0..bars.len() {
            if let Some(s) = strategy.evaluate(&bars[..=i], &mut state, &provider) {
                signals.push(s);
            }
        }

        assert_eq!(signals.len(), 2);
        assert_eq!(signals[1].side, Side::Sell);
        assert_eq!(signals[1].reason, Some(SignalReason::TakeProfit));
        assert_eq!(signals[1].amount, signals[0].amount);
        assert!(state.is_flat());
        assert!(state.prev_indicator.is_some());
    }

    #[test]
    fn test_warmup_silence() {
        let strategy = create_strategy(small_config());
        assert_eq!(strategy.warmup_period(), 4);

        let bars = bars_from_closes(&[5.0, 4.0, 3.0], 60_000);
        let mut state = StrategyState::new();
        for i in 0..bars.len() {
            assert!(strategy
                .evaluate(&bars[..=i], &mut state, &UnlimitedBalance::default())
                .is_none());
        }
        assert_eq!(state.prev_indicator, None);
    }
}
