//! Closed set of strategy variants and their serialisable parameters.

use crate::{
    BollingerConfig, BollingerReversion, MacdCrossover, MacdCrossoverConfig, RsiReversion,
    RsiReversionConfig, SmaCrossover, SmaCrossoverConfig,
};
use quant_core::{
    error::StrategyError, BalanceProvider, Bar, MarketRegime, Signal, Strategy, StrategyKind,
    StrategyState,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One of the built-in strategies.
#[derive(Debug, Clone)]
pub enum TradingStrategy {
    Sma(SmaCrossover),
    Rsi(RsiReversion),
    Macd(MacdCrossover),
    Bollinger(BollingerReversion),
}

impl TradingStrategy {
    fn inner(&self) -> &dyn Strategy {
        match self {
            TradingStrategy::Sma(s) => s,
            TradingStrategy::Rsi(s) => s,
            TradingStrategy::Macd(s) => s,
            TradingStrategy::Bollinger(s) => s,
        }
    }

    /// The parameters this strategy was built from.
    pub fn params(&self) -> StrategyParams {
        match self {
            TradingStrategy::Sma(s) => StrategyParams::Sma(s.config().clone()),
            TradingStrategy::Rsi(s) => StrategyParams::Rsi(s.config().clone()),
            TradingStrategy::Macd(s) => StrategyParams::Macd(s.config().clone()),
            TradingStrategy::Bollinger(s) => StrategyParams::Bollinger(s.config().clone()),
        }
    }
}

/// Evaluate `strategy` only if its family is active in `regime`.
///
/// A gated-out bar counts towards `bars_processed` and changes nothing else.
/// That includes an open position: its stop-loss and exit rules are not
/// checked until the regime turns back in the strategy's favour.
pub fn evaluate_gated<S: Strategy + ?Sized>(
    strategy: &S,
    history: &[Bar],
    state: &mut StrategyState,
    provider: &dyn BalanceProvider,
    regime: MarketRegime,
) -> Option<Signal> {
    if !strategy.kind().is_active_in(regime) {
        debug!("{}: skipped while {}", strategy.name(), regime);
        state.bars_processed += 1;
        return None;
    }
    strategy.evaluate(history, state, provider)
}

impl Strategy for TradingStrategy {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn kind(&self) -> StrategyKind {
        self.inner().kind()
    }

    fn symbol(&self) -> &str {
        self.inner().symbol()
    }

    fn description(&self) -> &str {
        self.inner().description()
    }

    fn evaluate(
        &self,
        history: &[Bar],
        state: &mut StrategyState,
        provider: &dyn BalanceProvider,
    ) -> Option<Signal> {
        self.inner().evaluate(history, state, provider)
    }

    fn warmup_period(&self) -> usize {
        self.inner().warmup_period()
    }
}

/// Parameters for any built-in strategy, tagged by family.
///
/// ```json
/// { "strategy": "sma", "fast_period": 10, "slow_period": 100 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyParams {
    Sma(SmaCrossoverConfig),
    Rsi(RsiReversionConfig),
    Macd(MacdCrossoverConfig),
    Bollinger(BollingerConfig),
}

impl StrategyParams {
    /// Default parameters for a family.
    pub fn default_for(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::SmaCrossover => StrategyParams::Sma(SmaCrossoverConfig::default()),
            StrategyKind::RsiReversion => StrategyParams::Rsi(RsiReversionConfig::default()),
            StrategyKind::MacdCrossover => StrategyParams::Macd(MacdCrossoverConfig::default()),
            StrategyKind::BollingerReversion => {
                StrategyParams::Bollinger(BollingerConfig::default())
            }
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyParams::Sma(_) => StrategyKind::SmaCrossover,
            StrategyParams::Rsi(_) => StrategyKind::RsiReversion,
            StrategyParams::Macd(_) => StrategyKind::MacdCrossover,
            StrategyParams::Bollinger(_) => StrategyKind::BollingerReversion,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            StrategyParams::Sma(c) => &c.symbol,
            StrategyParams::Rsi(c) => &c.symbol,
            StrategyParams::Macd(c) => &c.symbol,
            StrategyParams::Bollinger(c) => &c.symbol,
        }
    }

    /// Replace the trading pair.
    pub fn with_symbol(mut self, symbol: &str) -> Self {
        let slot = match &mut self {
            StrategyParams::Sma(c) => &mut c.symbol,
            StrategyParams::Rsi(c) => &mut c.symbol,
            StrategyParams::Macd(c) => &mut c.symbol,
            StrategyParams::Bollinger(c) => &mut c.symbol,
        };
        *slot = symbol.to_string();
        self
    }

    /// Validate and construct the strategy.
    pub fn build(&self) -> Result<TradingStrategy, StrategyError> {
        Ok(match self {
            StrategyParams::Sma(c) => TradingStrategy::Sma(SmaCrossover::new(c.clone())?),
            StrategyParams::Rsi(c) => TradingStrategy::Rsi(RsiReversion::new(c.clone())?),
            StrategyParams::Macd(c) => TradingStrategy::Macd(MacdCrossover::new(c.clone())?),
            StrategyParams::Bollinger(c) => {
                TradingStrategy::Bollinger(BollingerReversion::new(c.clone())?)
            }
        })
    }

    /// Compact `key=value` rendering of the tunable parameters.
    pub fn describe(&self) -> String {
        match self {
            StrategyParams::Sma(c) => format!("fast={} slow={}", c.fast_period, c.slow_period),
            StrategyParams::Rsi(c) => format!(
                "period={} oversold={} overbought={}",
                c.period, c.oversold, c.overbought
            ),
            StrategyParams::Macd(c) => format!(
                "fast={} slow={} signal={}",
                c.fast_period, c.slow_period, c.signal_period
            ),
            StrategyParams::Bollinger(c) => {
                format!("period={} std_dev={}", c.period, c.num_std_dev)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quant_core::{bars_from_closes, SignalReason, UnlimitedBalance};

    #[test]
    fn test_build_dispatches_by_kind() {
        for kind in StrategyKind::all() {
            let params = StrategyParams::default_for(*kind);
            let strategy = params.build().unwrap();
            assert_eq!(strategy.kind(), *kind);
            assert_eq!(strategy.params(), params);
            assert_eq!(strategy.symbol(), "SOL/USD");
        }
    }

    #[test]
    fn test_build_rejects_invalid_params() {
        let params = StrategyParams::Sma(SmaCrossoverConfig {
            fast_period: 50,
            slow_period: 20,
            ..Default::default()
        });
        assert!(matches!(params.build(), Err(StrategyError::InvalidConfig(_))));
    }

    #[test]
    fn test_params_json_tagging() {
        let params: StrategyParams = serde_json::from_value(serde_json::json!({
            "strategy": "macd",
            "fast_period": 5,
            "slow_period": 35,
        }))
        .unwrap();

        match &params {
            StrategyParams::Macd(c) => {
                assert_eq!(c.fast_period, 5);
                assert_eq!(c.slow_period, 35);
                assert_eq!(c.signal_period, 9);
            }
            other => panic!("unexpected variant: {:?}", other),
        }
        assert_eq!(params.describe(), "fast=5 slow=35 signal=9");
    }

    #[test]
    fn test_with_symbol() {
        let params = StrategyParams::default_for(StrategyKind::RsiReversion).with_symbol("ETH/USDT");
        assert_eq!(params.symbol(), "ETH/USDT");
        assert_eq!(params.build().unwrap().symbol(), "ETH/USDT");
    }

    #[test]
    fn test_gated_evaluation_leaves_position_untouched() {
        let strategy = StrategyParams::Bollinger(BollingerConfig {
            period: 3,
            num_std_dev: 1.0,
            ..Default::default()
        })
        .build()
        .unwrap();
        let bars = bars_from_closes(&[10.0, 10.0, 10.0, 7.0], 60_000);
        let provider = UnlimitedBalance::default();

        let mut state = StrategyState::new();
        let signal = evaluate_gated(&strategy, &bars, &mut state, &provider, MarketRegime::Trending);
        assert!(signal.is_none());
        assert!(state.is_flat());
        assert_eq!(state.bars_processed, 1);

        let signal = evaluate_gated(&strategy, &bars, &mut state, &provider, MarketRegime::Ranging);
        assert!(signal.is_some_and(|s| s.is_buy()));
        assert!(state.is_long());

        // Gated out, the stop is not checked even far below it
        let bars = bars_from_closes(&[10.0, 10.0, 10.0, 7.0, 1.0], 60_000);
        let signal = evaluate_gated(&strategy, &bars, &mut state, &provider, MarketRegime::Trending);
        assert!(signal.is_none());
        assert!(state.is_long());

        let signal = evaluate_gated(&strategy, &bars, &mut state, &provider, MarketRegime::Ranging);
        assert!(signal.is_some_and(|s| s.reason == Some(SignalReason::StopLoss)));
        assert!(state.is_flat());
    }
}
