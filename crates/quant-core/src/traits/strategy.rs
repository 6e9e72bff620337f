//! Strategy trait definitions.

use crate::error::StrategyError;
use crate::traits::BalanceProvider;
use crate::types::{Bar, Signal, StrategyState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration trait for strategies.
pub trait StrategyConfig: Send + Sync + Clone + 'static {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), StrategyError>;
}

/// Broad behaviour of a strategy family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingStyle {
    TrendFollowing,
    MeanReversion,
}

impl fmt::Display for TradingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradingStyle::TrendFollowing => f.write_str("trend-following"),
            TradingStyle::MeanReversion => f.write_str("mean-reversion"),
        }
    }
}

/// Volatility regime of the market, derived from ATR relative to price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketRegime {
    Trending,
    Ranging,
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketRegime::Trending => write!(f, "trending"),
            MarketRegime::Ranging => write!(f, "ranging"),
        }
    }
}

/// Tag identifying a strategy family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    SmaCrossover,
    RsiReversion,
    MacdCrossover,
    BollingerReversion,
}

impl StrategyKind {
    /// Short registry key.
    pub fn key(&self) -> &'static str {
        match self {
            StrategyKind::SmaCrossover => "sma",
            StrategyKind::RsiReversion => "rsi",
            StrategyKind::MacdCrossover => "macd",
            StrategyKind::BollingerReversion => "bollinger",
        }
    }

    pub fn style(&self) -> TradingStyle {
        match self {
            StrategyKind::SmaCrossover | StrategyKind::MacdCrossover => TradingStyle::TrendFollowing,
            StrategyKind::RsiReversion | StrategyKind::BollingerReversion => {
                TradingStyle::MeanReversion
            }
        }
    }

    /// Trend-following strategies run only while trending, mean-reversion
    /// strategies only while ranging.
    pub fn is_active_in(&self, regime: MarketRegime) -> bool {
        matches!(
            (self.style(), regime),
            (TradingStyle::TrendFollowing, MarketRegime::Trending)
                | (TradingStyle::MeanReversion, MarketRegime::Ranging)
        )
    }

    /// All strategy families.
    pub fn all() -> &'static [StrategyKind] {
        &[
            StrategyKind::SmaCrossover,
            StrategyKind::RsiReversion,
            StrategyKind::MacdCrossover,
            StrategyKind::BollingerReversion,
        ]
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sma" | "sma_crossover" | "ma_crossover" => Ok(StrategyKind::SmaCrossover),
            "rsi" | "rsi_reversion" => Ok(StrategyKind::RsiReversion),
            "macd" | "macd_crossover" => Ok(StrategyKind::MacdCrossover),
            "bollinger" | "bb" | "bollinger_reversion" => Ok(StrategyKind::BollingerReversion),
            _ => Err(StrategyError::NotFound(s.to_string())),
        }
    }
}

/// Core strategy trait.
///
/// A strategy holds only its immutable parameters. Everything that changes
/// from bar to bar lives in a [`StrategyState`] owned by the caller, so a
/// fresh state is all it takes to rerun a strategy from scratch.
pub trait Strategy: Send + Sync {
    /// Get the unique name of this strategy.
    fn name(&self) -> &str;

    /// Family tag, used for regime gating.
    fn kind(&self) -> StrategyKind;

    /// Trading pair in `BASE/QUOTE` form.
    fn symbol(&self) -> &str;

    /// Evaluate the newest bar and optionally generate a signal.
    ///
    /// # Arguments
    /// * `history` - All bars observed so far, oldest first; the last element is the current bar
    /// * `state` - This strategy instance's position state
    /// * `provider` - Balance and precision lookups used for sizing
    ///
    /// # Returns
    /// * `Some(Signal)` if a trading action should be taken
    /// * `None` during warm-up, when no rule fires, or when a provider call fails
    fn evaluate(
        &self,
        history: &[Bar],
        state: &mut StrategyState,
        provider: &dyn BalanceProvider,
    ) -> Option<Signal>;

    /// Minimum number of bars before the strategy can produce a signal.
    fn warmup_period(&self) -> usize;

    /// Check if the strategy is warmed up (has enough data).
    fn is_warmed_up(&self, bars_available: usize) -> bool {
        bars_available >= self.warmup_period()
    }

    /// Get a description of the strategy.
    fn description(&self) -> &str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::UnlimitedBalance;
    use std::str::FromStr;

    struct TestStrategy {
        warmup: usize,
    }

    impl Strategy for TestStrategy {
        fn name(&self) -> &str {
            "test"
        }

        fn kind(&self) -> StrategyKind {
            StrategyKind::SmaCrossover
        }

        fn symbol(&self) -> &str {
            "SOL/USD"
        }

        fn evaluate(
            &self,
            _history: &[Bar],
            state: &mut StrategyState,
            _provider: &dyn BalanceProvider,
        ) -> Option<Signal> {
            state.bars_processed += 1;
            None
        }

        fn warmup_period(&self) -> usize {
            self.warmup
        }
    }

    #[test]
    fn test_strategy_warmup() {
        let strategy = TestStrategy { warmup: 20 };

        assert!(!strategy.is_warmed_up(10));
        assert!(!strategy.is_warmed_up(19));
        assert!(strategy.is_warmed_up(20));
        assert!(strategy.is_warmed_up(100));
    }

    #[test]
    fn test_state_is_external() {
        let strategy = TestStrategy { warmup: 1 };
        let mut state = StrategyState::new();
        let bars = [Bar::from_close(0, 1.0)];
        strategy.evaluate(&bars, &mut state, &UnlimitedBalance::default());
        strategy.evaluate(&bars, &mut state, &UnlimitedBalance::default());
        assert_eq!(state.bars_processed, 2);
    }

    #[test]
    fn test_kind_styles() {
        assert_eq!(StrategyKind::SmaCrossover.style(), TradingStyle::TrendFollowing);
        assert_eq!(StrategyKind::MacdCrossover.style(), TradingStyle::TrendFollowing);
        assert_eq!(StrategyKind::RsiReversion.style(), TradingStyle::MeanReversion);
        assert_eq!(StrategyKind::BollingerReversion.style(), TradingStyle::MeanReversion);
    }

    #[test]
    fn test_regime_gate() {
        assert!(StrategyKind::SmaCrossover.is_active_in(MarketRegime::Trending));
        assert!(!StrategyKind::SmaCrossover.is_active_in(MarketRegime::Ranging));
        assert!(StrategyKind::RsiReversion.is_active_in(MarketRegime::Ranging));
        assert!(!StrategyKind::BollingerReversion.is_active_in(MarketRegime::Trending));
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(StrategyKind::from_str("SMA").unwrap(), StrategyKind::SmaCrossover);
        assert_eq!(StrategyKind::from_str("bb").unwrap(), StrategyKind::BollingerReversion);
        assert!(StrategyKind::from_str("momentum").is_err());
        for kind in StrategyKind::all() {
            assert_eq!(StrategyKind::from_str(kind.key()).unwrap(), *kind);
        }
    }
}
