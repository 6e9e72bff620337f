//! Trading strategy implementations.
//!
//! Every strategy is immutable once built; its per-bar state lives in a
//! [`quant_core::StrategyState`] owned by the caller.
//! - SMA Crossover (trend-following)
//! - MACD Crossover (trend-following)
//! - RSI Mean-Reversion with take-profit, trailing stop and time cap
//! - Bollinger Bands Mean-Reversion

mod bollinger;
mod macd_crossover;
mod orders;
mod regime;
mod registry;
mod rsi_reversion;
mod sma_crossover;
mod strategy;

pub use bollinger::{BollingerConfig, BollingerReversion};
pub use macd_crossover::{MacdCrossover, MacdCrossoverConfig};
pub use regime::{detect_regime, RegimeConfig};
pub use registry::{StrategyInfo, StrategyRegistry};
pub use rsi_reversion::{RsiReversion, RsiReversionConfig};
pub use sma_crossover::{SmaCrossover, SmaCrossoverConfig};
pub use strategy::{evaluate_gated, StrategyParams, TradingStrategy};
