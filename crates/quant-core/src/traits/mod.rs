//! Core traits.

mod provider;
mod strategy;

pub use provider::{split_symbol, BalanceProvider, UnlimitedBalance};
pub use strategy::{MarketRegime, Strategy, StrategyConfig, StrategyKind, TradingStyle};
