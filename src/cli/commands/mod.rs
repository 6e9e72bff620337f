//! CLI command implementations.

pub mod backtest;
pub mod grid;
pub mod strategies;
pub mod validate;
