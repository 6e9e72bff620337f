//! Risk controls for the backtest and live loops.
//!
//! Provides a drawdown kill-switch fed with realized trade P&L.

mod drawdown;

pub use drawdown::{DrawdownKillSwitch, DrawdownSnapshot};
