//! Backtest simulator and parameter grid search.
//!
//! Replays a strategy over a bar series with fees and slippage, sweeps
//! parameter grids in parallel, and renders the results.

mod engine;
mod grid;
mod report;
mod statistics;

pub use engine::{run_backtest, run_backtest_bars, BacktestConfig, BacktestEngine, BacktestResult, Trade};
pub use grid::{grid_search, rank, CancelFlag, GridResult, GridSearch, ParamGrid, RankBy};
pub use report::{grid_table, BacktestReport};
pub use statistics::BacktestStats;
