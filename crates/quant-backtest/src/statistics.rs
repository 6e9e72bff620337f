//! Backtest statistics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{BacktestResult, Trade};

/// Summary statistics over a run's trades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestStats {
    /// Total number of trades
    pub total_trades: usize,
    /// Number of winning trades
    pub winning_trades: usize,
    /// Number of losing trades
    pub losing_trades: usize,
    /// Trades with exactly zero P&L
    pub breakeven_trades: usize,
    /// Win rate percentage
    pub win_rate_pct: f64,
    /// Sum of trade P&L
    pub total_pnl: f64,
    /// Average profit per winning trade
    pub avg_win: f64,
    /// Average loss per losing trade, as a positive number
    pub avg_loss: f64,
    /// Profit factor (gross profit / gross loss), 0 without losses
    pub profit_factor: f64,
    /// Largest peak-to-trough fall of cumulative P&L, in quote units
    pub max_drawdown: f64,
    /// Mean bars between entry and exit
    pub avg_bars_held: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    /// P&L grouped by exit reason
    pub pnl_by_reason: BTreeMap<String, f64>,
    /// Number of bars processed
    pub bars_processed: usize,
}

impl BacktestStats {
    /// Compute statistics for a list of trades.
    pub fn from_trades(trades: &[Trade]) -> Self {
        let mut stats = Self {
            total_trades: trades.len(),
            ..Default::default()
        };
        if trades.is_empty() {
            return stats;
        }

        let mut total_profit = 0.0;
        let mut total_loss = 0.0;
        let mut cumulative = 0.0;
        let mut peak = 0.0_f64;
        let mut held = 0usize;
        stats.best_trade = f64::NEG_INFINITY;
        stats.worst_trade = f64::INFINITY;

        for trade in trades {
            if trade.pnl > 0.0 {
                stats.winning_trades += 1;
                total_profit += trade.pnl;
            } else if trade.pnl < 0.0 {
                stats.losing_trades += 1;
                total_loss += trade.pnl.abs();
            } else {
                stats.breakeven_trades += 1;
            }

            cumulative += trade.pnl;
            peak = peak.max(cumulative);
            stats.max_drawdown = stats.max_drawdown.max(peak - cumulative);

            held += trade.bars_held();
            stats.best_trade = stats.best_trade.max(trade.pnl);
            stats.worst_trade = stats.worst_trade.min(trade.pnl);
            *stats
                .pnl_by_reason
                .entry(trade.exit_reason.to_string())
                .or_insert(0.0) += trade.pnl;
        }

        stats.total_pnl = cumulative;
        stats.win_rate_pct = stats.winning_trades as f64 * 100.0 / trades.len() as f64;
        stats.avg_bars_held = held as f64 / trades.len() as f64;

        if stats.winning_trades > 0 {
            stats.avg_win = total_profit / stats.winning_trades as f64;
        }
        if stats.losing_trades > 0 {
            stats.avg_loss = total_loss / stats.losing_trades as f64;
        }
        if total_loss > 0.0 {
            stats.profit_factor = total_profit / total_loss;
        }

        stats
    }

    /// Statistics for a finished run.
    pub fn from_result(result: &BacktestResult) -> Self {
        Self {
            bars_processed: result.bars_processed,
            ..Self::from_trades(&result.trades)
        }
    }
}
