//! Backtest report generation.

use serde::{Deserialize, Serialize};

use crate::{BacktestConfig, BacktestResult, BacktestStats, GridResult};

/// Complete backtest report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Strategy name
    pub strategy: String,
    /// Parameters, `key=value` form
    pub params: String,
    /// Configuration used
    pub config: BacktestConfig,
    /// Statistics
    pub stats: BacktestStats,
    /// Raw run output
    pub result: BacktestResult,
}

impl BacktestReport {
    pub fn new(
        strategy: impl Into<String>,
        params: impl Into<String>,
        config: BacktestConfig,
        result: BacktestResult,
    ) -> Self {
        Self {
            strategy: strategy.into(),
            params: params.into(),
            config,
            stats: BacktestStats::from_result(&result),
            result,
        }
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                     BACKTEST REPORT                        \n");
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str("SETUP\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Strategy:            {}\n", self.strategy));
        s.push_str(&format!("  Parameters:          {}\n", self.params));
        s.push_str(&format!(
            "  Fee / Slippage:      {:.4}% / {:.4}%\n",
            self.config.fee_pct * 100.0,
            self.config.slippage_pct * 100.0
        ));
        if let (Some(limit), Some(switch)) =
            (self.config.max_drawdown_pct, &self.result.kill_switch)
        {
            s.push_str(&format!(
                "  Kill-switch:         {:.2}%, worst {:.2}%{}\n",
                limit * 100.0,
                switch.max_drawdown * 100.0,
                if switch.tripped { " (tripped)" } else { "" }
            ));
        }
        s.push('\n');

        s.push_str("PERFORMANCE (per unit)\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Total P&L:           {:.6}\n", self.stats.total_pnl));
        s.push_str(&format!("  Max Drawdown:        {:.6}\n", self.stats.max_drawdown));
        s.push_str(&format!("  Profit Factor:       {:.2}\n", self.stats.profit_factor));
        s.push_str(&format!("  Best Trade:          {:.6}\n", self.stats.best_trade));
        s.push_str(&format!("  Worst Trade:         {:.6}\n", self.stats.worst_trade));
        s.push('\n');

        s.push_str("TRADE STATISTICS\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Total Trades:        {}\n", self.stats.total_trades));
        s.push_str(&format!("  Winning Trades:      {}\n", self.stats.winning_trades));
        s.push_str(&format!("  Losing Trades:       {}\n", self.stats.losing_trades));
        s.push_str(&format!("  Breakeven Trades:    {}\n", self.stats.breakeven_trades));
        s.push_str(&format!("  Win Rate:            {:.2}%\n", self.stats.win_rate_pct));
        s.push_str(&format!("  Avg Win:             {:.6}\n", self.stats.avg_win));
        s.push_str(&format!("  Avg Loss:            {:.6}\n", self.stats.avg_loss));
        s.push_str(&format!("  Avg Bars Held:       {:.1}\n", self.stats.avg_bars_held));
        s.push('\n');

        if !self.stats.pnl_by_reason.is_empty() {
            s.push_str("EXITS\n");
            s.push_str("───────────────────────────────────────────────────────────\n");
            for (reason, pnl) in &self.stats.pnl_by_reason {
                s.push_str(&format!("  {:<21}{:.6}\n", format!("{}:", reason), pnl));
            }
            s.push('\n');
        }

        s.push_str("EXECUTION\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Bars Processed:      {}\n", self.stats.bars_processed));
        s.push('\n');

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export the trades as CSV.
    pub fn trades_to_csv(&self) -> Result<String, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            "entry_index",
            "exit_index",
            "entry_price",
            "exit_price",
            "pnl",
            "reason",
        ])?;
        for trade in &self.result.trades {
            writer.write_record([
                trade.entry_index.to_string(),
                trade.exit_index.to_string(),
                trade.entry_price.to_string(),
                trade.exit_price.to_string(),
                trade.pnl.to_string(),
                trade.exit_reason.to_string(),
            ])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Render ranked grid results as a table.
pub fn grid_table(results: &[GridResult]) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "{:>4}  {:<36} {:>14} {:>7} {:>9}\n",
        "#", "Parameters", "Total P&L", "Trades", "Win Rate"
    ));
    s.push_str(&format!("{}\n", "─".repeat(74)));
    for (i, result) in results.iter().enumerate() {
        s.push_str(&format!(
            "{:>4}  {:<36} {:>14.6} {:>7} {:>8.2}%\n",
            i + 1,
            result.params.describe(),
            result.total_pnl,
            result.trade_count,
            result.win_rate * 100.0
        ));
    }
    s
}
