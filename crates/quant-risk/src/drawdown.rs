//! Drawdown kill-switch.

use quant_core::{QuantError, QuantResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Point-in-time view of the kill-switch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawdownSnapshot {
    pub cumulative_pnl: f64,
    pub peak_pnl: f64,
    pub drawdown: f64,
    pub max_drawdown: f64,
    pub tripped: bool,
}

/// Halts trading once cumulative realized P&L falls too far below its peak.
///
/// Drawdown is `(peak - cumulative) / peak`, and zero while the peak is not
/// positive. Once tripped the switch stays tripped.
#[derive(Debug, Clone)]
pub struct DrawdownKillSwitch {
    max_drawdown_pct: f64,
    cumulative_pnl: f64,
    peak_pnl: f64,
    max_drawdown: f64,
    trades_recorded: usize,
    tripped: bool,
}

impl DrawdownKillSwitch {
    /// Create a kill-switch that trips at `max_drawdown_pct` (e.g. 0.10 = 10%).
    pub fn new(max_drawdown_pct: f64) -> QuantResult<Self> {
        if max_drawdown_pct.is_nan() || max_drawdown_pct <= 0.0 {
            return Err(QuantError::Config(format!(
                "max drawdown pct must be positive, got {}",
                max_drawdown_pct
            )));
        }
        Ok(Self {
            max_drawdown_pct,
            cumulative_pnl: 0.0,
            peak_pnl: 0.0,
            max_drawdown: 0.0,
            trades_recorded: 0,
            tripped: false,
        })
    }

    /// Feed one realized trade P&L. Returns whether the switch is tripped.
    pub fn record(&mut self, pnl: f64) -> bool {
        self.trades_recorded += 1;
        self.cumulative_pnl += pnl;
        if self.cumulative_pnl > self.peak_pnl {
            self.peak_pnl = self.cumulative_pnl;
        }

        let drawdown = self.drawdown();
        if drawdown > self.max_drawdown {
            self.max_drawdown = drawdown;
        }

        if !self.tripped && drawdown >= self.max_drawdown_pct {
            self.tripped = true;
            warn!(
                "Kill-switch tripped after {} trades: drawdown {:.2}% >= {:.2}%",
                self.trades_recorded,
                drawdown * 100.0,
                self.max_drawdown_pct * 100.0
            );
        }

        self.tripped
    }

    /// Current drawdown from the peak, as a fraction of the peak.
    pub fn drawdown(&self) -> f64 {
        if self.peak_pnl <= 0.0 {
            return 0.0;
        }
        (self.peak_pnl - self.cumulative_pnl) / self.peak_pnl
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped
    }

    pub fn snapshot(&self) -> DrawdownSnapshot {
        DrawdownSnapshot {
            cumulative_pnl: self.cumulative_pnl,
            peak_pnl: self.peak_pnl,
            drawdown: self.drawdown(),
            max_drawdown: self.max_drawdown,
            tripped: self.tripped,
        }
    }
}
