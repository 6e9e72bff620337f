//! Mutable per-strategy position state.

use serde::{Deserialize, Serialize};

/// Whether a strategy currently holds a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    #[default]
    Flat,
    Long,
}

/// Position state owned by the caller and handed to every `evaluate` call.
///
/// One instance belongs to exactly one (symbol, strategy, parameter-set)
/// tuple. Grid points and backtest runs each start from `StrategyState::new()`
/// so nothing carries over between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyState {
    /// Flat or long
    pub position: PositionSide,
    /// Price of the bar that opened the position
    pub entry_price: Option<f64>,
    /// Open time of the bar that opened the position
    pub entry_time: Option<i64>,
    /// Hard stop, if the strategy uses one
    pub stop_loss_price: Option<f64>,
    /// Highest close since entry (trailing-stop high-water mark)
    pub highest_price: Option<f64>,
    /// Quantity bought at entry
    pub position_amount: f64,
    /// Previous bar's RSI, for cross detection through the thresholds
    pub prev_indicator: Option<f64>,
    /// Number of evaluate calls seen
    pub bars_processed: usize,
    /// Number of signals emitted
    pub signals_generated: usize,
}

impl StrategyState {
    /// Create a fresh flat state.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_long(&self) -> bool {
        self.position == PositionSide::Long
    }

    #[inline]
    pub fn is_flat(&self) -> bool {
        self.position == PositionSide::Flat
    }

    /// Record a new long position.
    ///
    /// All entry fields are written together so a position is never half-open.
    pub fn open_long(&mut self, price: f64, time: i64, amount: f64, stop_loss_price: Option<f64>) {
        self.position = PositionSide::Long;
        self.entry_price = Some(price);
        self.entry_time = Some(time);
        self.stop_loss_price = stop_loss_price;
        self.highest_price = Some(price);
        self.position_amount = amount;
    }

    /// Clear all position fields, keeping the indicator cache and counters.
    pub fn close_position(&mut self) {
        self.position = PositionSide::Flat;
        self.entry_price = None;
        self.entry_time = None;
        self.stop_loss_price = None;
        self.highest_price = None;
        self.position_amount = 0.0;
    }

    /// Raise the high-water mark to `price` if it is higher.
    pub fn update_high_water(&mut self, price: f64) -> f64 {
        let high = self.highest_price.map_or(price, |h| h.max(price));
        self.highest_price = Some(high);
        high
    }
}
