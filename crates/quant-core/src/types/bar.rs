//! OHLCV (Open, High, Low, Close, Volume) bar type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed OHLCV interval.
///
/// Bars are ordered by `open_time` (strictly increasing) but the spacing between
/// consecutive bars is not guaranteed to be uniform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Interval open time, Unix milliseconds
    pub open_time: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Traded volume
    pub volume: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(open_time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Create a flat bar where only the close is known.
    ///
    /// Open, high and low all equal the close and volume is zero, so the
    /// bar's own range is zero and its true range is the gap to the
    /// previous close.
    pub fn from_close(open_time: i64, close: f64) -> Self {
        Self::new(open_time, close, close, close, close, 0.0)
    }

    /// Get the open time as a DateTime.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.open_time)
    }

    /// Calculate the true range against the previous bar's close.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        match prev_close {
            Some(pc) => {
                let hl = self.high - self.low;
                let hc = (self.high - pc).abs();
                let lc = (self.low - pc).abs();
                hl.max(hc).max(lc)
            }
            None => self.high - self.low,
        }
    }
}

/// Build flat bars from a closing-price series.
///
/// Bar `i` opens at `i * interval_ms`, which keeps open times strictly
/// increasing for any positive interval.
pub fn bars_from_closes(closes: &[f64], interval_ms: i64) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar::from_close(i as i64 * interval_ms, close))
        .collect()
}

/// Extract close prices as a vector.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
