//! Trading signals emitted by strategies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Why a signal was emitted.
///
/// Every exit path has its own tag so trade logs can attribute P&L to the
/// rule that closed the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalReason {
    /// Fast SMA crossed above the slow SMA
    #[serde(rename = "sma-cross-up")]
    SmaCrossUp,
    /// Fast SMA crossed below the slow SMA
    #[serde(rename = "sma-cross-down")]
    SmaCrossDown,
    /// RSI crossed up through the oversold threshold
    #[serde(rename = "rsi-cross-up")]
    RsiCrossUp,
    /// RSI crossed down through the overbought threshold
    #[serde(rename = "rsi-cross-down")]
    RsiCrossDown,
    /// MACD histogram turned positive
    #[serde(rename = "macd-cross-up")]
    MacdCrossUp,
    /// MACD histogram turned negative
    #[serde(rename = "macd-cross-down")]
    MacdCrossDown,
    /// Close below the lower Bollinger band
    #[serde(rename = "bb_lower")]
    BbLower,
    /// Close above the upper Bollinger band
    #[serde(rename = "bb_upper")]
    BbUpper,
    /// Hard stop below entry
    #[serde(rename = "stop-loss")]
    StopLoss,
    /// Profit target reached
    #[serde(rename = "take-profit")]
    TakeProfit,
    /// Fell back from the high-water mark
    #[serde(rename = "trailing-stop")]
    TrailingStop,
    /// Held longer than the maximum hold duration
    #[serde(rename = "time-cap")]
    TimeCap,
    /// Closed by the simulator at the end of the series
    #[serde(rename = "force-close")]
    ForceClose,
}

impl SignalReason {
    /// The tag used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalReason::SmaCrossUp => "sma-cross-up",
            SignalReason::SmaCrossDown => "sma-cross-down",
            SignalReason::RsiCrossUp => "rsi-cross-up",
            SignalReason::RsiCrossDown => "rsi-cross-down",
            SignalReason::MacdCrossUp => "macd-cross-up",
            SignalReason::MacdCrossDown => "macd-cross-down",
            SignalReason::BbLower => "bb_lower",
            SignalReason::BbUpper => "bb_upper",
            SignalReason::StopLoss => "stop-loss",
            SignalReason::TakeProfit => "take-profit",
            SignalReason::TrailingStop => "trailing-stop",
            SignalReason::TimeCap => "time-cap",
            SignalReason::ForceClose => "force-close",
        }
    }
}

impl fmt::Display for SignalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trade instruction produced by a strategy on one bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Buy or sell
    pub side: Side,
    /// Quantity of the base asset, always positive
    pub amount: f64,
    /// Optional tag describing the rule that fired
    pub reason: Option<SignalReason>,
    /// Close of the bar that produced the signal
    pub price: f64,
    /// Open time of the bar that produced the signal
    pub timestamp: i64,
}

impl Signal {
    /// Create a buy signal.
    pub fn buy(amount: f64, price: f64, timestamp: i64) -> Self {
        Self {
            side: Side::Buy,
            amount,
            reason: None,
            price,
            timestamp,
        }
    }

    /// Create a sell signal.
    pub fn sell(amount: f64, price: f64, timestamp: i64) -> Self {
        Self {
            side: Side::Sell,
            amount,
            reason: None,
            price,
            timestamp,
        }
    }

    /// Attach a reason tag.
    pub fn with_reason(mut self, reason: SignalReason) -> Self {
        self.reason = Some(reason);
        self
    }

    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.side == Side::Sell
    }
}
