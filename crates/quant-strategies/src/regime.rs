//! ATR-based market regime detection.

use quant_core::MarketRegime;
use quant_core::Bar;
use quant_indicators::atr;
use serde::{Deserialize, Serialize};

/// Regime detection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeConfig {
    /// ATR lookback
    pub atr_period: usize,
    /// ATR / close above which the market counts as trending
    pub atr_threshold: f64,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            atr_period: 14,
            atr_threshold: 0.003,
        }
    }
}

/// Classify the market from the latest bars.
///
/// Trending when `atr / last_close` exceeds the threshold. Too little
/// history (ATR of zero) or a non-positive close is treated as ranging.
pub fn detect_regime(bars: &[Bar], config: &RegimeConfig) -> MarketRegime {
    let Some(last) = bars.last() else {
        return MarketRegime::Ranging;
    };
    if last.close <= 0.0 {
        return MarketRegime::Ranging;
    }

    let volatility = atr(bars, config.atr_period) / last.close;
    if volatility > config.atr_threshold {
        MarketRegime::Trending
    } else {
        MarketRegime::Ranging
    }
}
