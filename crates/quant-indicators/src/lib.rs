//! Technical indicators.
//!
//! Every function here is pure: the same input always yields the same output
//! and nothing is cached between calls.
//! - Moving averages (SMA, EMA)
//! - Momentum indicators (RSI, MACD)
//! - Volatility indicators (true range, ATR, standard deviation, Bollinger Bands)
//!
//! Series-valued indicators return vectors aligned to their input, with
//! `None` at positions where the indicator is not yet defined.

pub mod momentum;
pub mod moving_average;
pub mod volatility;

pub use momentum::{macd_lines, rsi, MacdLines};
pub use moving_average::{ema, sma, sma_prev_now};
pub use volatility::{atr, bollinger_bands, std_dev, true_ranges, BollingerBands};

use quant_core::error::IndicatorError;

pub(crate) fn require_period(name: &str, period: usize) -> Result<(), IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "{} period must be greater than 0",
            name
        )));
    }
    Ok(())
}

pub(crate) fn require_len(values: &[f64], required: usize) -> Result<(), IndicatorError> {
    if values.len() < required {
        return Err(IndicatorError::InsufficientData {
            required,
            available: values.len(),
        });
    }
    Ok(())
}
