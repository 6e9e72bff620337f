//! Moving average indicators.

use crate::{require_len, require_period};
use quant_core::error::IndicatorError;

/// Simple Moving Average of the last `period` values.
pub fn sma(values: &[f64], period: usize) -> Result<f64, IndicatorError> {
    require_period("SMA", period)?;
    require_len(values, period)?;

    let window = &values[values.len() - period..];
    Ok(window.iter().sum::<f64>() / period as f64)
}

/// SMA on the previous bar and on the current bar, for crossover checks.
///
/// Needs `period + 1` values.
pub fn sma_prev_now(values: &[f64], period: usize) -> Result<(f64, f64), IndicatorError> {
    require_period("SMA", period)?;
    require_len(values, period + 1)?;

    let prev = sma(&values[..values.len() - 1], period)?;
    let now = sma(values, period)?;
    Ok((prev, now))
}

/// Exponential Moving Average aligned to the input.
///
/// Seeded with the simple average of the first `period` values, then
/// `ema_t = (price_t - ema_{t-1}) * alpha + ema_{t-1}` with `alpha = 2 / (period + 1)`.
/// The first `period - 1` positions are `None`; a short input is all `None`.
pub fn ema(values: &[f64], period: usize) -> Result<Vec<Option<f64>>, IndicatorError> {
    require_period("EMA", period)?;

    let mut result = vec![None; values.len()];
    if values.len() < period {
        return Ok(result);
    }

    let alpha = 2.0 / (period as f64 + 1.0);

    // Initialize with SMA
    let mut current = values[..period].iter().sum::<f64>() / period as f64;
    result[period - 1] = Some(current);

    for (i, &price) in values.iter().enumerate().skip(period) {
        current += (price - current) * alpha;
        result[i] = Some(current);
    }

    Ok(result)
}
