//! Volatility indicators.

use crate::require_period;
use quant_core::error::IndicatorError;
use quant_core::Bar;
use serde::{Deserialize, Serialize};

/// True range of every bar after the first.
///
/// `max(high - low, |high - prev_close|, |low - prev_close|)`, so the result
/// has one element fewer than the input.
pub fn true_ranges(bars: &[Bar]) -> Vec<f64> {
    bars.windows(2)
        .map(|w| w[1].true_range(Some(w[0].close)))
        .collect()
}

/// Average True Range over the last `period` bars.
///
/// Degrades to the mean of whatever true ranges exist when fewer than
/// `period` are available, and to `0.0` with fewer than two bars.
pub fn atr(bars: &[Bar], period: usize) -> f64 {
    let start = bars.len().saturating_sub(period + 1);
    let trs = true_ranges(&bars[start..]);
    if trs.is_empty() {
        return 0.0;
    }
    trs.iter().sum::<f64>() / trs.len() as f64
}

/// Population standard deviation (divides by N).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Bollinger Bands aligned to the input closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub lower: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
}

impl BollingerBands {
    /// `(lower, middle, upper)` at the last index, if defined.
    pub fn latest(&self) -> Option<(f64, f64, f64)> {
        Some((
            *self.lower.last()?.as_ref()?,
            *self.middle.last()?.as_ref()?,
            *self.upper.last()?.as_ref()?,
        ))
    }
}

/// Compute Bollinger Bands.
///
/// Middle is the SMA over `period`; the band half-width is `num_std_dev`
/// population standard deviations over the same window. Positions before the
/// first full window are `None`.
pub fn bollinger_bands(
    closes: &[f64],
    period: usize,
    num_std_dev: f64,
) -> Result<BollingerBands, IndicatorError> {
    require_period("Bollinger", period)?;
    if !num_std_dev.is_finite() || num_std_dev < 0.0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "Bollinger std dev multiplier must be non-negative, got {}",
            num_std_dev
        )));
    }

    let n = closes.len();
    let mut bands = BollingerBands {
        lower: vec![None; n],
        middle: vec![None; n],
        upper: vec![None; n],
    };

    for (offset, window) in closes.windows(period).enumerate() {
        let i = offset + period - 1;
        let middle = window.iter().sum::<f64>() / period as f64;
        let width = std_dev(window) * num_std_dev;
        bands.lower[i] = Some(middle - width);
        bands.middle[i] = Some(middle);
        bands.upper[i] = Some(middle + width);
    }

    Ok(bands)
}
