//! Momentum indicators.

use crate::moving_average::ema;
use crate::{require_len, require_period};
use quant_core::error::IndicatorError;
use serde::{Deserialize, Serialize};

/// Relative Strength Index over the last `period + 1` closes.
///
/// Average gain and loss are plain means of the positive and negative deltas
/// in that window; nothing is smoothed across calls. When the average loss is
/// zero the RSI is 100.
pub fn rsi(closes: &[f64], period: usize) -> Result<f64, IndicatorError> {
    require_period("RSI", period)?;
    require_len(closes, period + 1)?;

    let window = &closes[closes.len() - (period + 1)..];
    let (gains, losses) = window
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0, 0.0), |(g, l), delta| {
            if delta > 0.0 {
                (g + delta, l)
            } else {
                (g, l - delta)
            }
        });

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return Ok(100.0);
    }

    let rs = avg_gain / avg_loss;
    Ok(100.0 - 100.0 / (1.0 + rs))
}

/// MACD line, signal line and histogram aligned to the input closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdLines {
    /// Fast EMA minus slow EMA
    pub macd: Vec<Option<f64>>,
    /// EMA of the MACD line
    pub signal: Vec<Option<f64>>,
    /// MACD minus signal
    pub histogram: Vec<Option<f64>>,
}

impl MacdLines {
    /// Histogram values of the last two bars, if both are defined.
    pub fn last_two_histogram(&self) -> Option<(f64, f64)> {
        let n = self.histogram.len();
        if n < 2 {
            return None;
        }
        Some((self.histogram[n - 2]?, self.histogram[n - 1]?))
    }
}

/// Compute MACD lines.
///
/// The signal EMA runs over the defined prefix of the MACD line and is
/// left-padded with `None` back to the input length, so the first defined
/// histogram value sits at index `slow + signal - 2`.
pub fn macd_lines(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<MacdLines, IndicatorError> {
    require_period("MACD fast", fast)?;
    require_period("MACD slow", slow)?;
    require_period("MACD signal", signal)?;
    if fast >= slow {
        return Err(IndicatorError::InvalidParameter(format!(
            "MACD fast period ({}) must be less than slow period ({})",
            fast, slow
        )));
    }

    let fast_ema = ema(closes, fast)?;
    let slow_ema = ema(closes, slow)?;

    let macd: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let first_defined = macd.iter().position(Option::is_some);
    let mut signal_line = vec![None; closes.len()];
    if let Some(start) = first_defined {
        let defined: Vec<f64> = macd[start..].iter().flatten().copied().collect();
        for (offset, value) in ema(&defined, signal)?.into_iter().enumerate() {
            signal_line[start + offset] = value;
        }
    }

    let histogram = macd
        .iter()
        .zip(signal_line.iter())
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    Ok(MacdLines {
        macd,
        signal: signal_line,
        histogram,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_data() -> Vec<f64> {
        (0..50).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect()
    }

    #[test]
    fn test_rsi_bounds() {
        let data = create_test_data();
        for end in 15..data.len() {
            let value = rsi(&data[..end], 14).unwrap();
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_rsi_no_losses() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(rsi(&data, 4).unwrap(), 100.0);

        // Flat window has no losses either
        assert_eq!(rsi(&[5.0; 6], 5).unwrap(), 100.0);
    }

    #[test]
    fn test_rsi_known_value() {
        // Deltas: +2, -1, +1, -2 -> gains 3/4, losses 3/4 -> RS = 1
        let data = vec![10.0, 12.0, 11.0, 12.0, 10.0];
        assert!((rsi(&data, 4).unwrap() - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_rsi_uses_last_window_only() {
        let mut data = vec![50.0, 10.0];
        data.extend([10.0, 11.0, 12.0]);
        // Window is the last 3 closes: all gains
        assert_eq!(rsi(&data, 2).unwrap(), 100.0);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        assert!(matches!(
            rsi(&[1.0, 2.0], 2),
            Err(IndicatorError::InsufficientData {
                required: 3,
                available: 2
            })
        ));
    }

    #[test]
    fn test_macd_alignment() {
        let data = create_test_data();
        let lines = macd_lines(&data, 12, 26, 9).unwrap();

        assert_eq!(lines.macd.len(), data.len());
        assert_eq!(lines.signal.len(), data.len());
        assert_eq!(lines.histogram.len(), data.len());

        assert!(lines.macd[24].is_none());
        assert!(lines.macd[25].is_some());
        assert!(lines.histogram[32].is_none());
        assert!(lines.histogram[33].is_some());
    }

    #[test]
    fn test_macd_histogram_is_difference() {
        let data = create_test_data();
        let lines = macd_lines(&data, 3, 6, 4).unwrap();
        for i in 0..data.len() {
            if let (Some(m), Some(s), Some(h)) = (lines.macd[i], lines.signal[i], lines.histogram[i]) {
                assert!((h - (m - s)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_macd_small_periods() {
        let closes = vec![10.0, 9.0, 8.0, 7.0, 6.0, 7.0, 8.0, 7.0, 6.0];
        let lines = macd_lines(&closes, 2, 4, 2).unwrap();
        // First histogram value lands at slow + signal - 2
        assert!(lines.histogram[3].is_none());
        assert!(lines.histogram[4].is_some());
        assert!(lines.last_two_histogram().is_some());

        let short = macd_lines(&closes[..5], 2, 4, 2).unwrap();
        assert!(short.last_two_histogram().is_none());
    }

    #[test]
    fn test_macd_invalid_periods() {
        let data = create_test_data();
        assert!(matches!(
            macd_lines(&data, 26, 12, 9),
            Err(IndicatorError::InvalidParameter(_))
        ));
        assert!(macd_lines(&data, 12, 26, 0).is_err());
    }

    #[test]
    fn test_macd_short_input_is_undefined() {
        let lines = macd_lines(&[1.0, 2.0, 3.0], 2, 4, 2).unwrap();
        assert!(lines.macd.iter().all(Option::is_none));
        assert!(lines.histogram.iter().all(Option::is_none));
    }
}
