//! CSV data source.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use quant_core::error::DataError;
use quant_core::{Bar, Timeframe};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// CSV record format.
///
/// Only the timestamp and close are required; a missing open, high or low
/// falls back to the close.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(
        alias = "Date",
        alias = "date",
        alias = "Timestamp",
        alias = "open_time",
        alias = "time"
    )]
    timestamp: String,
    #[serde(alias = "Open", default)]
    open: Option<f64>,
    #[serde(alias = "High", default)]
    high: Option<f64>,
    #[serde(alias = "Low", default)]
    low: Option<f64>,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(alias = "Volume", default)]
    volume: Option<f64>,
}

impl CsvRecord {
    fn into_bar(self) -> Result<Bar, DataError> {
        let open_time = parse_timestamp(&self.timestamp)?;
        let close = self.close;
        Ok(Bar::new(
            open_time,
            self.open.unwrap_or(close),
            self.high.unwrap_or(close),
            self.low.unwrap_or(close),
            close,
            self.volume.unwrap_or(0.0),
        ))
    }
}

/// CSV data source for historical bars.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    path: PathBuf,
}

impl CsvDataSource {
    /// Create a new CSV data source.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::NoDataAvailable);
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all bars, sorted by open time with duplicate timestamps dropped.
    pub fn load(&self) -> Result<Vec<Bar>, DataError> {
        let file = std::fs::File::open(&self.path)?;
        let bars = read_bars(file)?;
        let spacing = infer_timeframe(&bars)
            .map(|timeframe| format!("{} ", timeframe))
            .unwrap_or_default();
        info!(
            "Loaded {} {}bars from {} ({} to {})",
            bars.len(),
            spacing,
            self.path.display(),
            format_time(bars.first()),
            format_time(bars.last())
        );
        Ok(bars)
    }
}

fn format_time(bar: Option<&Bar>) -> String {
    bar.and_then(Bar::datetime)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "?".to_string())
}

/// Read bars from any CSV reader with a header row.
pub fn read_bars<R: Read>(reader: R) -> Result<Vec<Bar>, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (row, result) in reader.deserialize().enumerate() {
        let record: CsvRecord =
            result.map_err(|e| DataError::ParseError(format!("row {}: {}", row + 1, e)))?;
        bars.push(record.into_bar()?);
    }

    if bars.is_empty() {
        return Err(DataError::NoDataAvailable);
    }

    // Stable sort keeps the first row of each duplicated timestamp
    bars.sort_by_key(|b| b.open_time);
    let before = bars.len();
    bars.dedup_by_key(|b| b.open_time);
    if bars.len() < before {
        debug!("Dropped {} rows with duplicate timestamps", before - bars.len());
    }

    Ok(bars)
}

/// Timeframe matching the smallest gap between consecutive bars.
pub fn infer_timeframe(bars: &[Bar]) -> Option<Timeframe> {
    let spacing = bars
        .windows(2)
        .map(|pair| pair[1].open_time - pair[0].open_time)
        .filter(|gap| *gap > 0)
        .min()?;
    Timeframe::from_millis(spacing)
}

/// Parse a timestamp into Unix milliseconds.
///
/// Accepts RFC 3339, `%Y-%m-%d %H:%M:%S`, plain dates, and Unix seconds or
/// milliseconds (more than 10 digits).
pub fn parse_timestamp(value: &str) -> Result<i64, DataError> {
    if let Ok(ts) = value.parse::<i64>() {
        return Ok(if ts.abs() > 10_000_000_000 { ts } else { ts * 1000 });
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp_millis());
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc().timestamp_millis());
            }
        }
    }

    Err(DataError::ParseError(format!("Could not parse date: {}", value)))
}
