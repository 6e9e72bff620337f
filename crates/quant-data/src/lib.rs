//! Historical bar loading.

mod csv_source;

pub use csv_source::{infer_timeframe, parse_timestamp, read_bars, CsvDataSource};

use quant_core::error::DataError;
use quant_core::Bar;
use std::path::Path;

/// Load bars from a CSV file.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Bar>, DataError> {
    CsvDataSource::new(path)?.load()
}
