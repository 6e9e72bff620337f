//! Error types for the strategy and backtest engine.

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum QuantError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),
}

/// Strategy-specific errors.
///
/// Raised while building a strategy from configuration. Evaluation itself
/// never fails: warm-up and provider outages produce no signal instead.
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Strategy not found: {0}")]
    NotFound(String),
}

/// Indicator calculation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Balance and precision provider errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
}

/// Data source errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("No data available for the requested source")]
    NoDataAvailable,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for engine operations.
pub type QuantResult<T> = Result<T, QuantError>;
