//! Core types and traits for the strategy and backtest engine.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, Timeframe)
//! - Trading signals and per-strategy position state
//! - Core traits for strategies and balance/precision providers

pub mod types;
pub mod traits;
pub mod error;

pub use error::{QuantError, QuantResult};
pub use types::*;
pub use traits::*;
