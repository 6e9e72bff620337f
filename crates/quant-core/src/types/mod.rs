//! Core data types.

mod bar;
mod signal;
mod state;
mod timeframe;

pub use bar::{bars_from_closes, closes, Bar};
pub use signal::{Side, Signal, SignalReason};
pub use state::{PositionSide, StrategyState};
pub use timeframe::Timeframe;
