//! Logging for the CLI.

mod logging;

pub use logging::setup_logging;
