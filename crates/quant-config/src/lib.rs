//! Layered configuration: TOML file, then `QUANT__`-prefixed environment variables.

mod settings;

pub use settings::{
    AppConfig, AppSettings, BollingerSettings, GridSettings, LoggingConfig, MacdSettings,
    RegimeSettings, RiskSettings, RsiSettings, SmaSettings, StrategyDefaults, TradingSettings,
};

use config::{Config, ConfigError, Environment, File, FileFormat};
use std::path::Path;

/// Looked up when no configuration path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Grid axes that accept comma-separated environment values.
const LIST_KEYS: [&str; 7] = [
    "grid.fast",
    "grid.slow",
    "grid.signal",
    "grid.period",
    "grid.oversold",
    "grid.overbought",
    "grid.std_dev",
];

/// Load configuration from file and environment.
///
/// An explicit `path` must exist; without one, [`DEFAULT_CONFIG_PATH`] is
/// used if present. Environment variables such as
/// `QUANT__TRADING__FEE_PCT=0.002` override file values, and grid axes take
/// lists like `QUANT__GRID__FAST=5,10,20`.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_with_env(path, environment())
}

fn environment() -> Environment {
    LIST_KEYS.iter().fold(
        Environment::with_prefix("QUANT")
            .separator("__")
            .list_separator(",")
            .try_parsing(true),
        |env, key| env.with_list_parse_key(key),
    )
}

fn load_with_env(path: Option<&Path>, env: Environment) -> Result<AppConfig, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).format(FileFormat::Toml).required(true),
        None => File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(false),
    };

    let config = Config::builder().add_source(file).add_source(env).build()?;

    config.try_deserialize()
}
