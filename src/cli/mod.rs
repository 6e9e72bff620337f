//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use quant_backtest::RankBy;
use quant_core::StrategyKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quant")]
#[command(author, version, about = "Indicator strategies, backtesting and parameter grid search")]
pub struct Cli {
    /// Configuration file path (defaults to config/default.toml if present)
    #[arg(short, long, env = "QUANT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level, overriding the configuration
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a backtest over a CSV price series
    Backtest(BacktestArgs),
    /// Sweep a parameter grid and rank the results
    Grid(GridArgs),
    /// List available strategies, or show one by name
    Strategies {
        /// Strategy key or alias (e.g. sma, bb)
        name: Option<String>,
    },
    /// Validate configuration and print the effective settings
    ValidateConfig,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(clap::Args)]
pub struct BacktestArgs {
    /// Strategy to backtest (sma, rsi, macd, bollinger)
    #[arg(short, long)]
    pub strategy: StrategyKind,

    /// Data file (CSV)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Trading pair, overriding the configuration
    #[arg(short = 'S', long)]
    pub symbol: Option<String>,

    /// Strategy parameters as a JSON object, merged over the configuration
    /// (e.g. '{"fast_period": 5, "slow_period": 20}')
    #[arg(short, long)]
    pub params: Option<String>,

    /// Stop opening positions at this realized drawdown (e.g. 0.2)
    #[arg(long)]
    pub max_drawdown: Option<f64>,

    /// Gate the strategy by ATR market regime
    #[arg(long)]
    pub regime: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Save the rendered output to a file
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct GridArgs {
    /// Strategy family to sweep (sma, rsi, macd, bollinger)
    #[arg(short, long)]
    pub strategy: StrategyKind,

    /// Data file (CSV)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Fast periods (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub fast: Vec<usize>,

    /// Slow periods (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub slow: Vec<usize>,

    /// MACD signal periods (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub signal: Vec<usize>,

    /// RSI or Bollinger periods (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub period: Vec<usize>,

    /// Bollinger band widths (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub std_dev: Vec<f64>,

    /// RSI oversold levels (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub oversold: Vec<f64>,

    /// RSI overbought levels (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub overbought: Vec<f64>,

    /// Rank by pnl or win-rate
    #[arg(long, default_value = "pnl")]
    pub rank: RankBy,

    /// Number of results to show
    #[arg(long)]
    pub top: Option<usize>,

    /// Run combinations one at a time
    #[arg(long)]
    pub sequential: bool,

    /// Save all results as JSON
    #[arg(long)]
    pub save: Option<PathBuf>,
}
