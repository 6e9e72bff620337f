//! Configuration structures.

use quant_backtest::{BacktestConfig, ParamGrid};
use quant_core::{QuantError, QuantResult, StrategyKind, Timeframe};
use quant_strategies::{
    BollingerConfig, MacdCrossoverConfig, RegimeConfig, RsiReversionConfig, SmaCrossoverConfig,
    StrategyParams,
};
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub trading: TradingSettings,
    #[serde(default)]
    pub strategies: StrategyDefaults,
    #[serde(default)]
    pub regime: RegimeSettings,
    #[serde(default)]
    pub risk: RiskSettings,
    #[serde(default)]
    pub grid: GridSettings,
}

impl AppConfig {
    /// Parameters for one family: the family defaults plus the trading settings.
    pub fn strategy_params(&self, kind: StrategyKind) -> StrategyParams {
        let t = &self.trading;
        let s = &self.strategies;
        match kind {
            StrategyKind::SmaCrossover => StrategyParams::Sma(SmaCrossoverConfig {
                symbol: t.symbol.clone(),
                fast_period: s.sma.fast_period,
                slow_period: s.sma.slow_period,
                order_fraction: t.order_fraction,
                stop_loss_pct: t.stop_loss_pct,
            }),
            StrategyKind::RsiReversion => StrategyParams::Rsi(RsiReversionConfig {
                symbol: t.symbol.clone(),
                period: s.rsi.period,
                oversold: s.rsi.oversold,
                overbought: s.rsi.overbought,
                quote_amount: t.quote_amount,
                take_profit_pct: s.rsi.take_profit_pct,
                trail_pct: s.rsi.trail_pct,
                max_hold_mins: s.rsi.max_hold_mins,
            }),
            StrategyKind::MacdCrossover => StrategyParams::Macd(MacdCrossoverConfig {
                symbol: t.symbol.clone(),
                fast_period: s.macd.fast_period,
                slow_period: s.macd.slow_period,
                signal_period: s.macd.signal_period,
                order_fraction: t.order_fraction,
                stop_loss_pct: t.stop_loss_pct,
            }),
            StrategyKind::BollingerReversion => StrategyParams::Bollinger(BollingerConfig {
                symbol: t.symbol.clone(),
                period: s.bollinger.period,
                num_std_dev: s.bollinger.num_std_dev,
                order_fraction: t.order_fraction,
                stop_loss_pct: t.stop_loss_pct,
            }),
        }
    }

    /// Simulator settings.
    pub fn backtest_config(&self) -> BacktestConfig {
        BacktestConfig {
            fee_pct: self.trading.fee_pct,
            slippage_pct: self.trading.slippage_pct,
            max_drawdown_pct: self.risk.max_drawdown_pct,
            regime_filter: self.regime.enabled.then(|| RegimeConfig {
                atr_period: self.regime.atr_period,
                atr_threshold: self.regime.atr_threshold,
            }),
            timeframe: self.trading.timeframe,
        }
    }

    /// The configured sweep for one family.
    pub fn param_grid(&self, kind: StrategyKind) -> ParamGrid {
        let g = &self.grid;
        match kind {
            StrategyKind::SmaCrossover => ParamGrid::Sma {
                fast: g.fast.clone(),
                slow: g.slow.clone(),
            },
            StrategyKind::RsiReversion => ParamGrid::Rsi {
                period: g.period.clone(),
                oversold: g.oversold.clone(),
                overbought: g.overbought.clone(),
            },
            StrategyKind::MacdCrossover => ParamGrid::Macd {
                fast: g.fast.clone(),
                slow: g.slow.clone(),
                signal: g.signal.clone(),
            },
            StrategyKind::BollingerReversion => ParamGrid::Bollinger {
                period: g.period.clone(),
                std_dev: g.std_dev.clone(),
            },
        }
    }

    /// Check that every family builds and the cost settings are sane.
    pub fn validate(&self) -> QuantResult<()> {
        for kind in StrategyKind::all() {
            self.strategy_params(*kind).build()?;
        }
        for (name, value) in [
            ("fee_pct", self.trading.fee_pct),
            ("slippage_pct", self.trading.slippage_pct),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(QuantError::Config(format!(
                    "{} must be in [0, 1), got {}",
                    name, value
                )));
            }
        }
        if let Some(limit) = self.risk.max_drawdown_pct {
            if limit.is_nan() || limit <= 0.0 {
                return Err(QuantError::Config(format!(
                    "max_drawdown_pct must be positive, got {}",
                    limit
                )));
            }
        }
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// General app settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "quant".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Daily-rolling log file, in addition to stderr
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Market and order settings shared by every strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingSettings {
    /// Trading pair, `BASE/QUOTE`
    pub symbol: String,
    pub timeframe: Timeframe,
    /// Quote spent per RSI entry
    pub quote_amount: f64,
    /// Fraction of the quote balance per crossover/band entry
    pub order_fraction: f64,
    pub stop_loss_pct: f64,
    pub fee_pct: f64,
    pub slippage_pct: f64,
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            symbol: "SOL/USD".to_string(),
            timeframe: Timeframe::Minute5,
            quote_amount: 10.0,
            order_fraction: 0.02,
            stop_loss_pct: 0.01,
            fee_pct: 0.001,
            slippage_pct: 0.0005,
        }
    }
}

/// Default parameters per strategy family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StrategyDefaults {
    pub sma: SmaSettings,
    pub rsi: RsiSettings,
    pub macd: MacdSettings,
    pub bollinger: BollingerSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmaSettings {
    pub fast_period: usize,
    pub slow_period: usize,
}

impl Default for SmaSettings {
    fn default() -> Self {
        Self {
            fast_period: 10,
            slow_period: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiSettings {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub take_profit_pct: f64,
    pub trail_pct: f64,
    pub max_hold_mins: u64,
}

impl Default for RsiSettings {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: 25.0,
            overbought: 75.0,
            take_profit_pct: 0.005,
            trail_pct: 0.002,
            max_hold_mins: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdSettings {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl Default for MacdSettings {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerSettings {
    pub period: usize,
    pub num_std_dev: f64,
}

impl Default for BollingerSettings {
    fn default() -> Self {
        Self {
            period: 20,
            num_std_dev: 2.0,
        }
    }
}

/// ATR regime gating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeSettings {
    /// Gate strategies by regime during backtests
    pub enabled: bool,
    pub atr_period: usize,
    pub atr_threshold: f64,
}

impl Default for RegimeSettings {
    fn default() -> Self {
        let defaults = RegimeConfig::default();
        Self {
            enabled: false,
            atr_period: defaults.atr_period,
            atr_threshold: defaults.atr_threshold,
        }
    }
}

/// Risk management settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RiskSettings {
    /// Kill-switch limit on realized drawdown, disabled when unset
    pub max_drawdown_pct: Option<f64>,
}

/// Default grid-search parameter lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Fast periods (SMA, MACD)
    pub fast: Vec<usize>,
    /// Slow periods (SMA, MACD)
    pub slow: Vec<usize>,
    /// MACD signal periods
    pub signal: Vec<usize>,
    /// RSI and Bollinger periods
    pub period: Vec<usize>,
    pub oversold: Vec<f64>,
    pub overbought: Vec<f64>,
    pub std_dev: Vec<f64>,
    /// Results shown after ranking
    pub top_n: usize,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            fast: vec![5, 10, 15, 20],
            slow: vec![30, 50, 100],
            signal: vec![9],
            period: vec![14, 20],
            oversold: vec![25.0, 30.0],
            overbought: vec![70.0, 75.0],
            std_dev: vec![2.0],
            top_n: 5,
        }
    }
}
