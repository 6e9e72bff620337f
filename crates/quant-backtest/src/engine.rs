//! Backtesting engine.

use quant_core::{
    bars_from_closes, Bar, SignalReason, Strategy, StrategyState, Timeframe, UnlimitedBalance,
};
use quant_risk::{DrawdownKillSwitch, DrawdownSnapshot};
use quant_strategies::{detect_regime, evaluate_gated, RegimeConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Backtest configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Fee charged on each fill, as a fraction
    pub fee_pct: f64,
    /// Adverse price move assumed on each fill, as a fraction
    pub slippage_pct: f64,
    /// Stop opening positions once realized drawdown reaches this fraction
    pub max_drawdown_pct: Option<f64>,
    /// Skip strategies whose family is inactive in the detected regime
    pub regime_filter: Option<RegimeConfig>,
    /// Bar spacing used when a bare close series is replayed
    pub timeframe: Timeframe,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            fee_pct: 0.001,
            slippage_pct: 0.0005,
            max_drawdown_pct: None,
            regime_filter: None,
            timeframe: Timeframe::default(),
        }
    }
}

impl BacktestConfig {
    pub fn with_costs(fee_pct: f64, slippage_pct: f64) -> Self {
        Self {
            fee_pct,
            slippage_pct,
            ..Default::default()
        }
    }

    /// Cost basis of one unit bought at `price`.
    pub fn entry_cost(&self, price: f64) -> f64 {
        price * (1.0 + self.slippage_pct) * (1.0 + self.fee_pct)
    }

    /// Proceeds of one unit sold at `price`.
    pub fn exit_proceeds(&self, price: f64) -> f64 {
        price * (1.0 - self.slippage_pct) * (1.0 - self.fee_pct)
    }
}

/// A completed round trip, per unit of the base asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_index: usize,
    pub exit_index: usize,
    /// Raw close at entry
    pub entry_price: f64,
    /// Raw close at exit
    pub exit_price: f64,
    /// Entry price after slippage and fee
    pub entry_cost: f64,
    /// Exit price after slippage and fee
    pub exit_proceeds: f64,
    pub pnl: f64,
    pub exit_reason: SignalReason,
    pub entry_time: i64,
    pub exit_time: i64,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn bars_held(&self) -> usize {
        self.exit_index - self.entry_index
    }
}

/// Output of one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Completed trades in chronological order
    pub trades: Vec<Trade>,
    /// Sum of `trades[i].pnl` in trade order
    pub total_pnl: f64,
    pub trade_count: usize,
    /// Bars handed to the strategy
    pub bars_processed: usize,
    /// Whether the drawdown kill-switch stopped new entries
    pub halted_by_kill_switch: bool,
    /// Final kill-switch state, when one was configured
    pub kill_switch: Option<DrawdownSnapshot>,
}

impl BacktestResult {
    fn from_trades(
        trades: Vec<Trade>,
        bars_processed: usize,
        kill_switch: Option<DrawdownSnapshot>,
    ) -> Self {
        let total_pnl = trades.iter().map(|t| t.pnl).sum();
        Self {
            trade_count: trades.len(),
            trades,
            total_pnl,
            bars_processed,
            halted_by_kill_switch: kill_switch.is_some_and(|k| k.tripped),
            kill_switch,
        }
    }

    /// Fraction of trades with positive P&L, 0 when there are none.
    pub fn win_rate(&self) -> f64 {
        if self.trades.is_empty() {
            return 0.0;
        }
        self.trades.iter().filter(|t| t.is_win()).count() as f64 / self.trades.len() as f64
    }
}

struct OpenPosition {
    index: usize,
    price: f64,
    cost: f64,
    time: i64,
}

/// Backtesting engine.
///
/// Replays bars through one strategy with a fresh [`StrategyState`] and an
/// [`UnlimitedBalance`] provider. Any position still open after the last bar
/// is force-closed at the final close with full fee and slippage applied.
#[derive(Debug, Clone, Default)]
pub struct BacktestEngine {
    config: BacktestConfig,
}

impl BacktestEngine {
    /// Create a new backtest engine.
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Run a backtest over `bars`.
    pub fn run<S: Strategy + ?Sized>(&self, bars: &[Bar], strategy: &S) -> BacktestResult {
        let provider = UnlimitedBalance::default();
        let mut state = StrategyState::new();
        let mut kill_switch = self
            .config
            .max_drawdown_pct
            .and_then(|pct| match DrawdownKillSwitch::new(pct) {
                Ok(switch) => Some(switch),
                Err(e) => {
                    warn!("Kill-switch disabled: {}", e);
                    None
                }
            });

        let mut trades: Vec<Trade> = Vec::new();
        let mut position: Option<OpenPosition> = None;
        let last_index = bars.len().saturating_sub(1);
        let start = strategy.warmup_period().saturating_sub(1);

        for i in start..bars.len() {
            let history = &bars[..=i];
            let signal = match &self.config.regime_filter {
                Some(regime) => evaluate_gated(
                    strategy,
                    history,
                    &mut state,
                    &provider,
                    detect_regime(history, regime),
                ),
                None => strategy.evaluate(history, &mut state, &provider),
            };
            let Some(signal) = signal else {
                continue;
            };
            let bar = &bars[i];

            if signal.is_buy() && position.is_none() {
                let halted = kill_switch.as_ref().is_some_and(|k| k.is_tripped());
                if halted || i == last_index {
                    // Unfilled entry: keep the strategy flat alongside the simulator
                    debug!("Bar {}: entry not filled (halted: {})", i, halted);
                    state.close_position();
                    continue;
                }
                position = Some(OpenPosition {
                    index: i,
                    price: bar.close,
                    cost: self.config.entry_cost(bar.close),
                    time: bar.open_time,
                });
                debug!("Bar {}: bought at {:.4}", i, bar.close);
            } else if signal.is_sell() {
                if let Some(open) = position.take() {
                    let reason = signal.reason.unwrap_or(SignalReason::ForceClose);
                    let trade = self.close(open, i, bar, reason);
                    debug!("Bar {}: sold at {:.4}, pnl {:.6}", i, bar.close, trade.pnl);
                    if let Some(switch) = kill_switch.as_mut() {
                        switch.record(trade.pnl);
                    }
                    trades.push(trade);
                }
            }
        }

        if let (Some(open), Some(bar)) = (position.take(), bars.last()) {
            let trade = self.close(open, last_index, bar, SignalReason::ForceClose);
            debug!("Force-closed at {:.4}, pnl {:.6}", bar.close, trade.pnl);
            if let Some(switch) = kill_switch.as_mut() {
                switch.record(trade.pnl);
            }
            trades.push(trade);
        }

        let snapshot = kill_switch.as_ref().map(DrawdownKillSwitch::snapshot);
        let result = BacktestResult::from_trades(trades, state.bars_processed, snapshot);
        info!(
            "Backtest {} over {} bars: {} trades, total P&L {:.6}",
            strategy.name(),
            bars.len(),
            result.trade_count,
            result.total_pnl
        );
        result
    }

    fn close(&self, open: OpenPosition, index: usize, bar: &Bar, reason: SignalReason) -> Trade {
        let proceeds = self.config.exit_proceeds(bar.close);
        Trade {
            entry_index: open.index,
            exit_index: index,
            entry_price: open.price,
            exit_price: bar.close,
            entry_cost: open.cost,
            exit_proceeds: proceeds,
            pnl: proceeds - open.cost,
            exit_reason: reason,
            entry_time: open.time,
            exit_time: bar.open_time,
        }
    }
}

/// Replay a close series through a freshly built strategy.
///
/// Bars are synthesised from the closes at the default timeframe's spacing.
pub fn run_backtest<S, F>(
    closes: &[f64],
    factory: F,
    fee_pct: f64,
    slippage_pct: f64,
) -> BacktestResult
where
    S: Strategy,
    F: FnOnce() -> S,
{
    let config = BacktestConfig::with_costs(fee_pct, slippage_pct);
    let bars = bars_from_closes(closes, config.timeframe.as_millis());
    run_backtest_bars(&bars, &factory(), &config)
}

/// Replay full bars through `strategy`.
pub fn run_backtest_bars<S: Strategy + ?Sized>(
    bars: &[Bar],
    strategy: &S,
    config: &BacktestConfig,
) -> BacktestResult {
    BacktestEngine::new(config.clone()).run(bars, strategy)
}
