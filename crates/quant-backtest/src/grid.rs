//! Parameter grid search over a single price series.

use quant_core::{bars_from_closes, Bar, StrategyKind};
use quant_strategies::{
    BollingerConfig, MacdCrossoverConfig, RsiReversionConfig, SmaCrossoverConfig, StrategyParams,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{BacktestConfig, BacktestEngine};

/// Parameter lists to sweep, one variant per strategy family.
///
/// Combinations are enumerated with the first list as the outer loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ParamGrid {
    Sma {
        fast: Vec<usize>,
        slow: Vec<usize>,
    },
    Rsi {
        period: Vec<usize>,
        oversold: Vec<f64>,
        overbought: Vec<f64>,
    },
    Macd {
        fast: Vec<usize>,
        slow: Vec<usize>,
        signal: Vec<usize>,
    },
    Bollinger {
        period: Vec<usize>,
        std_dev: Vec<f64>,
    },
}

impl ParamGrid {
    /// Creates the default SMA crossover grid.
    ///
    /// Fast periods: 5, 10, 15, 20
    /// Slow periods: 30, 50, 100
    pub fn sma_default() -> Self {
        ParamGrid::Sma {
            fast: vec![5, 10, 15, 20],
            slow: vec![30, 50, 100],
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            ParamGrid::Sma { .. } => StrategyKind::SmaCrossover,
            ParamGrid::Rsi { .. } => StrategyKind::RsiReversion,
            ParamGrid::Macd { .. } => StrategyKind::MacdCrossover,
            ParamGrid::Bollinger { .. } => StrategyKind::BollingerReversion,
        }
    }

    /// Size of the Cartesian product, invalid combinations included.
    pub fn size(&self) -> usize {
        match self {
            ParamGrid::Sma { fast, slow } => fast.len() * slow.len(),
            ParamGrid::Rsi {
                period,
                oversold,
                overbought,
            } => period.len() * oversold.len() * overbought.len(),
            ParamGrid::Macd { fast, slow, signal } => fast.len() * slow.len() * signal.len(),
            ParamGrid::Bollinger { period, std_dev } => period.len() * std_dev.len(),
        }
    }

    /// Generates every valid combination, in iteration order.
    ///
    /// Non-swept fields come from `base` when it belongs to the same family,
    /// otherwise from the family defaults. Combinations that break an
    /// ordering constraint are skipped.
    pub fn combinations(&self, base: Option<&StrategyParams>) -> Vec<StrategyParams> {
        let base = match base {
            Some(params) if params.kind() == self.kind() => params.clone(),
            _ => StrategyParams::default_for(self.kind()),
        };
        let mut combos = Vec::new();

        match (self, base) {
            (ParamGrid::Sma { fast, slow }, StrategyParams::Sma(base)) => {
                for &fast_period in fast {
                    for &slow_period in slow {
                        if fast_period == 0 || slow_period <= fast_period {
                            continue;
                        }
                        combos.push(StrategyParams::Sma(SmaCrossoverConfig {
                            fast_period,
                            slow_period,
                            ..base.clone()
                        }));
                    }
                }
            }
            (
                ParamGrid::Rsi {
                    period,
                    oversold,
                    overbought,
                },
                StrategyParams::Rsi(base),
            ) => {
                for &period in period {
                    for &oversold in oversold {
                        for &overbought in overbought {
                            if period == 0 || overbought <= oversold {
                                continue;
                            }
                            combos.push(StrategyParams::Rsi(RsiReversionConfig {
                                period,
                                oversold,
                                overbought,
                                ..base.clone()
                            }));
                        }
                    }
                }
            }
            (ParamGrid::Macd { fast, slow, signal }, StrategyParams::Macd(base)) => {
                for &fast_period in fast {
                    for &slow_period in slow {
                        for &signal_period in signal {
                            if fast_period == 0 || signal_period == 0 || slow_period <= fast_period
                            {
                                continue;
                            }
                            combos.push(StrategyParams::Macd(MacdCrossoverConfig {
                                fast_period,
                                slow_period,
                                signal_period,
                                ..base.clone()
                            }));
                        }
                    }
                }
            }
            (ParamGrid::Bollinger { period, std_dev }, StrategyParams::Bollinger(base)) => {
                for &period in period {
                    for &num_std_dev in std_dev {
                        if period < 2 || num_std_dev.is_nan() || num_std_dev <= 0.0 {
                            continue;
                        }
                        combos.push(StrategyParams::Bollinger(BollingerConfig {
                            period,
                            num_std_dev,
                            ..base.clone()
                        }));
                    }
                }
            }
            // The base always matches the grid's family
            _ => {}
        }

        combos
    }
}

/// Outcome of one grid combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridResult {
    pub params: StrategyParams,
    pub total_pnl: f64,
    pub trade_count: usize,
    /// Winning trades / trades, 0 when there are none
    pub win_rate: f64,
}

/// Cooperative cancellation for a running sweep.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Grid search executor.
///
/// Runs one backtest per combination, optionally in parallel. Each
/// combination builds its own strategy and state; the bars are shared
/// read-only.
#[derive(Debug, Clone)]
pub struct GridSearch {
    engine: BacktestEngine,
    base: Option<StrategyParams>,
    parallel: bool,
}

impl GridSearch {
    pub fn new(config: BacktestConfig) -> Self {
        Self {
            engine: BacktestEngine::new(config),
            base: None,
            parallel: true,
        }
    }

    /// Non-swept parameters for every combination.
    pub fn with_base(mut self, base: StrategyParams) -> Self {
        self.base = Some(base);
        self
    }

    /// Enables or disables parallel execution.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn run(&self, bars: &[Bar], grid: &ParamGrid) -> Vec<GridResult> {
        self.run_with_cancel(bars, grid, &CancelFlag::new())
    }

    /// Run the sweep until done or until `cancel` is raised.
    ///
    /// Combinations not started before cancellation are left out. Every
    /// returned result is complete and results keep iteration order.
    /// Sequential runs stop at a prefix of the grid; parallel workers may
    /// already hold later combinations, so a parallel run can skip ones
    /// in the middle.
    pub fn run_with_cancel(
        &self,
        bars: &[Bar],
        grid: &ParamGrid,
        cancel: &CancelFlag,
    ) -> Vec<GridResult> {
        let combos = grid.combinations(self.base.as_ref());
        let total = combos.len();

        let run_one = |params: &StrategyParams| -> Option<GridResult> {
            if cancel.is_cancelled() {
                return None;
            }
            self.evaluate(bars, params)
        };

        let results: Vec<GridResult> = if self.parallel {
            combos
                .par_iter()
                .map(run_one)
                .collect::<Vec<_>>()
                .into_iter()
                .flatten()
                .collect()
        } else {
            combos.iter().filter_map(run_one).collect()
        };

        if cancel.is_cancelled() {
            warn!(
                "Grid search cancelled: {} of {} combinations completed",
                results.len(),
                total
            );
        } else {
            info!(
                "Grid search over {} bars: {} combinations ({} in grid)",
                bars.len(),
                results.len(),
                grid.size()
            );
        }
        results
    }

    fn evaluate(&self, bars: &[Bar], params: &StrategyParams) -> Option<GridResult> {
        let strategy = match params.build() {
            Ok(strategy) => strategy,
            Err(e) => {
                warn!("Skipping {}: {}", params.describe(), e);
                return None;
            }
        };
        let result = self.engine.run(bars, &strategy);
        Some(GridResult {
            params: params.clone(),
            total_pnl: result.total_pnl,
            trade_count: result.trade_count,
            win_rate: result.win_rate(),
        })
    }
}

/// Sort key for [`rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankBy {
    #[default]
    Pnl,
    WinRate,
}

impl FromStr for RankBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pnl" => Ok(RankBy::Pnl),
            "win-rate" | "win_rate" | "winrate" => Ok(RankBy::WinRate),
            other => Err(format!("unknown ranking '{}', expected pnl or win-rate", other)),
        }
    }
}

impl fmt::Display for RankBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankBy::Pnl => f.write_str("pnl"),
            RankBy::WinRate => f.write_str("win-rate"),
        }
    }
}

/// The `top_n` best results, descending. Ties keep iteration order.
pub fn rank(mut results: Vec<GridResult>, by: RankBy, top_n: usize) -> Vec<GridResult> {
    match by {
        RankBy::Pnl => results.sort_by(|a, b| b.total_pnl.total_cmp(&a.total_pnl)),
        RankBy::WinRate => results.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate)),
    }
    results.truncate(top_n);
    results
}

/// Sweep `grid` over a close series, sequentially in iteration order.
pub fn grid_search(
    closes: &[f64],
    grid: &ParamGrid,
    base: Option<&StrategyParams>,
    fee_pct: f64,
    slippage_pct: f64,
) -> Vec<GridResult> {
    let config = BacktestConfig::with_costs(fee_pct, slippage_pct);
    let bars = bars_from_closes(closes, config.timeframe.as_millis());
    let mut search = GridSearch::new(config).parallel(false);
    if let Some(base) = base {
        search = search.with_base(base.clone());
    }
    search.run(&bars, grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_test_closes() -> Vec<f64> {
        (0..300)
            .map(|i| 100.0 + (i as f64 * 0.1).sin() * 8.0 + (i as f64 * 0.013).cos() * 5.0)
            .collect()
    }

    #[test]
    fn test_sma_combinations_skip_invalid() {
        let grid = ParamGrid::Sma {
            fast: vec![5, 10],
            slow: vec![5, 10, 20],
        };
        let pairs: Vec<(usize, usize)> = grid
            .combinations(None)
            .into_iter()
            .map(|p| match p {
                StrategyParams::Sma(c) => (c.fast_period, c.slow_period),
                other => panic!("unexpected variant: {:?}", other),
            })
            .collect();

        assert_eq!(pairs, vec![(5, 10), (5, 20), (10, 20)]);
        assert_eq!(grid.size(), 6);
    }

    #[test]
    fn test_other_families_skip_invalid() {
        let rsi = ParamGrid::Rsi {
            period: vec![0, 14],
            oversold: vec![30.0, 70.0],
            overbought: vec![70.0],
        };
        assert_eq!(rsi.combinations(None).len(), 1);

        let macd = ParamGrid::Macd {
            fast: vec![12, 26],
            slow: vec![26],
            signal: vec![0, 9],
        };
        assert_eq!(macd.combinations(None).len(), 1);

        let bollinger = ParamGrid::Bollinger {
            period: vec![1, 20],
            std_dev: vec![0.0, 2.0, 2.5],
        };
        assert_eq!(bollinger.combinations(None).len(), 2);
    }

    #[test]
    fn test_base_fills_unswept_fields() {
        let base = StrategyParams::Sma(SmaCrossoverConfig {
            symbol: "ETH/USDT".to_string(),
            stop_loss_pct: 0.05,
            ..Default::default()
        });
        let combos = ParamGrid::sma_default().combinations(Some(&base));
        assert_eq!(combos.len(), 12);
        for params in &combos {
            assert_eq!(params.symbol(), "ETH/USDT");
        }

        // A base from another family is ignored
        let other = StrategyParams::default_for(StrategyKind::RsiReversion).with_symbol("X/Y");
        let combos = ParamGrid::sma_default().combinations(Some(&other));
        assert_eq!(combos[0].symbol(), "SOL/USD");
    }

    #[test]
    fn test_grid_search_exhaustive_and_ordered() {
        let closes = generate_test_closes();
        let grid = ParamGrid::sma_default();
        let results = grid_search(&closes, &grid, None, 0.001, 0.0005);

        assert_eq!(results.len(), 12);
        let expected = grid.combinations(None);
        for (result, params) in results.iter().zip(&expected) {
            assert_eq!(&result.params, params);
            assert!((0.0..=1.0).contains(&result.win_rate));
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let bars = bars_from_closes(&generate_test_closes(), 60_000);
        let grid = ParamGrid::Macd {
            fast: vec![5, 8, 12],
            slow: vec![13, 26],
            signal: vec![5, 9],
        };

        let sequential = GridSearch::new(BacktestConfig::default())
            .parallel(false)
            .run(&bars, &grid);
        let parallel = GridSearch::new(BacktestConfig::default())
            .parallel(true)
            .run(&bars, &grid);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_no_trades_win_rate_zero() {
        let closes = vec![100.0; 50];
        let grid = ParamGrid::Sma {
            fast: vec![2],
            slow: vec![5],
        };
        let results = grid_search(&closes, &grid, None, 0.001, 0.0005);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].trade_count, 0);
        assert_eq!(results[0].win_rate, 0.0);
        assert_eq!(results[0].total_pnl, 0.0);
    }

    #[test]
    fn test_cancelled_before_start() {
        let bars = bars_from_closes(&generate_test_closes(), 60_000);
        let cancel = CancelFlag::new();
        cancel.cancel();

        let results = GridSearch::new(BacktestConfig::default()).run_with_cancel(
            &bars,
            &ParamGrid::sma_default(),
            &cancel,
        );
        assert!(results.is_empty());
    }

    #[test]
    fn test_cancelled_mid_sweep_keeps_complete_results() {
        let closes: Vec<f64> = (0..2000)
            .map(|i| 100.0 + (i as f64 * 0.05).sin() * 10.0 + (i as f64 * 0.007).cos() * 6.0)
            .collect();
        let bars = bars_from_closes(&closes, 60_000);
        let grid = ParamGrid::Sma {
            fast: (1..30).collect(),
            slow: (31..80).collect(),
        };
        let full = GridSearch::new(BacktestConfig::default()).run(&bars, &grid);
        assert_eq!(full.len(), grid.size());

        for parallel in [false, true] {
            let cancel = CancelFlag::new();
            let search = GridSearch::new(BacktestConfig::default()).parallel(parallel);
            let results = std::thread::scope(|s| {
                let flag = cancel.clone();
                s.spawn(move || {
                    std::thread::sleep(std::time::Duration::from_millis(5));
                    flag.cancel();
                });
                search.run_with_cancel(&bars, &grid, &cancel)
            });

            assert!(results.len() <= full.len());
            let mut remaining = full.iter();
            for result in &results {
                let matching = remaining
                    .find(|r| r.params == result.params)
                    .expect("result out of iteration order");
                assert_eq!(result, matching, "parallel={}", parallel);
            }
        }
    }

    #[test]
    fn test_rank_stable_descending() {
        let result = |fast: usize, pnl: f64, win_rate: f64| GridResult {
            params: StrategyParams::Sma(SmaCrossoverConfig {
                fast_period: fast,
                ..Default::default()
            }),
            total_pnl: pnl,
            trade_count: 1,
            win_rate,
        };
        let results = vec![
            result(1, 1.0, 0.5),
            result(2, 3.0, 0.2),
            result(3, 1.0, 0.9),
            result(4, -2.0, 0.5),
        ];

        let by_pnl = rank(results.clone(), RankBy::Pnl, 3);
        let order: Vec<f64> = by_pnl.iter().map(|r| r.total_pnl).collect();
        assert_eq!(order, vec![3.0, 1.0, 1.0]);
        // Equal P&L keeps iteration order
        assert_eq!(by_pnl[1].params, results[0].params);
        assert_eq!(by_pnl[2].params, results[2].params);

        let by_win_rate = rank(results.clone(), RankBy::WinRate, 10);
        assert_eq!(by_win_rate.len(), 4);
        assert_eq!(by_win_rate[0].win_rate, 0.9);
        assert_eq!(by_win_rate[1].params, results[0].params);
        assert_eq!(by_win_rate[2].params, results[3].params);
    }

    #[test]
    fn test_rank_by_from_str() {
        assert_eq!("pnl".parse::<RankBy>().unwrap(), RankBy::Pnl);
        assert_eq!("win-rate".parse::<RankBy>().unwrap(), RankBy::WinRate);
        assert!("sharpe".parse::<RankBy>().is_err());
    }
}
