//! Order sizing and position transitions shared by the strategies.
//!
//! Sizing goes through the [`BalanceProvider`]. Any provider failure, or a
//! quantity that rounds to nothing, turns the bar into a no-op: the helpers
//! return `None` before touching the position state.

use quant_core::error::{ProviderError, StrategyError};
use quant_core::{split_symbol, BalanceProvider, Bar, Signal, SignalReason, StrategyState};
use tracing::{debug, warn};

fn tradable(result: Result<f64, ProviderError>, symbol: &str) -> Option<f64> {
    match result {
        Ok(amount) if amount.is_finite() && amount > 0.0 => Some(amount),
        Ok(amount) => {
            debug!("{}: sized amount {} is not tradable, skipping bar", symbol, amount);
            None
        }
        Err(e) => {
            warn!("{}: balance provider failed, skipping bar: {}", symbol, e);
            None
        }
    }
}

/// Buy quantity worth `fraction` of the free quote balance.
pub(crate) fn quote_fraction_amount(
    provider: &dyn BalanceProvider,
    symbol: &str,
    fraction: f64,
    price: f64,
) -> Option<f64> {
    let sized = split_symbol(symbol).and_then(|(_, quote)| {
        let balance = provider.free_balance(quote)?;
        provider.round_to_tradable_precision(symbol, balance * fraction / price)
    });
    tradable(sized, symbol)
}

/// Buy quantity worth a fixed amount of the quote asset.
pub(crate) fn fixed_quote_amount(
    provider: &dyn BalanceProvider,
    symbol: &str,
    quote_amount: f64,
    price: f64,
) -> Option<f64> {
    tradable(
        provider.round_to_tradable_precision(symbol, quote_amount / price),
        symbol,
    )
}

/// The whole free balance of the base asset.
pub(crate) fn full_base_amount(provider: &dyn BalanceProvider, symbol: &str) -> Option<f64> {
    let sized = split_symbol(symbol).and_then(|(base, _)| {
        let balance = provider.free_balance(base)?;
        provider.round_to_tradable_precision(symbol, balance)
    });
    tradable(sized, symbol)
}

/// Open a long on `bar` and build the buy signal.
pub(crate) fn enter_long(
    state: &mut StrategyState,
    bar: &Bar,
    amount: f64,
    stop_loss_pct: Option<f64>,
    reason: SignalReason,
) -> Signal {
    let price = bar.close;
    let stop = stop_loss_pct.map(|pct| price * (1.0 - pct));
    state.open_long(price, bar.open_time, amount, stop);
    state.signals_generated += 1;
    Signal::buy(amount, price, bar.open_time).with_reason(reason)
}

/// Close the position on `bar` and build the sell signal.
pub(crate) fn exit_long(
    state: &mut StrategyState,
    bar: &Bar,
    amount: f64,
    reason: SignalReason,
) -> Signal {
    state.close_position();
    state.signals_generated += 1;
    Signal::sell(amount, bar.close, bar.open_time).with_reason(reason)
}

/// Sell the full base balance, if the provider can size it.
pub(crate) fn exit_full_balance(
    state: &mut StrategyState,
    bar: &Bar,
    provider: &dyn BalanceProvider,
    symbol: &str,
    reason: SignalReason,
) -> Option<Signal> {
    let amount = full_base_amount(provider, symbol)?;
    Some(exit_long(state, bar, amount, reason))
}

/// Whether a long position's hard stop is hit at `price`.
pub(crate) fn stop_hit(state: &StrategyState, price: f64) -> bool {
    state.is_long() && state.stop_loss_price.is_some_and(|stop| price <= stop)
}

/// Shared checks for fraction-sized strategies.
pub(crate) fn validate_sizing(
    order_fraction: f64,
    stop_loss_pct: f64,
) -> Result<(), StrategyError> {
    if order_fraction.is_nan() || order_fraction <= 0.0 || order_fraction > 1.0 {
        return Err(StrategyError::InvalidConfig(
            "Order fraction must be in (0, 1]".into(),
        ));
    }
    if !(0.0..1.0).contains(&stop_loss_pct) {
        return Err(StrategyError::InvalidConfig(
            "Stop loss pct must be in [0, 1)".into(),
        ));
    }
    Ok(())
}
