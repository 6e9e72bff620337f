//! Balance and precision provider.
//!
//! Strategies size orders through this capability instead of talking to an
//! exchange. Live trading plugs in an exchange-backed implementation; the
//! backtester uses [`UnlimitedBalance`].

use crate::error::ProviderError;

/// Source of free balances and tradable-precision rounding.
pub trait BalanceProvider: Send + Sync {
    /// Free (unreserved) balance of an asset. Unknown assets have a balance of zero.
    fn free_balance(&self, asset: &str) -> Result<f64, ProviderError>;

    /// Round a quantity to what the venue accepts for `symbol`.
    fn round_to_tradable_precision(&self, symbol: &str, quantity: f64)
        -> Result<f64, ProviderError>;
}

/// Split a `BASE/QUOTE` symbol into its assets.
pub fn split_symbol(symbol: &str) -> Result<(&str, &str), ProviderError> {
    match symbol.split_once('/') {
        Some((base, quote)) if !base.is_empty() && !quote.is_empty() => Ok((base, quote)),
        _ => Err(ProviderError::InvalidSymbol(symbol.to_string())),
    }
}

/// Provider reporting the same large balance for every asset and passing
/// quantities through unrounded.
#[derive(Debug, Clone, Copy)]
pub struct UnlimitedBalance {
    balance: f64,
}

impl UnlimitedBalance {
    pub fn new(balance: f64) -> Self {
        Self { balance }
    }
}

impl Default for UnlimitedBalance {
    fn default() -> Self {
        Self::new(1_000_000.0)
    }
}

impl BalanceProvider for UnlimitedBalance {
    fn free_balance(&self, _asset: &str) -> Result<f64, ProviderError> {
        Ok(self.balance)
    }

    fn round_to_tradable_precision(
        &self,
        _symbol: &str,
        quantity: f64,
    ) -> Result<f64, ProviderError> {
        Ok(quantity)
    }
}
