//! Strategy registry for loading strategies by name.

use crate::{StrategyParams, TradingStrategy};
use quant_core::{error::StrategyError, Strategy, StrategyKind, TradingStyle};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Information about a registered strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Registry key
    pub key: String,
    /// Strategy name
    pub name: String,
    /// Strategy description
    pub description: String,
    /// Trend-following or mean-reversion
    pub style: TradingStyle,
    /// Bars needed before the first signal, with default parameters
    pub warmup_period: usize,
    /// Default parameters
    pub default_params: StrategyParams,
}

/// Registry of the built-in strategies.
pub struct StrategyRegistry {
    strategies: HashMap<StrategyKind, StrategyInfo>,
}

impl StrategyRegistry {
    /// Create a new strategy registry with all built-in strategies.
    pub fn new() -> Self {
        let mut strategies = HashMap::new();

        for kind in StrategyKind::all() {
            let params = StrategyParams::default_for(*kind);
            // Defaults always validate
            if let Ok(strategy) = params.build() {
                strategies.insert(
                    *kind,
                    StrategyInfo {
                        key: kind.key().to_string(),
                        name: strategy.name().to_string(),
                        description: strategy.description().to_string(),
                        style: kind.style(),
                        warmup_period: strategy.warmup_period(),
                        default_params: params,
                    },
                );
            }
        }

        Self { strategies }
    }

    /// List all strategies in a stable order.
    pub fn list(&self) -> Vec<&StrategyInfo> {
        StrategyKind::all()
            .iter()
            .filter_map(|kind| self.strategies.get(kind))
            .collect()
    }

    /// Get strategy info by key or alias.
    pub fn get(&self, name: &str) -> Option<&StrategyInfo> {
        let kind = StrategyKind::from_str(name).ok()?;
        self.strategies.get(&kind)
    }

    /// Get all strategy keys.
    pub fn names(&self) -> Vec<&str> {
        self.list().into_iter().map(|info| info.key.as_str()).collect()
    }

    /// Create a strategy from a JSON object of parameters.
    ///
    /// Missing fields fall back to the family defaults. A `null` config
    /// builds the defaults.
    pub fn create(
        &self,
        name: &str,
        config: serde_json::Value,
        symbol: &str,
    ) -> Result<TradingStrategy, StrategyError> {
        let kind = StrategyKind::from_str(name)?;

        let mut tagged = match config {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => serde_json::Map::new(),
            other => {
                return Err(StrategyError::InvalidConfig(format!(
                    "expected an object of parameters, got {}",
                    other
                )))
            }
        };
        tagged.insert("strategy".to_string(), kind.key().into());

        let params: StrategyParams = serde_json::from_value(serde_json::Value::Object(tagged))
            .map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;
        params.with_symbol(symbol).build()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
