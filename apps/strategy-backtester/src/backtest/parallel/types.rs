//! Strategy definitions submitted to a batch.

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::backtest::config::{BacktestConfig, SameBarPriority, StrategyType};
use crate::backtest::data_source::CandleSource;
use crate::risk::RiskStrategy;

/// Per-strategy changes to the shared backtest config.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverride {
    /// Starting balance.
    pub initial_balance: Option<Decimal>,
    /// Risk per trade, percent.
    pub risk_per_trade: Option<Decimal>,
    /// Stop distance in pips.
    pub stop_loss_pips: Option<Decimal>,
    /// Target distance in pips.
    pub take_profit_pips: Option<Decimal>,
    /// Target multiple of the stop distance.
    pub risk_reward_ratio: Option<Decimal>,
    /// Stop/target placement strategy.
    pub strategy_type: Option<StrategyType>,
    /// Take long signals.
    pub long_enabled: Option<bool>,
    /// Take short signals.
    pub short_enabled: Option<bool>,
    /// Risk strategy.
    pub risk_strategy: Option<RiskStrategy>,
    /// Same-candle tie-break.
    pub same_bar_priority: Option<SameBarPriority>,
}

impl ConfigOverride {
    /// `base` with every set field replaced.
    #[must_use]
    pub fn apply(&self, base: &BacktestConfig) -> BacktestConfig {
        let mut config = base.clone();

        if let Some(v) = self.initial_balance {
            config.initial_balance = v;
        }
        if let Some(v) = self.risk_per_trade {
            config.risk_per_trade = v;
        }
        if let Some(v) = self.stop_loss_pips {
            config.stop_loss_pips = v;
        }
        if let Some(v) = self.take_profit_pips {
            config.take_profit_pips = v;
        }
        if let Some(v) = self.risk_reward_ratio {
            config.risk_reward_ratio = v;
        }
        if let Some(v) = self.strategy_type {
            config.strategy_type = v;
        }
        if let Some(v) = self.long_enabled {
            config.long_enabled = v;
        }
        if let Some(v) = self.short_enabled {
            config.short_enabled = v;
        }
        if let Some(v) = self.risk_strategy {
            config.risk_strategy = v;
        }
        if let Some(v) = self.same_bar_priority {
            config.same_bar_priority = v;
        }

        config
    }
}

/// One strategy to backtest: a name, where its candles come from and an
/// optional config override.
#[derive(Clone)]
pub struct StrategyDefinition {
    /// Unique strategy name; keys the batch results.
    pub name: String,
    /// Candle source.
    pub source: Arc<dyn CandleSource>,
    /// Changes to the shared config for this strategy only.
    pub overrides: Option<ConfigOverride>,
}

impl StrategyDefinition {
    /// Strategy using the shared config as is.
    #[must_use]
    pub fn new(name: impl Into<String>, source: Arc<dyn CandleSource>) -> Self {
        Self {
            name: name.into(),
            source,
            overrides: None,
        }
    }

    /// Attach a config override.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverride) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Config this strategy runs with.
    #[must_use]
    pub fn effective_config(&self, shared: &BacktestConfig) -> BacktestConfig {
        self.overrides
            .as_ref()
            .map_or_else(|| shared.clone(), |o| o.apply(shared))
    }
}

impl fmt::Debug for StrategyDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyDefinition")
            .field("name", &self.name)
            .field("source", &self.source.name())
            .field("overrides", &self.overrides)
            .finish()
    }
}
