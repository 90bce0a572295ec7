//! Backtest configuration types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::SimulationError;
use crate::risk::RiskStrategy;
use crate::risk::sizing::{Instrument, LotSize};

/// Stop/target placement strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyType {
    /// Constant pip offsets from entry.
    #[default]
    FixedRr,
    /// Stop at the recent swing extreme, target at a multiple of that distance.
    StructureBased,
    /// Percentage-of-price placement. Unrecognized names fall back to this.
    #[serde(other)]
    DynamicTarget,
}

/// Same-bar priority rule for stop/target triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SameBarPriority {
    /// Assume stop triggered first (conservative).
    #[default]
    StopFirst,
    /// Assume target triggered first (optimistic).
    TargetFirst,
}

/// Configuration for a single-strategy backtest run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Starting account balance.
    pub initial_balance: Decimal,
    /// Risk per trade, percent of balance.
    pub risk_per_trade: Decimal,
    /// Stop distance in pips (`FIXED_RR`).
    pub stop_loss_pips: Decimal,
    /// Target distance in pips (`FIXED_RR`).
    pub take_profit_pips: Decimal,
    /// Target multiple of the stop distance (`STRUCTURE_BASED`, Kelly sizing).
    pub risk_reward_ratio: Decimal,
    /// Stop/target placement strategy.
    pub strategy_type: StrategyType,
    /// Take long signals.
    pub long_enabled: bool,
    /// Take short signals.
    pub short_enabled: bool,
    /// Round-trip fee, percent of balance. Feeds the breakeven estimate.
    pub commission: Decimal,
    /// Spread in pips. Feeds the breakeven estimate.
    pub slippage: Decimal,
    /// Instrument class of the series.
    pub instrument: Instrument,
    /// Lot size convention.
    pub lot_size: LotSize,
    /// How the risk percent evolves over the run.
    pub risk_strategy: RiskStrategy,
    /// Tie-break when stop and target trigger on the same candle.
    pub same_bar_priority: SameBarPriority,
    /// Candles after entry before a trade is force-closed.
    pub horizon_candles: usize,
    /// Candles skipped after a trade closes.
    pub cooldown_candles: usize,
    /// Candles scanned for swing points (`STRUCTURE_BASED`).
    pub structure_lookback: usize,
    /// Stop and target distance as percent of price (`DYNAMIC_TARGET`).
    pub fallback_stop_pct: Decimal,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_balance: Decimal::new(10_000, 0),
            risk_per_trade: Decimal::ONE, // 1%
            stop_loss_pips: Decimal::new(10, 0),
            take_profit_pips: Decimal::new(20, 0),
            risk_reward_ratio: Decimal::TWO,
            strategy_type: StrategyType::FixedRr,
            long_enabled: true,
            short_enabled: true,
            commission: Decimal::ZERO,
            slippage: Decimal::ZERO,
            instrument: Instrument::Forex,
            lot_size: LotSize::Standard,
            risk_strategy: RiskStrategy::Compounding,
            same_bar_priority: SameBarPriority::StopFirst,
            horizon_candles: 100,
            cooldown_candles: 5,
            structure_lookback: 10,
            fallback_stop_pct: Decimal::ONE, // 1% of price
        }
    }
}

impl BacktestConfig {
    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidConfig` naming the first bad field.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let invalid = |field: &'static str, reason: &str| {
            Err(SimulationError::InvalidConfig {
                field,
                reason: reason.to_string(),
            })
        };

        if self.initial_balance <= Decimal::ZERO {
            return invalid("initial_balance", "must be positive");
        }
        if self.risk_per_trade <= Decimal::ZERO || self.risk_per_trade > Decimal::ONE_HUNDRED {
            return invalid("risk_per_trade", "must be in (0, 100]");
        }
        if self.strategy_type == StrategyType::FixedRr {
            if self.stop_loss_pips <= Decimal::ZERO {
                return invalid("stop_loss_pips", "must be positive");
            }
            if self.take_profit_pips <= Decimal::ZERO {
                return invalid("take_profit_pips", "must be positive");
            }
        }
        if self.risk_reward_ratio <= Decimal::ZERO {
            return invalid("risk_reward_ratio", "must be positive");
        }
        if self.commission < Decimal::ZERO {
            return invalid("commission", "must not be negative");
        }
        if self.slippage < Decimal::ZERO {
            return invalid("slippage", "must not be negative");
        }
        if self.horizon_candles == 0 {
            return invalid("horizon_candles", "must be at least 1");
        }
        if self.structure_lookback == 0 {
            return invalid("structure_lookback", "must be at least 1");
        }
        if self.fallback_stop_pct <= Decimal::ZERO || self.fallback_stop_pct >= Decimal::ONE_HUNDRED
        {
            return invalid("fallback_stop_pct", "must be in (0, 100)");
        }
        if !self.long_enabled && !self.short_enabled {
            return invalid("long_enabled", "at least one direction must be enabled");
        }
        Ok(())
    }
}
