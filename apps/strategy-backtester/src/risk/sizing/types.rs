//! Core types for trade sizing calculations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Instrument class. Determines the pip scale used for price conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Instrument {
    /// Currency pairs quoted to four decimals.
    #[default]
    Forex,
    /// Spot gold.
    Gold,
    /// Equity indices.
    Indices,
}

impl Instrument {
    /// Every instrument class, in table order.
    pub const ALL: [Self; 3] = [Self::Forex, Self::Gold, Self::Indices];

    /// Price change represented by one pip.
    #[must_use]
    pub const fn pip_size(self) -> Decimal {
        match self {
            Self::Forex => Decimal::from_parts(1, 0, 0, false, 4), // 0.0001
            Self::Gold | Self::Indices => Decimal::from_parts(1, 0, 0, false, 1), // 0.1
        }
    }

    /// Number of pips in one unit of price.
    #[must_use]
    pub const fn pips_per_unit(self) -> Decimal {
        match self {
            Self::Forex => Decimal::from_parts(10_000, 0, 0, false, 0),
            Self::Gold | Self::Indices => Decimal::TEN,
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Forex => 0,
            Self::Gold => 1,
            Self::Indices => 2,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forex => write!(f, "FOREX"),
            Self::Gold => write!(f, "GOLD"),
            Self::Indices => write!(f, "INDICES"),
        }
    }
}

/// Lot size convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotSize {
    /// 100,000 units.
    #[default]
    Standard,
    /// 10,000 units.
    Mini,
    /// 1,000 units.
    Micro,
}

impl LotSize {
    /// Every lot size, in table order.
    pub const ALL: [Self; 3] = [Self::Standard, Self::Mini, Self::Micro];

    /// Base units per lot.
    #[must_use]
    pub const fn units(self) -> Decimal {
        match self {
            Self::Standard => Decimal::from_parts(100_000, 0, 0, false, 0),
            Self::Mini => Decimal::from_parts(10_000, 0, 0, false, 0),
            Self::Micro => Decimal::from_parts(1_000, 0, 0, false, 0),
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Standard => 0,
            Self::Mini => 1,
            Self::Micro => 2,
        }
    }
}

/// Direction of a trade or open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionDirection {
    /// Profits when price rises.
    #[default]
    Long,
    /// Profits when price falls.
    Short,
}

impl PositionDirection {
    /// Move `distance` from `price` in the losing direction.
    #[must_use]
    pub fn toward_loss(self, price: Decimal, distance: Decimal) -> Decimal {
        match self {
            Self::Long => price - distance,
            Self::Short => price + distance,
        }
    }

    /// Move `distance` from `price` in the winning direction.
    #[must_use]
    pub fn toward_profit(self, price: Decimal, distance: Decimal) -> Decimal {
        match self {
            Self::Long => price + distance,
            Self::Short => price - distance,
        }
    }
}

impl fmt::Display for PositionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
        }
    }
}

/// Stop-loss specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopSpec {
    /// Distance from entry in pips.
    Pips(Decimal),
    /// Explicit stop price; overrides any pip distance.
    Price(Decimal),
}

/// Take-profit specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetSpec {
    /// Distance from entry in pips.
    Pips(Decimal),
    /// Explicit target price.
    Price(Decimal),
    /// Multiple of the stop distance.
    RiskReward(Decimal),
}

/// Share of the take-profit distance assigned to each of two legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSplit {
    /// First leg, percent of the full target distance.
    pub tp1_pct: Decimal,
    /// Second leg, percent of the full target distance.
    pub tp2_pct: Decimal,
}

impl TargetSplit {
    /// Create a split from two leg percentages.
    #[must_use]
    pub const fn new(tp1_pct: Decimal, tp2_pct: Decimal) -> Self {
        Self { tp1_pct, tp2_pct }
    }

    /// Whether both legs lie in (0, 100] and together do not exceed 100.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let in_range = |pct: Decimal| pct > Decimal::ZERO && pct <= Decimal::ONE_HUNDRED;
        in_range(self.tp1_pct)
            && in_range(self.tp2_pct)
            && self.tp1_pct + self.tp2_pct <= Decimal::ONE_HUNDRED
    }
}

impl Default for TargetSplit {
    fn default() -> Self {
        Self {
            tp1_pct: Decimal::new(60, 0),
            tp2_pct: Decimal::new(40, 0),
        }
    }
}

/// Input parameters for sizing a single trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeParameters {
    /// Account balance the risk percentage applies to.
    pub account_balance: Decimal,
    /// Percent of the balance put at risk, in (0, 100].
    pub risk_percent: Decimal,
    /// Entry price.
    pub entry_price: Decimal,
    /// Trade direction.
    pub direction: PositionDirection,
    /// Stop-loss specification.
    pub stop: StopSpec,
    /// Take-profit specification.
    pub target: TargetSpec,
    /// Instrument class.
    pub instrument: Instrument,
    /// Lot size convention.
    pub lot_size: LotSize,
    /// Custom contract size in units (0 = use `lot_size`).
    pub contract_size: Decimal,
    /// Optional two-leg take-profit split.
    pub target_split: Option<TargetSplit>,
    /// Round-trip fee as a percent of the balance (0 = none).
    pub fee_percent: Decimal,
    /// Spread cost in pips (0 = none).
    pub spread_pips: Decimal,
}

impl TradeParameters {
    /// Create parameters for a standard-lot forex trade with no costs.
    #[must_use]
    pub const fn new(
        account_balance: Decimal,
        risk_percent: Decimal,
        entry_price: Decimal,
        direction: PositionDirection,
        stop: StopSpec,
        target: TargetSpec,
    ) -> Self {
        Self {
            account_balance,
            risk_percent,
            entry_price,
            direction,
            stop,
            target,
            instrument: Instrument::Forex,
            lot_size: LotSize::Standard,
            contract_size: Decimal::ZERO,
            target_split: None,
            fee_percent: Decimal::ZERO,
            spread_pips: Decimal::ZERO,
        }
    }
}

/// One leg of a split take-profit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetLeg {
    /// Distance from entry in pips.
    pub pips: Decimal,
    /// Target price.
    pub price: Decimal,
    /// Amount gained if this leg is the exit.
    pub amount: Decimal,
}

/// Breakeven point once fees and spread are paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakeven {
    /// Distance from entry in pips.
    pub pips: Decimal,
    /// Breakeven price.
    pub price: Decimal,
}

/// Result of sizing a trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeResult {
    /// Amount lost if the stop is hit.
    pub risk_amount: Decimal,
    /// Amount gained if the full target is hit.
    pub reward_amount: Decimal,
    /// Position size in lots, rounded to lot precision.
    pub position_size: Decimal,
    /// Position size before rounding.
    pub exact_position_size: Decimal,
    /// Resolved stop-loss price.
    pub stop_loss_price: Decimal,
    /// Resolved take-profit price.
    pub take_profit_price: Decimal,
    /// Stop distance in pips.
    pub stop_pips: Decimal,
    /// Target distance in pips.
    pub target_pips: Decimal,
    /// Reward distance divided by risk distance.
    pub risk_reward_ratio: Decimal,
    /// Value of one pip for the sized contract.
    pub pip_value: Decimal,
    /// Breakeven point, when fees or spread are modeled.
    pub breakeven: Option<Breakeven>,
    /// First take-profit leg, when a split was requested.
    pub tp1: Option<TargetLeg>,
    /// Second take-profit leg, when a split was requested.
    pub tp2: Option<TargetLeg>,
}

impl TradeResult {
    /// Whether the take-profit was split into legs.
    #[must_use]
    pub const fn has_multiple_targets(&self) -> bool {
        self.tp1.is_some() && self.tp2.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pip_scales() {
        assert_eq!(Instrument::Forex.pip_size(), dec!(0.0001));
        assert_eq!(Instrument::Gold.pip_size(), dec!(0.1));
        assert_eq!(Instrument::Forex.pips_per_unit(), dec!(10000));
        assert_eq!(Instrument::Indices.pips_per_unit(), dec!(10));
    }

    #[test]
    fn test_direction_offsets() {
        assert_eq!(
            PositionDirection::Long.toward_loss(dec!(1.1000), dec!(0.0010)),
            dec!(1.0990)
        );
        assert_eq!(
            PositionDirection::Short.toward_loss(dec!(1.1000), dec!(0.0010)),
            dec!(1.1010)
        );
        assert_eq!(
            PositionDirection::Short.toward_profit(dec!(1.1000), dec!(0.0020)),
            dec!(1.0980)
        );
    }

    #[test]
    fn test_target_split_validity() {
        assert!(TargetSplit::default().is_valid());
        assert!(TargetSplit::new(dec!(50), dec!(50)).is_valid());
        assert!(!TargetSplit::new(dec!(70), dec!(40)).is_valid());
        assert!(!TargetSplit::new(dec!(0), dec!(40)).is_valid());
    }

    #[test]
    fn test_stop_spec_serialization() {
        let json = match serde_json::to_string(&StopSpec::Pips(dec!(10))) {
            Ok(j) => j,
            Err(e) => panic!("Serialization failed: {e}"),
        };
        assert!(json.contains("PIPS"));
    }
}
