//! Error types for trade sizing calculations.

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::{Instrument, PositionDirection};

/// Trade parameters that cannot be sized.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Account balance is zero or negative.
    #[error("account balance must be positive, got {value}")]
    NonPositiveBalance {
        /// Offending balance.
        value: Decimal,
    },

    /// Risk percent outside (0, 100].
    #[error("risk percent must be in (0, 100], got {value}")]
    RiskOutOfRange {
        /// Offending percentage.
        value: Decimal,
    },

    /// Entry price is zero or negative.
    #[error("entry price must be positive, got {value}")]
    NonPositiveEntry {
        /// Offending price.
        value: Decimal,
    },

    /// Stop-loss pips or price is zero or negative.
    #[error("stop loss must be positive, got {value}")]
    NonPositiveStop {
        /// Offending value.
        value: Decimal,
    },

    /// Take-profit pips, price or ratio is zero or negative.
    #[error("take profit must be positive, got {value}")]
    NonPositiveTarget {
        /// Offending value.
        value: Decimal,
    },

    /// Custom contract size is negative.
    #[error("contract size must not be negative, got {value}")]
    NegativeContractSize {
        /// Offending contract size.
        value: Decimal,
    },

    /// Stop or target price lies on the wrong side of entry.
    #[error("{level} price {price} is on the wrong side of entry {entry} for a {direction} trade")]
    WrongSide {
        /// Which level was misplaced ("stop loss" or "take profit").
        level: &'static str,
        /// The misplaced price.
        price: Decimal,
        /// Entry price.
        entry: Decimal,
        /// Trade direction.
        direction: PositionDirection,
    },

    /// Multi-target split legs out of range or over 100% in total.
    #[error("invalid target split {tp1_pct}/{tp2_pct}: each leg must be in (0, 100] and the total at most 100")]
    InvalidTargetSplit {
        /// First leg percentage.
        tp1_pct: Decimal,
        /// Second leg percentage.
        tp2_pct: Decimal,
    },

    /// Fee percent or spread is negative.
    #[error("trading costs must not be negative (fee {fee_percent}%, spread {spread_pips} pips)")]
    NegativeCost {
        /// Fee percentage.
        fee_percent: Decimal,
        /// Spread in pips.
        spread_pips: Decimal,
    },
}

/// Arithmetic guard tripped while sizing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalculationError {
    /// Stop sits exactly at entry.
    #[error("stop distance is zero")]
    ZeroStopDistance,

    /// Pip value resolved to zero.
    #[error("pip value is zero for {instrument} with {units} units")]
    ZeroPipValue {
        /// Instrument class.
        instrument: Instrument,
        /// Contract units.
        units: Decimal,
    },

    /// Decimal arithmetic overflowed.
    #[error("arithmetic overflow computing {quantity}")]
    Overflow {
        /// Name of the quantity being computed.
        quantity: &'static str,
    },
}

/// Error during trade sizing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SizingError {
    /// Malformed input parameters.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Guarded arithmetic failure.
    #[error(transparent)]
    Calculation(#[from] CalculationError),
}
