//! Stop/target trigger detection for backtest simulation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::candle::Candle;
use super::config::SameBarPriority;
use crate::risk::sizing::PositionDirection;

/// Result of stop/target trigger evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerResult {
    /// No trigger occurred.
    None,
    /// Stop was triggered.
    Stop {
        /// Stop level.
        price: Decimal,
    },
    /// Target was triggered.
    Target {
        /// Target level.
        price: Decimal,
    },
    /// Both were triggered (uses priority rule).
    BothTriggered {
        /// Which trigger was selected based on priority.
        selected: TriggerType,
        /// Level of the selected trigger.
        price: Decimal,
    },
}

/// Type of trigger for "both triggered" scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerType {
    /// Stop was selected.
    Stop,
    /// Target was selected.
    Target,
}

impl TriggerResult {
    /// Check if any trigger occurred.
    #[must_use]
    pub const fn is_triggered(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// The trigger that decides the exit, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<TriggerType> {
        match self {
            Self::None => None,
            Self::Stop { .. } => Some(TriggerType::Stop),
            Self::Target { .. } => Some(TriggerType::Target),
            Self::BothTriggered { selected, .. } => Some(*selected),
        }
    }

    /// Get the fill price if triggered.
    #[must_use]
    pub const fn fill_price(&self) -> Option<Decimal> {
        match self {
            Self::None => None,
            Self::Stop { price } | Self::Target { price } | Self::BothTriggered { price, .. } => {
                Some(*price)
            }
        }
    }
}

/// Check if a stop level is triggered.
///
/// Long positions: stop triggers when price falls to stop level (low <= stop).
/// Short positions: stop triggers when price rises to stop level (high >= stop).
#[must_use]
pub fn is_stop_triggered(
    direction: PositionDirection,
    stop_level: Decimal,
    candle: &Candle,
) -> bool {
    match direction {
        PositionDirection::Long => candle.low <= stop_level,
        PositionDirection::Short => candle.high >= stop_level,
    }
}

/// Check if a target level is triggered.
///
/// Long positions: target triggers when price rises to target level (high >= target).
/// Short positions: target triggers when price falls to target level (low <= target).
#[must_use]
pub fn is_target_triggered(
    direction: PositionDirection,
    target_level: Decimal,
    candle: &Candle,
) -> bool {
    match direction {
        PositionDirection::Long => candle.high >= target_level,
        PositionDirection::Short => candle.low <= target_level,
    }
}

/// Evaluate stop and target triggers for a position.
///
/// When both levels fall inside the same candle the priority rule picks
/// one, since intrabar ordering is unknown.
#[must_use]
pub fn evaluate_triggers(
    direction: PositionDirection,
    stop_level: Decimal,
    target_level: Decimal,
    candle: &Candle,
    priority: SameBarPriority,
) -> TriggerResult {
    let stop_triggered = is_stop_triggered(direction, stop_level, candle);
    let target_triggered = is_target_triggered(direction, target_level, candle);

    match (stop_triggered, target_triggered) {
        (true, false) => TriggerResult::Stop { price: stop_level },
        (false, true) => TriggerResult::Target {
            price: target_level,
        },
        (true, true) => {
            let (selected, price) = resolve_same_bar_conflict(stop_level, target_level, priority);
            TriggerResult::BothTriggered { selected, price }
        }
        (false, false) => TriggerResult::None,
    }
}

/// Resolve conflict when both stop and target trigger on the same bar.
const fn resolve_same_bar_conflict(
    stop_level: Decimal,
    target_level: Decimal,
    priority: SameBarPriority,
) -> (TriggerType, Decimal) {
    match priority {
        SameBarPriority::StopFirst => (TriggerType::Stop, stop_level),
        SameBarPriority::TargetFirst => (TriggerType::Target, target_level),
    }
}
