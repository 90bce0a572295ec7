//! Trade record types for backtest simulation.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::candle::Candle;
use super::position::OpenPosition;
use crate::risk::sizing::{PositionDirection, TradeParameters, TradeResult};

/// Outcome of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeOutcome {
    /// Not resolved yet. Never present in a finished result.
    #[default]
    Pending,
    /// Stop loss hit.
    LossAtSl,
    /// First (or only) take-profit hit.
    WinAtTp1,
    /// Second take-profit leg hit.
    WinAtTp2,
    /// Closed at the entry price.
    BreakEven,
}

impl TradeOutcome {
    /// Either take-profit.
    #[must_use]
    pub const fn is_win(self) -> bool {
        matches!(self, Self::WinAtTp1 | Self::WinAtTp2)
    }

    /// Stop loss.
    #[must_use]
    pub const fn is_loss(self) -> bool {
        matches!(self, Self::LossAtSl)
    }

    /// Anything but `Pending`.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Why a trade was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    /// Stop-loss level reached.
    StopLoss,
    /// Take-profit level reached.
    TakeProfit,
    /// Holding horizon expired; closed at the candle close.
    Horizon,
}

/// Where and how a position was closed.
///
/// Only the constructors below can build one, so every exit carries a
/// resolved outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitFill {
    index: usize,
    timestamp: NaiveDateTime,
    price: Decimal,
    outcome: TradeOutcome,
    reason: ExitReason,
}

impl ExitFill {
    /// Exit at the stop level.
    #[must_use]
    pub const fn stop(index: usize, candle: &Candle, price: Decimal) -> Self {
        Self {
            index,
            timestamp: candle.timestamp,
            price,
            outcome: TradeOutcome::LossAtSl,
            reason: ExitReason::StopLoss,
        }
    }

    /// Exit at the take-profit level.
    #[must_use]
    pub const fn target(index: usize, candle: &Candle, price: Decimal) -> Self {
        Self {
            index,
            timestamp: candle.timestamp,
            price,
            outcome: TradeOutcome::WinAtTp1,
            reason: ExitReason::TakeProfit,
        }
    }

    /// Forced exit at the candle close once the horizon expires.
    ///
    /// Classified by the sign of the move since entry.
    #[must_use]
    pub fn horizon(
        index: usize,
        candle: &Candle,
        direction: PositionDirection,
        entry_price: Decimal,
    ) -> Self {
        let moved = match direction {
            PositionDirection::Long => candle.close - entry_price,
            PositionDirection::Short => entry_price - candle.close,
        };
        let outcome = if moved > Decimal::ZERO {
            TradeOutcome::WinAtTp1
        } else if moved < Decimal::ZERO {
            TradeOutcome::LossAtSl
        } else {
            TradeOutcome::BreakEven
        };

        Self {
            index,
            timestamp: candle.timestamp,
            price: candle.close,
            outcome,
            reason: ExitReason::Horizon,
        }
    }

    /// Candle index of the exit.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Resolved outcome.
    #[must_use]
    pub const fn outcome(&self) -> TradeOutcome {
        self.outcome
    }
}

/// Resolved trade record for backtest output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trade {
    /// Position in the run's trade list.
    pub sequence: usize,
    /// Trade direction.
    pub direction: PositionDirection,
    /// Candle index of the entry.
    pub entry_index: usize,
    /// Candle index of the exit.
    pub exit_index: usize,
    /// Entry time.
    pub entry_time: NaiveDateTime,
    /// Exit time.
    pub exit_time: NaiveDateTime,
    /// Entry price.
    pub entry_price: Decimal,
    /// Exit price.
    pub exit_price: Decimal,
    /// Parameters the trade was sized with.
    pub parameters: TradeParameters,
    /// Sizing result.
    pub sizing: TradeResult,
    outcome: TradeOutcome,
    /// Exit reason.
    pub exit_reason: ExitReason,
    /// Balance before the trade.
    pub balance_before: Decimal,
    /// Balance after the trade.
    pub balance_after: Decimal,
}

impl Trade {
    pub(crate) fn from_exit(position: OpenPosition, sequence: usize, exit: ExitFill) -> Self {
        let mut trade = Self {
            sequence,
            direction: position.direction,
            entry_index: position.entry_index,
            exit_index: exit.index,
            entry_time: position.entry_time,
            exit_time: exit.timestamp,
            entry_price: position.entry_price,
            exit_price: exit.price,
            parameters: position.parameters,
            sizing: position.sizing,
            outcome: exit.outcome,
            exit_reason: exit.reason,
            balance_before: position.balance_before,
            balance_after: position.balance_before,
        };
        trade.balance_after = trade.balance_before + trade.pnl();
        trade
    }

    /// Resolved outcome. Fixed at construction.
    #[must_use]
    pub const fn outcome(&self) -> TradeOutcome {
        self.outcome
    }

    /// Balance change booked for this trade.
    ///
    /// Wins book the reward (or the leg amount when the target was split),
    /// losses book the risk, break-even books nothing.
    #[must_use]
    pub fn pnl(&self) -> Decimal {
        match self.outcome {
            TradeOutcome::LossAtSl => -self.sizing.risk_amount,
            TradeOutcome::WinAtTp1 => self
                .sizing
                .tp1
                .map_or(self.sizing.reward_amount, |leg| leg.amount),
            TradeOutcome::WinAtTp2 => self
                .sizing
                .tp2
                .map_or(self.sizing.reward_amount, |leg| leg.amount),
            TradeOutcome::BreakEven | TradeOutcome::Pending => Decimal::ZERO,
        }
    }

    /// Result in units of risk: +RR for a win, -1 for a loss, 0 otherwise.
    #[must_use]
    pub fn r_multiple(&self) -> Decimal {
        if self.outcome.is_win() {
            self.sizing.risk_reward_ratio
        } else if self.outcome.is_loss() {
            Decimal::NEGATIVE_ONE
        } else {
            Decimal::ZERO
        }
    }

    /// Candles between entry and exit.
    #[must_use]
    pub const fn holding_candles(&self) -> usize {
        self.exit_index.saturating_sub(self.entry_index)
    }
}
