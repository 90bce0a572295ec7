//! Open position state for backtest simulation.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::candle::Candle;
use super::trade::{ExitFill, Trade};
use crate::risk::sizing::{PositionDirection, TradeParameters, TradeResult};

/// The single position a run may hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPosition {
    /// Position direction.
    pub direction: PositionDirection,
    /// Candle index of the entry.
    pub entry_index: usize,
    /// Entry candle time.
    pub entry_time: NaiveDateTime,
    /// Entry price.
    pub entry_price: Decimal,
    /// Stop loss level.
    pub stop_loss: Decimal,
    /// Take profit level.
    pub take_profit: Decimal,
    /// Parameters the position was sized with.
    pub parameters: TradeParameters,
    /// Sizing result.
    pub sizing: TradeResult,
    /// Account balance when the position was opened.
    pub balance_before: Decimal,
}

impl OpenPosition {
    /// Open a position at the close of `candle`.
    #[must_use]
    pub fn open(
        entry_index: usize,
        candle: &Candle,
        parameters: TradeParameters,
        sizing: TradeResult,
        balance_before: Decimal,
    ) -> Self {
        Self {
            direction: parameters.direction,
            entry_index,
            entry_time: candle.timestamp,
            entry_price: parameters.entry_price,
            stop_loss: sizing.stop_loss_price,
            take_profit: sizing.take_profit_price,
            parameters,
            sizing,
            balance_before,
        }
    }

    /// Candles held as of `index`.
    #[must_use]
    pub const fn candles_held(&self, index: usize) -> usize {
        index.saturating_sub(self.entry_index)
    }

    /// Close the position into an immutable trade record.
    #[must_use]
    pub fn close(self, sequence: usize, exit: ExitFill) -> Trade {
        Trade::from_exit(self, sequence, exit)
    }
}
