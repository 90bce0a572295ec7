//! Statistics result types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Drawdown figures of an equity curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DrawdownMetrics {
    /// Largest peak-to-balance decline.
    pub max_drawdown: Decimal,
    /// That decline as a percent of its peak.
    pub max_drawdown_percent: Decimal,
    /// Longest run of points below the running peak.
    pub max_duration: usize,
}

/// Statistics for one backtest run.
///
/// Percent fields are in 0..=100 units.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EquityStats {
    /// Starting balance.
    pub initial_balance: Decimal,
    /// Balance after the last trade.
    pub final_balance: Decimal,
    /// Sum of trade P&L.
    pub total_pnl: Decimal,
    /// Total P&L as a percent of the starting balance.
    pub percent_gain: Decimal,
    /// Winning trades as a percent of all trades.
    pub win_rate: Decimal,
    /// Number of trades.
    pub total_trades: usize,
    /// Trades closed at a take-profit.
    pub winning_trades: usize,
    /// Trades closed at the stop.
    pub losing_trades: usize,
    /// Largest peak-to-balance decline.
    pub max_drawdown: Decimal,
    /// Largest decline as a percent of its peak.
    pub max_drawdown_percent: Decimal,
    /// Longest run of trades spent below the running peak.
    pub drawdown_duration: usize,
    /// Annualized Sharpe ratio of per-trade returns.
    pub sharpe_ratio: Decimal,
    /// Gross profit over gross loss (0 when there are no losses).
    pub profit_factor: Decimal,
    /// Longest run of consecutive wins.
    pub longest_win_streak: usize,
    /// Longest run of consecutive losses.
    pub longest_loss_streak: usize,
    /// Streak at the end of the series: +n wins, -n losses, 0 after a break-even.
    pub current_streak: i64,
    /// Mean P&L of winning trades.
    pub avg_win: Decimal,
    /// Mean loss size of losing trades, as a positive amount.
    pub avg_loss: Decimal,
    /// Best single trade.
    pub largest_win: Decimal,
    /// Worst single trade, as a positive amount.
    pub largest_loss: Decimal,
    /// Mean R-multiple over all trades.
    pub avg_r_multiple: Decimal,
    /// Expected R per trade: +RR per win, -1 per loss, 0 per break-even.
    pub expectancy: Decimal,
    /// Mean P&L over all trades.
    pub avg_pnl_per_trade: Decimal,
}
