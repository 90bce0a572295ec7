//! Single-run backtest result.

use rust_decimal::Decimal;
use serde::Serialize;

use super::candle::Candle;
use super::metrics::{EquityAnalyzer, EquityStats};
use super::trade::Trade;

/// Outcome of one simulation run.
///
/// Holds only resolved trades; pending trades never reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BacktestResult {
    /// Resolved trades in entry order.
    pub trades: Vec<Trade>,
    /// Statistics over `trades`.
    pub stats: EquityStats,
    /// Balance after each trade, starting with the initial balance.
    pub equity_curve: Vec<Decimal>,
    /// Percent below the running peak, aligned with `equity_curve`.
    pub drawdown_curve: Vec<Decimal>,
    /// Number of resolved trades.
    pub total_trades: usize,
    /// Trades closed at a take-profit.
    pub winning_trades: usize,
    /// Trades closed at the stop.
    pub losing_trades: usize,
    /// Winning trades as a percent of all trades.
    pub win_rate: Decimal,
    /// Gross profit over gross loss (0 when there are no losses).
    pub profit_factor: Decimal,
    /// Final balance minus initial balance.
    pub net_profit: Decimal,
    /// Candidate entries rejected by trade sizing.
    pub skipped_entries: usize,
    /// Candidate entries passed over because the risk strategy allowed
    /// zero risk.
    pub no_edge_entries: usize,
}

impl BacktestResult {
    /// Assemble a result and compute its statistics.
    #[must_use]
    pub fn new(
        initial_balance: Decimal,
        trades: Vec<Trade>,
        equity_curve: Vec<Decimal>,
        drawdown_curve: Vec<Decimal>,
        skipped_entries: usize,
    ) -> Self {
        let stats = EquityAnalyzer::new(initial_balance).calculate(&trades);

        Self {
            total_trades: stats.total_trades,
            winning_trades: stats.winning_trades,
            losing_trades: stats.losing_trades,
            win_rate: stats.win_rate,
            profit_factor: stats.profit_factor,
            net_profit: stats.total_pnl,
            trades,
            stats,
            equity_curve,
            drawdown_curve,
            skipped_entries,
            no_edge_entries: 0,
        }
    }

    /// Record entries passed over for lack of an edge.
    #[must_use]
    pub fn with_no_edge_entries(mut self, no_edge_entries: usize) -> Self {
        self.no_edge_entries = no_edge_entries;
        self
    }

    /// Balance after the last trade.
    #[must_use]
    pub fn final_balance(&self) -> Decimal {
        self.stats.final_balance
    }

    /// Largest drawdown in percent.
    #[must_use]
    pub fn max_drawdown_percent(&self) -> Decimal {
        self.stats.max_drawdown_percent
    }

    /// Rough heap footprint, used for batch memory telemetry.
    #[must_use]
    pub fn estimated_memory_bytes(&self) -> usize {
        size_of::<Self>()
            + self.trades.len() * size_of::<Trade>()
            + (self.equity_curve.len() + self.drawdown_curve.len()) * size_of::<Decimal>()
    }
}

/// Rough footprint of a loaded candle series.
#[must_use]
pub fn estimated_series_bytes(candles: &[Candle]) -> usize {
    size_of_val(candles)
}
