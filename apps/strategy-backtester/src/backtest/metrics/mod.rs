//! Equity and risk statistics for backtest evaluation.
//!
//! Computed from an ordered list of resolved trades:
//! - Equity curve anchored at the initial balance
//! - Maximum drawdown (absolute, percent, duration)
//! - Win/loss streaks, including the signed current streak
//! - Sharpe ratio (per-trade returns, annualized with 252 periods)
//! - Profit factor, expectancy and average R-multiple

mod calculator;
mod constants;
mod format;
mod math;
mod types;

pub use calculator::{
    EquityAnalyzer, drawdown_metrics, generate_equity_curve, profit_factor, sharpe_ratio,
};
pub use format::{format_money, format_pct, format_ratio};
pub use math::mean;
pub use types::{DrawdownMetrics, EquityStats};
