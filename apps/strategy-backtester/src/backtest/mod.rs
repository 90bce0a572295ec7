//! Candle-driven backtest simulation.
//!
//! - **Engine**: one position at a time, opened on a directional candle and
//!   resolved by stop, target or holding horizon
//! - **Triggers**: candle-range stop/target detection with same-bar priority
//! - **Metrics**: equity curve, drawdown, streaks, Sharpe and profit factor
//! - **Parallel**: many strategies in bounded batches with failure isolation
//! - **Reports**: plain-text, Markdown and CSV renderers
//!
//! # Example
//!
//! ```ignore
//! use strategy_backtester::backtest::{BacktestConfig, Backtester, Candle};
//!
//! let backtester = Backtester::new(BacktestConfig::default());
//! let result = backtester.run(&candles)?;
//!
//! println!("{}", format_stats_report(&result.stats));
//! ```

mod candle;
mod config;
mod data_source;
mod engine;
mod error;
pub mod metrics;
pub mod parallel;
mod position;
mod report;
mod result;
mod trade;
mod triggers;

pub use candle::{Candle, validate_series};
pub use config::{BacktestConfig, SameBarPriority, StrategyType};
pub use data_source::{
    CandleSource, CsvFileSource, InMemoryCandleSource, ParsedCandles, discover_csv_strategies,
    parse_candles_csv,
};
pub use engine::{Backtester, MIN_CANDLES, detect_signal, run_single};
pub use error::{DataError, SimulationError};
pub use position::OpenPosition;
pub use report::{batch_to_json, format_batch_summary, format_stats_report, trades_to_csv};
pub use result::{BacktestResult, estimated_series_bytes};
pub use trade::{ExitFill, ExitReason, Trade, TradeOutcome};
pub use triggers::{
    TriggerResult, TriggerType, evaluate_triggers, is_stop_triggered, is_target_triggered,
};
