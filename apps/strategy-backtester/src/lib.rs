// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Strategy Backtester - Rust Core Library
//!
//! Deterministic trade simulation for rule-based entry strategies.
//!
//! # Modules
//!
//! - **risk**: Trade sizing, risk profiles and Monte Carlo risk curves
//!   - `sizing`: Position size, risk/reward amounts and stop/target prices
//! - **backtest**: Candle replay and statistics
//!   - `engine`: Single-strategy simulation
//!   - `metrics`: Equity curve, drawdown, Sharpe, streaks
//!   - `parallel`: Bounded batch execution across many strategies
//! - **config**: YAML configuration with environment interpolation
//!
//! All money and price arithmetic uses `rust_decimal::Decimal`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Candle replay, statistics and batch execution.
pub mod backtest;

/// Configuration loading and logging setup.
pub mod config;

/// Trade sizing and risk management.
pub mod risk;

pub use backtest::parallel::{BatchBacktester, BatchPolicy, BatchResult, StrategyDefinition};
pub use backtest::{BacktestConfig, BacktestResult, Backtester, Candle, Trade, TradeOutcome};
pub use config::{AppConfig, ConfigError, load_config};
pub use risk::sizing::{TradeParameters, TradeResult, TradeSizer};
