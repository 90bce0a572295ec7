//! Parallel batch backtesting using Rayon.
//!
//! Runs many independent strategy simulations with bounded concurrency:
//! - Strategies are split into consecutive batches of `batch_size`
//! - Each batch runs on a dedicated pool of `worker_count` threads
//! - The next batch starts only after the whole batch has finished
//!
//! A failing strategy (bad data, invalid override, duplicate name, panic)
//! is excluded from the results and aggregates; the batch always completes.
//!
//! # Example
//!
//! ```ignore
//! use strategy_backtester::backtest::parallel::{BatchBacktester, BatchPolicy};
//!
//! let backtester = BatchBacktester::new(BatchPolicy::default());
//! let batch = backtester.run_batch(&strategies, &BacktestConfig::default());
//!
//! for (name, result) in batch.iter_in_order() {
//!     println!("{name}: {}", result.net_profit);
//! }
//! ```

mod config;
mod error;
mod executor;
mod progress;
mod result;
mod types;

pub use config::BatchPolicy;
pub use error::TaskError;
pub use executor::{BatchBacktester, run_batch};
pub use progress::{Progress, ProgressTracker};
pub use result::{BatchAggregates, BatchResult, BatchTelemetry, StrategyFailure};
pub use types::{ConfigOverride, StrategyDefinition};
