//! Error types for candle data and single-strategy simulation.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Candle series that cannot be simulated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataError {
    /// No candles at all.
    #[error("candle series is empty")]
    Empty,

    /// Too few candles to evaluate any entry signal.
    #[error("candle series has {actual} candles, at least {required} are required")]
    Insufficient {
        /// Minimum number of candles.
        required: usize,
        /// Number of candles supplied.
        actual: usize,
    },

    /// Timestamps go backwards.
    #[error("candle {index} at {timestamp} is earlier than the candle before it")]
    Unsorted {
        /// Index of the out-of-order candle.
        index: usize,
        /// Its timestamp.
        timestamp: NaiveDateTime,
    },

    /// Candle with impossible prices.
    #[error("candle {index} is malformed: {reason}")]
    InvalidCandle {
        /// Index of the malformed candle.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// The candle source could not be read.
    #[error("failed to load candles from '{source_name}': {message}")]
    Source {
        /// Source identifier (file path, name).
        source_name: String,
        /// Error message.
        message: String,
    },
}

/// Errors that abort a whole simulation run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// The candle series is unusable.
    #[error(transparent)]
    Data(#[from] DataError),

    /// A configuration value is out of range.
    #[error("invalid backtest config '{field}': {reason}")]
    InvalidConfig {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}
