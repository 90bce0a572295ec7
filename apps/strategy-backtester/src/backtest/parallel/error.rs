//! Error types for batch tasks.

use thiserror::Error;

use crate::backtest::error::{DataError, SimulationError};

/// Why a strategy was excluded from a batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The candle source could not be loaded.
    #[error("strategy '{strategy}': {source}")]
    Data {
        /// Strategy name.
        strategy: String,
        /// Underlying data error.
        source: DataError,
    },

    /// The simulation rejected the config or the series.
    #[error("strategy '{strategy}': {source}")]
    Simulation {
        /// Strategy name.
        strategy: String,
        /// Underlying simulation error.
        source: SimulationError,
    },

    /// Another strategy with the same name was submitted first.
    #[error("strategy '{strategy}' was submitted more than once")]
    DuplicateStrategy {
        /// Strategy name.
        strategy: String,
    },

    /// The task panicked.
    #[error("strategy '{strategy}' panicked: {message}")]
    Panicked {
        /// Strategy name.
        strategy: String,
        /// Panic payload, when it was a string.
        message: String,
    },
}

impl TaskError {
    /// Name of the failed strategy.
    #[must_use]
    pub fn strategy(&self) -> &str {
        match self {
            Self::Data { strategy, .. }
            | Self::Simulation { strategy, .. }
            | Self::DuplicateStrategy { strategy }
            | Self::Panicked { strategy, .. } => strategy,
        }
    }
}
