//! Batch result types.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;

use super::progress::Progress;
use crate::backtest::metrics::mean;
use crate::backtest::result::BacktestResult;

/// A strategy excluded from the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyFailure {
    /// Strategy name.
    pub name: String,
    /// Rendered task error.
    pub error: String,
}

/// Cross-strategy statistics over the successful strategies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BatchAggregates {
    /// Mean win rate, percent.
    pub average_win_rate: Decimal,
    /// Mean profit factor.
    pub average_profit_factor: Decimal,
    /// Mean maximum drawdown, percent.
    pub average_max_drawdown: Decimal,
    /// Highest net profit.
    pub best_strategy: Option<String>,
    /// Lowest net profit.
    pub worst_strategy: Option<String>,
}

impl BatchAggregates {
    /// Aggregate `(name, result)` pairs given in submission order.
    ///
    /// Ties for best or worst go to the earliest strategy.
    #[must_use]
    pub fn from_results(results: &[(&str, &BacktestResult)]) -> Self {
        let average = |f: fn(&BacktestResult) -> Decimal| {
            let values: Vec<Decimal> = results.iter().map(|(_, r)| f(r)).collect();
            mean(&values).unwrap_or(Decimal::ZERO)
        };

        let mut best: Option<(&str, Decimal)> = None;
        let mut worst: Option<(&str, Decimal)> = None;
        for &(name, result) in results {
            let profit = result.net_profit;
            if best.is_none_or(|(_, p)| profit > p) {
                best = Some((name, profit));
            }
            if worst.is_none_or(|(_, p)| profit < p) {
                worst = Some((name, profit));
            }
        }

        Self {
            average_win_rate: average(|r| r.win_rate),
            average_profit_factor: average(|r| r.profit_factor),
            average_max_drawdown: average(|r| r.max_drawdown_percent()),
            best_strategy: best.map(|(name, _)| name.to_string()),
            worst_strategy: worst.map(|(name, _)| name.to_string()),
        }
    }
}

/// Timing and resource telemetry for a batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BatchTelemetry {
    /// Wall time per strategy, failed ones included.
    pub strategy_durations: HashMap<String, Duration>,
    /// Wall time of the whole batch.
    pub total_duration: Duration,
    /// Largest per-task memory estimate, bytes.
    pub peak_memory_bytes: u64,
    /// Number of batches dispatched.
    pub batches_processed: usize,
    /// Worker threads used per batch.
    pub worker_count: usize,
    /// Final progress snapshot.
    pub progress: Progress,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    /// Every submitted strategy name, in submission order.
    pub strategy_names: Vec<String>,
    /// Results of successful strategies, keyed by name.
    pub results: HashMap<String, BacktestResult>,
    /// Excluded strategies, in submission order.
    pub failures: Vec<StrategyFailure>,
    /// Cross-strategy statistics.
    pub aggregates: BatchAggregates,
    /// Timing and memory telemetry.
    pub telemetry: BatchTelemetry,
}

impl BatchResult {
    /// Number of submitted strategies.
    #[must_use]
    pub fn submitted(&self) -> usize {
        self.strategy_names.len()
    }

    /// Submitted strategies that produced no result.
    #[must_use]
    pub fn excluded_count(&self) -> usize {
        self.submitted().saturating_sub(self.results.len())
    }

    /// Result for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BacktestResult> {
        self.results.get(name)
    }

    /// Successful results in submission order, each name once.
    #[must_use]
    pub fn iter_in_order(&self) -> Vec<(&str, &BacktestResult)> {
        let mut seen = HashSet::new();
        self.strategy_names
            .iter()
            .filter(|name| seen.insert(name.as_str()))
            .filter_map(|name| self.results.get(name).map(|r| (name.as_str(), r)))
            .collect()
    }

    /// Whether every submitted strategy succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty() && self.excluded_count() == 0
    }
}
