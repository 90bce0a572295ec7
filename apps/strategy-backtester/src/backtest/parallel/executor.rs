//! Batch backtest executor using Rayon.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rayon::ThreadPool;
use rayon::prelude::*;
use tracing::{Level, debug, info, span, warn};

use crate::backtest::config::BacktestConfig;
use crate::backtest::engine::Backtester;
use crate::backtest::error::SimulationError;
use crate::backtest::result::{BacktestResult, estimated_series_bytes};

use super::config::BatchPolicy;
use super::error::TaskError;
use super::progress::ProgressTracker;
use super::result::{BatchAggregates, BatchResult, BatchTelemetry, StrategyFailure};
use super::types::StrategyDefinition;

/// State shared by the workers of one batch run. Each map entry is written
/// once, by the task that owns the strategy.
struct BatchState {
    results: Mutex<HashMap<String, BacktestResult>>,
    durations: Mutex<HashMap<String, Duration>>,
    failures: Mutex<Vec<(usize, StrategyFailure)>>,
    tracker: ProgressTracker,
}

impl BatchState {
    fn new(total: usize) -> Self {
        Self {
            results: Mutex::new(HashMap::with_capacity(total)),
            durations: Mutex::new(HashMap::with_capacity(total)),
            failures: Mutex::new(Vec::new()),
            tracker: ProgressTracker::new(total as u64),
        }
    }

    fn record_failure(&self, position: usize, error: &TaskError) {
        warn!(strategy = %error.strategy(), error = %error, "Strategy excluded from batch");
        self.failures.lock().push((
            position,
            StrategyFailure {
                name: error.strategy().to_string(),
                error: error.to_string(),
            },
        ));
        self.tracker.task_completed(false);
    }
}

/// Runs many strategies with bounded concurrency.
#[derive(Debug, Clone, Default)]
pub struct BatchBacktester {
    policy: BatchPolicy,
}

impl BatchBacktester {
    /// Create a batch backtester.
    #[must_use]
    pub const fn new(policy: BatchPolicy) -> Self {
        Self { policy }
    }

    /// Get the batch policy.
    #[must_use]
    pub const fn policy(&self) -> &BatchPolicy {
        &self.policy
    }

    /// Run every strategy against `shared` (plus its own override).
    ///
    /// Never fails as a whole: strategies that cannot run are listed in
    /// `failures` and left out of the results and aggregates.
    pub fn run_batch(
        &self,
        strategies: &[StrategyDefinition],
        shared: &BacktestConfig,
    ) -> BatchResult {
        let start_time = Instant::now();
        let workers = self.policy.effective_worker_count();
        let batch_size = self.policy.effective_batch_size();
        let state = BatchState::new(strategies.len());

        info!(
            strategies = strategies.len(),
            workers, batch_size, "Starting batch backtest"
        );

        let mut seen = HashSet::with_capacity(strategies.len());
        let mut tasks = Vec::with_capacity(strategies.len());
        for (position, strategy) in strategies.iter().enumerate() {
            if seen.insert(strategy.name.as_str()) {
                tasks.push((position, strategy));
            } else {
                state.record_failure(
                    position,
                    &TaskError::DuplicateStrategy {
                        strategy: strategy.name.clone(),
                    },
                );
            }
        }

        let pool = if tasks.is_empty() {
            None
        } else {
            build_pool(workers)
        };

        let mut batches_processed = 0;
        for chunk in tasks.chunks(batch_size) {
            match &pool {
                Some(pool) => pool.install(|| {
                    chunk.par_iter().for_each(|(position, strategy)| {
                        self.execute_task(*position, strategy, shared, &state);
                    });
                }),
                None => {
                    for (position, strategy) in chunk {
                        self.execute_task(*position, strategy, shared, &state);
                    }
                }
            }
            batches_processed += 1;

            let peak = state.tracker.peak_memory_bytes();
            if let Some(limit) = self.policy.memory_limit_bytes()
                && peak > limit
            {
                warn!(
                    peak_bytes = peak,
                    limit_bytes = limit,
                    batch = batches_processed,
                    "Peak memory estimate exceeds limit"
                );
            }
        }

        let progress = state.tracker.progress();
        let peak_memory_bytes = state.tracker.peak_memory_bytes();
        let mut failures = state.failures.into_inner();
        failures.sort_by_key(|(position, _)| *position);

        let mut batch = BatchResult {
            strategy_names: strategies.iter().map(|s| s.name.clone()).collect(),
            results: state.results.into_inner(),
            failures: failures.into_iter().map(|(_, failure)| failure).collect(),
            aggregates: BatchAggregates::default(),
            telemetry: BatchTelemetry {
                strategy_durations: state.durations.into_inner(),
                total_duration: start_time.elapsed(),
                peak_memory_bytes,
                batches_processed,
                worker_count: if pool.is_some() { workers } else { 1 },
                progress,
            },
        };
        let aggregates = BatchAggregates::from_results(&batch.iter_in_order());
        batch.aggregates = aggregates;

        info!(
            succeeded = batch.results.len(),
            excluded = batch.excluded_count(),
            batches = batches_processed,
            elapsed_ms = batch.telemetry.total_duration.as_millis() as u64,
            "Batch backtest complete"
        );

        batch
    }

    fn execute_task(
        &self,
        position: usize,
        strategy: &StrategyDefinition,
        shared: &BacktestConfig,
        state: &BatchState,
    ) {
        let _span = span!(Level::DEBUG, "backtest_strategy", strategy = %strategy.name).entered();
        let start = Instant::now();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run_strategy(strategy, shared, &state.tracker)
        }))
        .unwrap_or_else(|payload| {
            Err(TaskError::Panicked {
                strategy: strategy.name.clone(),
                message: panic_message(payload.as_ref()),
            })
        });

        let elapsed = start.elapsed();
        state
            .durations
            .lock()
            .insert(strategy.name.clone(), elapsed);

        match outcome {
            Ok(result) => {
                debug!(
                    trades = result.total_trades,
                    net_profit = %result.net_profit,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Strategy finished"
                );
                state.results.lock().insert(strategy.name.clone(), result);
                state.tracker.task_completed(true);
            }
            Err(error) => state.record_failure(position, &error),
        }

        if self.policy.track_progress {
            let progress = state.tracker.progress();
            debug!(
                "Progress: {:.1}% ({}/{}) - ETA: {}s",
                progress.percentage(),
                progress.completed,
                progress.total,
                progress.eta_secs
            );
        }
    }

    fn run_strategy(
        &self,
        strategy: &StrategyDefinition,
        shared: &BacktestConfig,
        tracker: &ProgressTracker,
    ) -> Result<BacktestResult, TaskError> {
        let candles = strategy.source.load().map_err(|source| TaskError::Data {
            strategy: strategy.name.clone(),
            source,
        })?;

        let backtester = Backtester::new(strategy.effective_config(shared));
        let result = backtester.run(&candles).map_err(|error| match error {
            SimulationError::Data(source) => TaskError::Data {
                strategy: strategy.name.clone(),
                source,
            },
            source => TaskError::Simulation {
                strategy: strategy.name.clone(),
                source,
            },
        })?;

        if self.policy.track_memory {
            let bytes = estimated_series_bytes(&candles) + result.estimated_memory_bytes();
            tracker.record_memory(bytes as u64);
        }

        Ok(result)
    }
}

/// Run a batch with `policy`.
pub fn run_batch(
    strategies: &[StrategyDefinition],
    shared: &BacktestConfig,
    policy: &BatchPolicy,
) -> BatchResult {
    BatchBacktester::new(policy.clone()).run_batch(strategies, shared)
}

fn build_pool(workers: usize) -> Option<ThreadPool> {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("backtest-worker-{i}"))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            warn!(error = %e, "Failed to build worker pool, running on the calling thread");
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
