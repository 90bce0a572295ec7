//! Progress and memory tracking for batch execution.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Lock-free counters shared by all batch workers.
#[derive(Debug)]
pub struct ProgressTracker {
    total_tasks: u64,
    completed_tasks: AtomicU64,
    failed_tasks: AtomicU64,
    peak_memory_bytes: AtomicU64,
    start_time: Instant,
}

impl ProgressTracker {
    /// Create a tracker for `total_tasks` strategies.
    #[must_use]
    pub fn new(total_tasks: u64) -> Self {
        Self {
            total_tasks,
            completed_tasks: AtomicU64::new(0),
            failed_tasks: AtomicU64::new(0),
            peak_memory_bytes: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Mark a task as finished.
    pub fn task_completed(&self, success: bool) {
        self.completed_tasks.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.failed_tasks.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a task's memory estimate; keeps the maximum seen.
    pub fn record_memory(&self, bytes: u64) {
        self.peak_memory_bytes.fetch_max(bytes, Ordering::Relaxed);
    }

    /// Largest memory estimate recorded so far.
    #[must_use]
    pub fn peak_memory_bytes(&self) -> u64 {
        self.peak_memory_bytes.load(Ordering::Relaxed)
    }

    /// Get current progress.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn progress(&self) -> Progress {
        let completed = self.completed_tasks.load(Ordering::Relaxed);
        let failed = self.failed_tasks.load(Ordering::Relaxed);
        let elapsed = self.start_time.elapsed();

        let tasks_per_sec = if elapsed.as_secs_f64() > 0.0 {
            completed as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        let remaining = self.total_tasks.saturating_sub(completed);
        let eta_secs = if tasks_per_sec > 0.0 {
            (remaining as f64 / tasks_per_sec) as u64
        } else {
            0
        };

        Progress {
            total: self.total_tasks,
            completed,
            failed,
            elapsed_secs: elapsed.as_secs(),
            eta_secs,
            tasks_per_sec,
        }
    }
}

/// Progress snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Progress {
    /// Total number of tasks.
    pub total: u64,
    /// Finished tasks, failed ones included.
    pub completed: u64,
    /// Failed tasks.
    pub failed: u64,
    /// Elapsed time in seconds.
    pub elapsed_secs: u64,
    /// Estimated time remaining in seconds.
    pub eta_secs: u64,
    /// Tasks finished per second.
    pub tasks_per_sec: f64,
}

impl Progress {
    /// Get completion percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }

    /// Tasks that finished successfully.
    #[must_use]
    pub const fn succeeded(&self) -> u64 {
        self.completed.saturating_sub(self.failed)
    }
}
