//! Configuration for batch execution.

use std::num::NonZeroUsize;
use std::thread;

use serde::{Deserialize, Serialize};

/// Concurrency and telemetry policy for a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchPolicy {
    /// Worker threads per batch (0 = available parallelism).
    pub worker_count: usize,

    /// Strategies per batch (0 is treated as 1).
    pub batch_size: usize,

    /// Peak memory estimate that triggers a warning (MB, 0 = unlimited).
    pub memory_limit_mb: u64,

    /// Whether to estimate per-task memory.
    pub track_memory: bool,

    /// Whether to log progress after every task.
    pub track_progress: bool,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            worker_count: 0,
            batch_size: 10,
            memory_limit_mb: 0,
            track_memory: true,
            track_progress: true,
        }
    }
}

impl BatchPolicy {
    /// Worker threads actually used, at least 1.
    #[must_use]
    pub fn effective_worker_count(&self) -> usize {
        if self.worker_count > 0 {
            self.worker_count
        } else {
            thread::available_parallelism().map_or(1, NonZeroUsize::get)
        }
    }

    /// Batch size actually used, at least 1.
    #[must_use]
    pub const fn effective_batch_size(&self) -> usize {
        if self.batch_size > 0 { self.batch_size } else { 1 }
    }

    /// Memory limit in bytes, `None` when unlimited.
    #[must_use]
    pub const fn memory_limit_bytes(&self) -> Option<u64> {
        if self.memory_limit_mb > 0 {
            Some(self.memory_limit_mb.saturating_mul(1024 * 1024))
        } else {
            None
        }
    }
}
