//! Executor configuration.

use std::num::NonZeroUsize;

/// Configuration for parallel chunk execution.
///
/// `workers` is both the number of chunks a buffer is split into and the
/// size of the executor's thread pool.
///
/// ```rust
/// use par_rle::ParallelConfig;
///
/// let config = ParallelConfig::with_workers(4);
/// assert_eq!(config.workers.get(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Number of chunks, and threads, per invocation.
    pub workers: NonZeroUsize,
    /// Prefix for pool thread names; the worker index is appended.
    pub thread_name_prefix: String,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN),
            thread_name_prefix: "rle-worker".to_string(),
        }
    }
}

impl ParallelConfig {
    /// Config with `workers` workers. Zero is raised to one.
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: NonZeroUsize::new(workers).unwrap_or(NonZeroUsize::MIN),
            ..Self::default()
        }
    }

    /// A single worker: the sequential baseline.
    pub fn sequential() -> Self {
        Self::with_workers(1)
    }

    pub(crate) fn thread_name(&self, index: usize) -> String {
        format!("{}-{}", self.thread_name_prefix, index)
    }
}
