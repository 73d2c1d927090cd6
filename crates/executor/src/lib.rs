//! Executor implementations for folio.
//!
//! ## Available Executors
//!
//! - [`RayonExecutor`]: Dedicated work-stealing thread pool (feature: `rayon`)
//! - [`SyncExecutor`]: Sequential execution (re-exported from folio-traits)
//!
//! ## Usage
//!
//! ```ignore
//! use folio_executor::{ExecutorImpl, RayonExecutor};
//! use folio_traits::Executor;
//!
//! let executor = ExecutorImpl::Rayon(RayonExecutor::with_threads(4)?);
//! let answer = executor.spawn(|| 6 * 7).join()?;
//! ```

#[cfg(feature = "rayon")]
mod rayon_executor;

#[cfg(feature = "rayon")]
pub use rayon_executor::RayonExecutor;

// Re-export from folio-traits
pub use folio_traits::{Executor, ExecutorError, SyncExecutor, TaskHandle};

/// A type-erased executor that wraps concrete executor implementations.
///
/// Since the `Executor` trait has generic methods, it cannot be used as a trait object
/// (`dyn Executor`). This enum provides a workaround by holding concrete executor types
/// and delegating method calls to them.
#[derive(Clone, Debug)]
pub enum ExecutorImpl {
    /// Sequential executor (no parallelism)
    Sync(SyncExecutor),

    /// Rayon work-stealing thread pool executor
    #[cfg(feature = "rayon")]
    Rayon(RayonExecutor),
}

impl ExecutorImpl {
    /// Picks an executor for `workers` threads: one worker runs inline,
    /// more use a dedicated pool when the `rayon` feature is enabled.
    ///
    /// # Errors
    ///
    /// Returns `ExecutorError::PoolBuild` if the pool cannot be created.
    pub fn for_workers(workers: usize) -> Result<Self, ExecutorError> {
        if workers <= 1 {
            return Ok(ExecutorImpl::Sync(SyncExecutor::new()));
        }
        #[cfg(feature = "rayon")]
        {
            Ok(ExecutorImpl::Rayon(RayonExecutor::with_threads(workers)?))
        }
        #[cfg(not(feature = "rayon"))]
        {
            log::warn!(
                "{} workers requested but parallel execution is disabled; running inline",
                workers
            );
            Ok(ExecutorImpl::Sync(SyncExecutor::new()))
        }
    }
}

impl Executor for ExecutorImpl {
    fn spawn<T, F>(&self, f: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        match self {
            ExecutorImpl::Sync(exec) => exec.spawn(f),
            #[cfg(feature = "rayon")]
            ExecutorImpl::Rayon(exec) => exec.spawn(f),
        }
    }

    fn parallelism(&self) -> usize {
        match self {
            ExecutorImpl::Sync(exec) => exec.parallelism(),
            #[cfg(feature = "rayon")]
            ExecutorImpl::Rayon(exec) => exec.parallelism(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ExecutorImpl::Sync(exec) => exec.name(),
            #[cfg(feature = "rayon")]
            ExecutorImpl::Rayon(exec) => exec.name(),
        }
    }
}

impl Default for ExecutorImpl {
    fn default() -> Self {
        ExecutorImpl::Sync(SyncExecutor::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_worker_is_sync() {
        let exec = ExecutorImpl::for_workers(1).unwrap();
        assert_eq!(exec.name(), "SyncExecutor");
        assert_eq!(exec.parallelism(), 1);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_many_workers_use_pool() {
        let exec = ExecutorImpl::for_workers(2).unwrap();
        assert_eq!(exec.name(), "RayonExecutor");
        assert_eq!(exec.parallelism(), 2);
        assert_eq!(exec.spawn(|| "ok").join(), Ok("ok"));
    }
}
