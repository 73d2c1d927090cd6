//! Rayon-based parallel executor.
//!
//! Each executor owns a dedicated work-stealing pool so that a document's
//! worker count is independent of rayon's global configuration.

use folio_traits::{Executor, ExecutorError, HelpOutcome, TaskHandle, run_caught};
use log::debug;
use std::fmt;
use std::sync::{Arc, mpsc};

/// A parallel executor backed by its own rayon thread pool.
///
/// Clones share the same pool.
///
/// # Example
///
/// ```ignore
/// use folio_executor::RayonExecutor;
/// use folio_traits::Executor;
///
/// let executor = RayonExecutor::with_threads(4)?;
/// let handle = executor.spawn(|| 6 * 7);
/// assert_eq!(handle.join()?, 42);
/// ```
#[derive(Clone)]
pub struct RayonExecutor {
    pool: Arc<rayon::ThreadPool>,
    num_threads: usize,
}

impl RayonExecutor {
    /// Creates an executor with one worker per available CPU.
    ///
    /// # Errors
    ///
    /// Returns `ExecutorError::PoolBuild` if the pool cannot be created.
    pub fn new() -> Result<Self, ExecutorError> {
        Self::with_threads(0)
    }

    /// Creates an executor with exactly `threads` workers (0 means one per CPU).
    ///
    /// # Errors
    ///
    /// Returns `ExecutorError::PoolBuild` if the pool cannot be created.
    pub fn with_threads(threads: usize) -> Result<Self, ExecutorError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("folio-worker-{}", i))
            .build()
            .map_err(|e| ExecutorError::PoolBuild(e.to_string()))?;
        let num_threads = pool.current_num_threads();
        debug!("Started rayon pool with {} worker(s)", num_threads);
        Ok(Self {
            pool: Arc::new(pool),
            num_threads,
        })
    }
}

impl fmt::Debug for RayonExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RayonExecutor")
            .field("num_threads", &self.num_threads)
            .finish()
    }
}

fn help_pool() -> HelpOutcome {
    match rayon::yield_now() {
        Some(rayon::Yield::Executed) => HelpOutcome::Executed,
        Some(rayon::Yield::Idle) => HelpOutcome::Idle,
        None => HelpOutcome::Unsupported,
    }
}

impl Executor for RayonExecutor {
    fn spawn<T, F>(&self, f: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        self.pool.spawn(move || {
            // The receiver may already be gone if the handle was dropped.
            let _ = tx.send(run_caught(f));
        });
        TaskHandle::pending(rx, Some(help_pool))
    }

    fn parallelism(&self) -> usize {
        self.num_threads
    }

    fn name(&self) -> &'static str {
        "RayonExecutor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_parallelism_matches_requested_threads() {
        let executor = RayonExecutor::with_threads(3).unwrap();
        assert_eq!(executor.parallelism(), 3);
        assert_eq!(executor.name(), "RayonExecutor");
    }

    #[test]
    fn test_spawn_runs_on_pool() {
        let executor = RayonExecutor::with_threads(2).unwrap();
        let handle = executor.spawn(|| {
            std::thread::current()
                .name()
                .map(|n| n.starts_with("folio-worker-"))
                .unwrap_or(false)
        });
        assert_eq!(handle.join(), Ok(true));
    }

    #[test]
    fn test_spawn_panic_surfaces_as_error() {
        let executor = RayonExecutor::with_threads(2).unwrap();
        let handle = executor.spawn(|| -> u8 { panic!("worker failed") });
        assert!(matches!(handle.join(), Err(ExecutorError::Panicked(m)) if m.contains("worker failed")));
    }

    #[test]
    fn test_nested_joins_do_not_starve_a_single_worker() {
        // Every task joins children spawned on the same one-thread pool.
        let executor = RayonExecutor::with_threads(1).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        let outer_exec = executor.clone();
        let outer_counter = counter.clone();
        let handle = executor.spawn(move || {
            let children: Vec<_> = (0..4)
                .map(|_| {
                    let c = outer_counter.clone();
                    let inner_exec = outer_exec.clone();
                    outer_exec.spawn(move || {
                        let grandchild_counter = c.clone();
                        let grandchild = inner_exec.spawn(move || {
                            grandchild_counter.fetch_add(1, Ordering::SeqCst);
                        });
                        grandchild.join()?;
                        c.fetch_add(1, Ordering::SeqCst);
                        Ok::<(), ExecutorError>(())
                    })
                })
                .collect();
            children
                .into_iter()
                .map(|h| h.join().and_then(|r| r))
                .collect::<Result<Vec<()>, ExecutorError>>()
        });

        assert!(handle.join().unwrap().is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }
}
