//! Executor trait for abstracting parallel execution.
//!
//! This trait allows document construction to fan sections out over a
//! worker pool without being tied to a specific threading implementation.

use std::any::Any;
use std::fmt::{self, Debug};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;
use thiserror::Error;

/// Error type for executor operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("Task panicked: {0}")]
    Panicked(String),

    #[error("Task was dropped before producing a result")]
    Disconnected,

    #[error("Failed to build worker pool: {0}")]
    PoolBuild(String),
}

impl ExecutorError {
    /// Converts a panic payload into a readable error.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        ExecutorError::Panicked(message)
    }
}

/// Runs `f`, turning a panic into an [`ExecutorError::Panicked`].
pub fn run_caught<T, F>(f: F) -> Result<T, ExecutorError>
where
    F: FnOnce() -> T,
{
    catch_unwind(AssertUnwindSafe(f)).map_err(ExecutorError::from_panic)
}

/// Outcome of one attempt to make progress on other pending work while
/// waiting for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpOutcome {
    /// Some other pending work was executed on this thread.
    Executed,
    /// Nothing runnable was found.
    Idle,
    /// This thread cannot help (it does not belong to the pool).
    Unsupported,
}

/// Hook a pool installs into its handles so that a joining worker keeps
/// the pool busy instead of blocking it.
pub type HelpFn = fn() -> HelpOutcome;

/// A handle to a spawned unit of work.
///
/// Handles must be joined to observe the result. Dropping a handle does
/// not cancel the task.
pub struct TaskHandle<T> {
    state: HandleState<T>,
}

enum HandleState<T> {
    Ready(Result<T, ExecutorError>),
    Pending {
        rx: Receiver<Result<T, ExecutorError>>,
        help: Option<HelpFn>,
    },
}

impl<T> TaskHandle<T> {
    /// A handle whose result is already known.
    pub fn ready(result: Result<T, ExecutorError>) -> Self {
        Self {
            state: HandleState::Ready(result),
        }
    }

    /// A handle waiting on a result delivered through `rx`.
    pub fn pending(rx: Receiver<Result<T, ExecutorError>>, help: Option<HelpFn>) -> Self {
        Self {
            state: HandleState::Pending { rx, help },
        }
    }

    /// Waits for the task to finish.
    pub fn join(self) -> Result<T, ExecutorError> {
        match self.state {
            HandleState::Ready(result) => result,
            HandleState::Pending { rx, help: None } => {
                rx.recv().map_err(|_| ExecutorError::Disconnected)?
            }
            HandleState::Pending { rx, help: Some(help) } => loop {
                match rx.try_recv() {
                    Ok(result) => return result,
                    Err(TryRecvError::Disconnected) => return Err(ExecutorError::Disconnected),
                    Err(TryRecvError::Empty) => {}
                }
                match help() {
                    HelpOutcome::Executed => continue,
                    HelpOutcome::Unsupported => {
                        return rx.recv().map_err(|_| ExecutorError::Disconnected)?;
                    }
                    HelpOutcome::Idle => match rx.recv_timeout(Duration::from_millis(1)) {
                        Ok(result) => return result,
                        Err(RecvTimeoutError::Disconnected) => {
                            return Err(ExecutorError::Disconnected);
                        }
                        Err(RecvTimeoutError::Timeout) => {}
                    },
                }
            },
        }
    }
}

impl<T> Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            HandleState::Ready(_) => "ready",
            HandleState::Pending { .. } => "pending",
        };
        f.debug_struct("TaskHandle").field("state", &state).finish()
    }
}

/// A trait for executing work items, potentially in parallel.
///
/// # Implementations
///
/// - `SyncExecutor`: Sequential execution, no threading (always available)
/// - `RayonExecutor`: Dedicated work-stealing pool (`folio-executor`, feature-gated)
pub trait Executor: Send + Sync + Debug {
    /// Submit a single task and return a handle to its result.
    ///
    /// A panic inside `f` is reported by [`TaskHandle::join`] as
    /// [`ExecutorError::Panicked`].
    fn spawn<T, F>(&self, f: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static;

    /// Returns the level of parallelism this executor can provide.
    ///
    /// - Returns 1 for sequential executors
    /// - Returns the configured thread count for parallel executors
    fn parallelism(&self) -> usize;

    /// Returns a human-readable name for this executor (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// A synchronous executor that processes items sequentially.
///
/// `spawn` runs the task to completion before returning, so callers see
/// exactly the order in which they submitted work.
#[derive(Debug, Clone, Default)]
pub struct SyncExecutor;

impl SyncExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Executor for SyncExecutor {
    fn spawn<T, F>(&self, f: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        TaskHandle::ready(run_caught(f))
    }

    fn parallelism(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str {
        "SyncExecutor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, mpsc};

    #[test]
    fn test_sync_spawn_runs_inline() {
        let executor = SyncExecutor::new();
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let handle = executor.spawn(move || {
            flag.store(true, Ordering::SeqCst);
            21 * 2
        });
        assert!(ran.load(Ordering::SeqCst));
        assert_eq!(handle.join(), Ok(42));
    }

    #[test]
    fn test_sync_spawn_catches_panics() {
        let executor = SyncExecutor::new();
        let handle = executor.spawn(|| -> u32 { panic!("boom") });
        match handle.join() {
            Err(ExecutorError::Panicked(msg)) => assert!(msg.contains("boom")),
            other => panic!("expected panic error, got {:?}", other),
        }
    }

    #[test]
    fn test_pending_handle_receives_from_thread() {
        let (tx, rx) = mpsc::channel();
        let handle = TaskHandle::pending(rx, None);
        std::thread::spawn(move || {
            let _ = tx.send(Ok("done"));
        });
        assert_eq!(handle.join(), Ok("done"));
    }

    #[test]
    fn test_pending_handle_reports_disconnect() {
        let (tx, rx) = mpsc::channel::<Result<u8, ExecutorError>>();
        drop(tx);
        let handle = TaskHandle::pending(rx, Some(|| HelpOutcome::Idle));
        assert_eq!(handle.join(), Err(ExecutorError::Disconnected));
    }

    #[test]
    fn test_sync_executor_parallelism_and_name() {
        let executor = SyncExecutor::new();
        assert_eq!(executor.parallelism(), 1);
        assert_eq!(executor.name(), "SyncExecutor");
    }
}
