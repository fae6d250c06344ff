//! Synchronous bridge over the async drivers.
//!
//! Each adapter owns a current-thread runtime and drives one whole operation to
//! completion. Nothing is scheduled in the background.
//!
//! Callers may already be inside tokio, either in `spawn_blocking` or directly in
//! a task. Such threads carry a runtime context and may not `block_on` another
//! runtime, so the operation is driven from a short-lived scoped thread instead.
//! The calling thread still blocks until it completes.

use crate::error::{DbError, DbResult};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{Builder, Handle, Runtime};

#[derive(Debug, Clone)]
pub(crate) struct BlockingRuntime {
    inner: Arc<RuntimeCell>,
}

/// Owns the runtime and shuts it down without blocking, so the last adapter
/// handle may be dropped anywhere, including inside an async context.
#[derive(Debug)]
struct RuntimeCell {
    runtime: Option<Runtime>,
}

impl Drop for RuntimeCell {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl BlockingRuntime {
    pub(crate) fn new() -> DbResult<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DbError::internal(format!("Failed to start I/O runtime: {}", e)))?;
        Ok(Self {
            inner: Arc::new(RuntimeCell {
                runtime: Some(runtime),
            }),
        })
    }

    /// Block the calling thread until `operation` completes.
    pub(crate) fn run<T, F>(&self, operation: F) -> DbResult<T>
    where
        F: Future<Output = DbResult<T>> + Send,
        T: Send,
    {
        let Some(runtime) = self.inner.runtime.as_ref() else {
            return Err(DbError::internal("I/O runtime already shut down"));
        };

        if Handle::try_current().is_err() {
            return runtime.block_on(operation);
        }

        std::thread::scope(|scope| {
            match scope.spawn(|| runtime.block_on(operation)).join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            }
        })
    }
}
