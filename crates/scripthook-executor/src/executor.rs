//! The script-thread executor.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;

use tokio::sync::{mpsc, oneshot};

use scripthook_core::config::executor::ExecutorConfig;
use scripthook_core::error::{AppError, ErrorKind};
use scripthook_core::result::AppResult;

/// A unit of work for the script thread.
type Task = Box<dyn FnOnce() + Send + 'static>;

/// Owns the script thread and the serialized task queue feeding it.
///
/// All methods are callable from any thread. [`ScriptExecutor::push`] must
/// not be called from the script thread itself — the queue is strictly
/// ordered, so waiting on later work from within earlier work deadlocks.
pub struct ScriptExecutor {
    tx: mpsc::UnboundedSender<Task>,
    error_tx: mpsc::UnboundedSender<AppError>,
    errors: Mutex<mpsc::UnboundedReceiver<AppError>>,
    /// Number of `add_task` enqueues since spawn.
    queued_tasks: AtomicU64,
    /// Tasks sent but not yet finished, for the queue-depth warning.
    depth: Arc<AtomicU64>,
    queue_warn_depth: u64,
    thread: Option<JoinHandle<()>>,
}

impl ScriptExecutor {
    /// Start the script thread and return a handle to its queue.
    pub fn spawn(config: &ExecutorConfig) -> AppResult<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Task>();
        let (error_tx, error_rx) = mpsc::unbounded_channel();
        let depth = Arc::new(AtomicU64::new(0));

        let worker_depth = Arc::clone(&depth);
        let thread = std::thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || {
                while let Some(task) = rx.blocking_recv() {
                    task();
                    worker_depth.fetch_sub(1, Ordering::Relaxed);
                }
                tracing::debug!("script thread queue closed, exiting");
            })
            .map_err(|e| {
                AppError::with_source(ErrorKind::Executor, "Failed to spawn script thread", e)
            })?;

        tracing::info!(thread = %config.thread_name, "Script executor started");

        Ok(Self {
            tx,
            error_tx,
            errors: Mutex::new(error_rx),
            queued_tasks: AtomicU64::new(0),
            depth,
            queue_warn_depth: config.queue_warn_depth,
            thread: Some(thread),
        })
    }

    /// Submit work to the script thread and block until it has run.
    ///
    /// Returns the closure's result, or an executor error if the script
    /// thread is gone. This is the blocking cross-thread hand-off used by
    /// mode-A hook dispatch: the calling native thread resumes only after
    /// the script thread has fully applied the submitted work.
    pub fn push<R, F>(&self, f: F) -> AppResult<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        self.enqueue(Box::new(move || {
            let _ = done_tx.send(f());
        }))?;
        done_rx
            .blocking_recv()
            .map_err(|_| AppError::executor("Script thread dropped a submitted task"))
    }

    /// Enqueue work without waiting for it.
    ///
    /// Best effort: if the script thread is gone the task is dropped with
    /// a warning. Enqueues are counted and observable via
    /// [`ScriptExecutor::queued_task_count`].
    pub fn add_task<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queued_tasks.fetch_add(1, Ordering::Relaxed);
        if self.enqueue(Box::new(f)).is_err() {
            tracing::warn!("Dropped task: script thread is not running");
        }
    }

    /// Resubmit a failure as an independent task on the error channel.
    ///
    /// The error is logged on the script thread and forwarded to the
    /// channel drained by [`ScriptExecutor::drain_errors`]; nothing is
    /// ever rethrown at the thread that hit the failure.
    pub fn report(&self, err: AppError) {
        let error_tx = self.error_tx.clone();
        self.add_task(move || {
            tracing::error!(error = %err, "Script task failed");
            let _ = error_tx.send(err);
        });
    }

    /// Take every error reported so far.
    ///
    /// Reports travel through the task queue, so callers that need a
    /// consistent view should [`ScriptExecutor::flush`] first.
    pub fn drain_errors(&self) -> Vec<AppError> {
        let mut rx = self.errors.lock().unwrap_or_else(|e| e.into_inner());
        let mut out = Vec::new();
        while let Ok(err) = rx.try_recv() {
            out.push(err);
        }
        out
    }

    /// Block until every task queued before this call has finished.
    pub fn flush(&self) {
        let _ = self.push(|| ());
    }

    /// Number of `add_task` enqueues since spawn.
    pub fn queued_task_count(&self) -> u64 {
        self.queued_tasks.load(Ordering::Relaxed)
    }

    /// Close the queue, run what remains, and join the script thread.
    pub fn shutdown(mut self) {
        drop(self.tx);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
        tracing::info!("Script executor stopped");
    }

    fn enqueue(&self, task: Task) -> AppResult<()> {
        let depth = self.depth.fetch_add(1, Ordering::Relaxed) + 1;
        if depth == self.queue_warn_depth {
            tracing::warn!(depth, "Script task queue is backing up");
        }
        self.tx
            .send(task)
            .map_err(|_| AppError::executor("Script thread is not running"))
    }
}
