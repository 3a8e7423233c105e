//! Script-thread executor configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the single-threaded script executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// OS thread name for the script thread.
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
    /// Queue depth above which a warning is logged on enqueue.
    ///
    /// The task queue itself is unbounded; a slow or stuck handler stalls
    /// every native caller behind it, so a growing queue is worth flagging.
    #[serde(default = "default_queue_warn_depth")]
    pub queue_warn_depth: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            thread_name: default_thread_name(),
            queue_warn_depth: default_queue_warn_depth(),
        }
    }
}

fn default_thread_name() -> String {
    "script-thread".to_string()
}

fn default_queue_warn_depth() -> u64 {
    1024
}
