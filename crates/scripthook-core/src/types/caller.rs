//! Caller identity for hook invocations.
//!
//! Hooks are entered from arbitrary foreign threads, and the engine keys
//! its reentrancy guard and per-invocation scratch state on an explicit
//! [`CallerId`] handle rather than on the operating thread's identity.
//! Call sites running on plain OS threads obtain their handle with
//! [`CallerId::current`]; a host with virtual/green threads can mint one
//! handle per logical caller instead.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_CALLER_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_CALLER_ID: CallerId = CallerId::next();
}

/// Process-unique identity of a native call site driving Enter/Leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerId(u64);

impl CallerId {
    /// Mint a fresh caller identity.
    pub fn next() -> Self {
        Self(NEXT_CALLER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Return the caller identity bound to the current OS thread.
    ///
    /// The first call on a thread mints a handle; later calls on the same
    /// thread return the same one.
    pub fn current() -> Self {
        THREAD_CALLER_ID.with(|id| *id)
    }

    /// Return the raw numeric value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "caller-{}", self.0)
    }
}
