//! # scripthook-executor
//!
//! The single-threaded work executor all script-visible logic runs on.
//!
//! Many native threads may submit work concurrently; exactly one dedicated
//! OS thread ("the script thread") consumes the queue, so everything
//! submitted here is serialized in submission order. Two primitives cover
//! every need of the hook engine:
//!
//! - [`ScriptExecutor::push`] — submit a closure and block the calling
//!   thread until the script thread has run it, returning its result.
//!   This is the synchronous remote-call used by blocking hook dispatch.
//! - [`ScriptExecutor::add_task`] — best-effort asynchronous enqueue used
//!   by fire-and-forget hook dispatch and by error reporting.
//!
//! Failures inside hook or callback logic must never unwind through a
//! foreign native stack, so they are resubmitted via
//! [`ScriptExecutor::report`] as independent tasks that log the error and
//! forward it to the executor's error channel.

pub mod executor;

pub use executor::ScriptExecutor;
