//! # scripthook-engine
//!
//! The hook dispatch core. Native call sites instrumented with a hook
//! bracket their work with `enter`/`leave`; the engine marshals matching
//! script handlers onto the single script thread, blocking the caller for
//! ordinary hooks and fire-and-forget for the high-frequency category.
//! A separate callback registry fans producer events out to persistent
//! and one-shot script subscriptions.
//!
//! Concurrency contract: `enter`/`leave` and the fire-and-forget filter
//! pre-check are safe from any thread; handler registration, callback
//! registration, event sending, and session reset belong to the script
//! thread, which is also the only place handler callbacks ever run.

pub mod api;
pub mod callbacks;
pub mod hooks;
pub mod registry;

pub use api::EventsApi;
pub use callbacks::CallbackRegistry;
pub use hooks::{DispatchMode, Handler, HandlerFilter, Hook, Pattern};
pub use registry::EventsRegistry;
