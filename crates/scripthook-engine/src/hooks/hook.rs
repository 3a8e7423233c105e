//! The enter/leave protocol for one instrumented native call site.
//!
//! Hooks sit on functions called from many foreign threads, so `enter`
//! and `leave` are thread-safe; every private dispatch method is script
//! thread only. For blocking hooks each call submits a unit of work to
//! the script executor and waits for it, which both serializes all
//! script-visible mutation and lets the native caller observe rewritten
//! event names before it resumes. The fire-and-forget category never
//! blocks: a filter-only pre-check decides whether an async task is even
//! worth queueing.
//!
//! No failure is ever thrown back at the native call site. Protocol
//! violations and script callback errors alike are annotated with the
//! hook name and operation and resubmitted on the executor's error
//! channel, and `enter`/`leave` return normally.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, RwLock};

use scripthook_core::error::AppError;
use scripthook_core::result::AppResult;
use scripthook_core::traits::ScriptBridge;
use scripthook_core::types::CallerId;
use scripthook_executor::ScriptExecutor;

use super::handler::Handler;

/// How a hook hands work to the script thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// `enter`/`leave` block the native caller until the script thread
    /// has run the handlers; rewritten event names propagate back.
    Blocking,
    /// `enter` queues an async task (after a filter pre-check) and
    /// returns immediately; `leave` is a no-op and nothing propagates
    /// back to the caller.
    FireAndForget,
}

/// One instrumented native call site with its ordered handler list.
pub struct Hook {
    name: String,
    /// Context property the event name is exposed (and rewritten) under.
    event_name_property: String,
    /// Context property for the success flag at leave, if this hook has one.
    succeeded_property: Option<String>,
    mode: DispatchMode,
    bridge: Arc<dyn ScriptBridge>,
    executor: Arc<ScriptExecutor>,
    /// Callers that have entered and not yet left.
    in_progress: Mutex<HashSet<CallerId>>,
    /// Registration order is dispatch order, for enter and leave both.
    handlers: RwLock<Vec<Handler>>,
}

impl Hook {
    /// Create a hook. The handler list starts empty; registration happens
    /// on the script thread via [`Hook::add_handler`].
    pub fn new(
        name: &str,
        event_name_property: &str,
        succeeded_property: Option<&str>,
        mode: DispatchMode,
        bridge: Arc<dyn ScriptBridge>,
        executor: Arc<ScriptExecutor>,
    ) -> Self {
        Self {
            name: name.to_string(),
            event_name_property: event_name_property.to_string(),
            succeeded_property: succeeded_property.map(str::to_string),
            mode,
            bridge,
            executor,
            in_progress: Mutex::new(HashSet::new()),
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// The hook's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The hook's dispatch mode.
    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Append a handler. Script thread only.
    pub fn add_handler(&self, handler: Handler) {
        let mut handlers = self.write_handlers();
        handlers.push(handler);
        tracing::info!(
            hook = %self.name,
            handler_count = handlers.len(),
            "Hook handler registered"
        );
    }

    /// Number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.read_handlers().len()
    }

    /// Drop every handler and all in-flight bookkeeping. Session reset.
    pub fn clear(&self) {
        self.write_handlers().clear();
        self.lock_in_progress().clear();
    }

    /// Native entry point: the instrumented call is about to run.
    ///
    /// Blocking hooks suspend the caller until every matching handler has
    /// run on the script thread and write the final (possibly rewritten)
    /// event name back through `event_name`. Fire-and-forget hooks return
    /// immediately, queueing work only when some handler's filter could
    /// match. Always returns normally; failures go to the error channel.
    pub fn enter(self: &Arc<Self>, caller: CallerId, id: u32, event_name: &mut String) {
        match self.mode {
            DispatchMode::FireAndForget => self.enter_async(caller, id, event_name),
            DispatchMode::Blocking => self.enter_blocking(caller, id, event_name),
        }
    }

    /// Native entry point: the instrumented call has finished.
    ///
    /// No-op for fire-and-forget hooks. Always returns normally.
    pub fn leave(self: &Arc<Self>, caller: CallerId, succeeded: bool) {
        if self.mode == DispatchMode::FireAndForget {
            return;
        }

        let hook = Arc::clone(self);
        let outcome = self.executor.push(move || {
            if let Err(e) = hook.dispatch_leave(caller, succeeded) {
                hook.report(e, "leave");
            }
        });
        if let Err(e) = outcome {
            self.report(e, "leave");
        }
    }

    fn enter_blocking(self: &Arc<Self>, caller: CallerId, id: u32, event_name: &mut String) {
        let hook = Arc::clone(self);
        let name_in = event_name.clone();
        let outcome = self.executor.push(move || {
            match hook.dispatch_enter_guarded(caller, id, name_in) {
                Ok(rewritten) => Some(rewritten),
                Err(e) => {
                    hook.report(e, "enter");
                    None
                }
            }
        });
        match outcome {
            Ok(Some(rewritten)) => *event_name = rewritten,
            Ok(None) => {}
            Err(e) => self.report(e, "enter"),
        }
    }

    fn enter_async(self: &Arc<Self>, caller: CallerId, id: u32, event_name: &str) {
        // Unsynchronized pre-check against immutable filter fields only;
        // if nothing could match, skip the queue entirely.
        {
            let handlers = self.read_handlers();
            if !handlers.iter().any(|h| h.filter().matches(id, event_name)) {
                return;
            }
        }

        let hook = Arc::clone(self);
        let name_in = event_name.to_string();
        self.executor.add_task(move || {
            if let Err(e) = hook.dispatch_enter(caller, id, name_in) {
                hook.report(e, "enter");
            }
            hook.discard_invocations(caller);
        });
    }

    /// Reentrancy-guarded enter for blocking hooks. Script thread only.
    fn dispatch_enter_guarded(&self, caller: CallerId, id: u32, event_name: String) -> AppResult<String> {
        // The caller goes in progress before any fallible work, so even a
        // failing handler keeps the enter/leave bracket balanced.
        {
            let mut in_progress = self.lock_in_progress();
            if !in_progress.insert(caller) {
                return Err(AppError::reentrancy(format!(
                    "'{}' is already processing",
                    self.name
                )));
            }
        }
        self.dispatch_enter(caller, id, event_name)
    }

    /// Run each handler's enter callback in registration order, threading
    /// the (possibly rewritten) event name through. Script thread only.
    fn dispatch_enter(&self, caller: CallerId, id: u32, mut event_name: String) -> AppResult<String> {
        let mut handlers = self.write_handlers();
        tracing::debug!(
            hook = %self.name,
            caller = %caller,
            id,
            event = %event_name,
            handler_count = handlers.len(),
            "Dispatching enter"
        );

        for handler in handlers.iter_mut() {
            let matched = handler.filter().matches(id, &event_name);
            let context = {
                let invocation = handler.invocation_entry(self.bridge.as_ref(), caller);
                invocation.matched = matched;
                if !matched {
                    continue;
                }
                invocation.prepare(self.bridge.as_ref());
                // Storage is scoped to one enter/leave pair, not to the
                // caller's lifetime.
                invocation.storage.clear();
                invocation.context.clone()
            };

            context.set("selfId", self.bridge.number(f64::from(id)));
            context.set(&self.event_name_property, self.bridge.string(&event_name));
            handler
                .enter_callback()
                .call(&[self.bridge.undefined(), context.clone()])?;

            // The handler may have rewritten the event name; the next
            // handler and the native caller both see the new value.
            event_name = context
                .get(&self.event_name_property)
                .expect_str(&self.event_name_property)?;
        }

        Ok(event_name)
    }

    /// Run each matched handler's leave callback in registration order and
    /// discard the caller's scratch state. Script thread only.
    fn dispatch_leave(&self, caller: CallerId, succeeded: bool) -> AppResult<()> {
        {
            let mut in_progress = self.lock_in_progress();
            if !in_progress.remove(&caller) {
                return Err(AppError::reentrancy(format!(
                    "'{}' is not processing",
                    self.name
                )));
            }
        }

        let mut handlers = self.write_handlers();
        tracing::debug!(
            hook = %self.name,
            caller = %caller,
            succeeded,
            "Dispatching leave"
        );

        for handler in handlers.iter_mut() {
            let Some(mut invocation) = handler.take_invocation(caller) else {
                return Err(AppError::internal(format!(
                    "Missing invocation state for {caller} on '{}'",
                    self.name
                )));
            };
            if !invocation.matched {
                continue;
            }

            invocation.prepare(self.bridge.as_ref());
            if let Some(property) = &self.succeeded_property {
                invocation
                    .context
                    .set(property, self.bridge.bool(succeeded));
            }
            handler
                .leave_callback()
                .call(&[self.bridge.undefined(), invocation.context.clone()])?;
        }

        Ok(())
    }

    /// Drop the caller's scratch on every handler (fire-and-forget path,
    /// which has no leave to do it).
    fn discard_invocations(&self, caller: CallerId) {
        let mut handlers = self.write_handlers();
        for handler in handlers.iter_mut() {
            handler.take_invocation(caller);
        }
    }

    fn report(&self, err: AppError, operation: &str) {
        self.executor
            .report(err.while_performing(operation, &self.name));
    }

    fn read_handlers(&self) -> std::sync::RwLockReadGuard<'_, Vec<Handler>> {
        self.handlers.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_handlers(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Handler>> {
        self.handlers.write().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_in_progress(&self) -> std::sync::MutexGuard<'_, HashSet<CallerId>> {
        self.in_progress.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether the caller has invocation scratch on any handler.
    #[cfg(test)]
    pub(crate) fn has_invocation_state(&self, caller: CallerId) -> bool {
        self.read_handlers()
            .iter()
            .any(|h| h.has_invocation(caller))
    }
}
