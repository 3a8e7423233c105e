//! The engine's public surface: typed entry points for native call sites
//! and a script-facing API object for handler and callback registration.

use std::sync::Arc;

use scripthook_core::error::AppError;
use scripthook_core::result::AppResult;
use scripthook_core::traits::{NativeFn, ScriptBridge, ScriptValue, ValueKind};
use scripthook_core::types::CallerId;
use scripthook_executor::ScriptExecutor;

use crate::hooks::{Handler, HandlerFilter, Pattern};
use crate::registry::{EventsRegistry, SEND_ANIMATION_EVENT, SEND_PAPYRUS_EVENT};

/// Facade over the event registry.
///
/// Native code calls the typed `*_enter`/`*_leave` methods from whatever
/// thread it runs on; script code registers handlers and callbacks through
/// [`EventsApi::script_api`] (or the typed registration methods) on the
/// script thread.
pub struct EventsApi {
    bridge: Arc<dyn ScriptBridge>,
    registry: Arc<EventsRegistry>,
}

impl EventsApi {
    /// Build the API with a fresh registry.
    pub fn new(bridge: Arc<dyn ScriptBridge>, executor: Arc<ScriptExecutor>) -> Self {
        let registry = Arc::new(EventsRegistry::new(Arc::clone(&bridge), executor));
        Self { bridge, registry }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Arc<EventsRegistry> {
        &self.registry
    }

    /// Register a handler on a hook. Script thread only.
    pub fn add_handler(
        &self,
        hook_name: &str,
        handler_object: &ScriptValue,
        min_id: Option<u32>,
        max_id: Option<u32>,
        pattern: Option<&str>,
    ) -> AppResult<()> {
        let hook = self
            .registry
            .hook(hook_name)
            .ok_or_else(|| AppError::validation(format!("Unknown hook '{hook_name}'")))?;
        let filter = HandlerFilter {
            min_id,
            max_id,
            pattern: pattern.map(Pattern::parse).transpose()?,
        };
        hook.add_handler(Handler::new(handler_object, filter)?);
        Ok(())
    }

    /// Subscribe a persistent callback to an event category. Script thread only.
    pub fn on(&self, event_name: &str, callback: ScriptValue) -> AppResult<()> {
        self.registry.callbacks().on(event_name, callback)
    }

    /// Subscribe a one-shot callback to an event category. Script thread only.
    pub fn once(&self, event_name: &str, callback: ScriptValue) -> AppResult<()> {
        self.registry.callbacks().once(event_name, callback)
    }

    /// Broadcast an event to its subscribers. Script thread only.
    pub fn send_event(&self, event_name: &str, args: &[ScriptValue]) {
        self.registry.callbacks().send_event(event_name, args);
    }

    /// Drop all handlers and subscriptions. Script thread only.
    pub fn clear(&self) {
        self.registry.clear();
    }

    /// Animation-event call site is about to run. Blocks the caller;
    /// rewritten event names come back through `event_name`.
    pub fn send_animation_event_enter(&self, caller: CallerId, id: u32, event_name: &mut String) {
        if let Some(hook) = self.registry.hook(SEND_ANIMATION_EVENT) {
            hook.enter(caller, id, event_name);
        }
    }

    /// Animation-event call site has finished.
    pub fn send_animation_event_leave(&self, caller: CallerId, succeeded: bool) {
        if let Some(hook) = self.registry.hook(SEND_ANIMATION_EVENT) {
            hook.leave(caller, succeeded);
        }
    }

    /// Script-event call site is about to run. Never blocks.
    pub fn send_papyrus_event_enter(&self, caller: CallerId, id: u32, event_name: &mut String) {
        if let Some(hook) = self.registry.hook(SEND_PAPYRUS_EVENT) {
            hook.enter(caller, id, event_name);
        }
    }

    /// Script-event call site has finished. No-op by mode, kept for a
    /// symmetric call surface.
    pub fn send_papyrus_event_leave(&self, caller: CallerId, succeeded: bool) {
        if let Some(hook) = self.registry.hook(SEND_PAPYRUS_EVENT) {
            hook.leave(caller, succeeded);
        }
    }

    /// Build the script-facing API object:
    ///
    /// ```text
    /// {
    ///   hooks: { sendAnimationEvent: { add }, sendPapyrusEvent: { add } },
    ///   on, once, sendEvent, clear,
    /// }
    /// ```
    ///
    /// Each `add` takes `(handlerObject, minSelfId?, maxSelfId?, pattern?)`;
    /// non-number bounds and non-string patterns are treated as absent.
    pub fn script_api(self: &Arc<Self>) -> ScriptValue {
        let root = self.bridge.object();

        let hooks = self.bridge.object();
        for hook in self.registry.hooks() {
            let entry = self.bridge.object();
            entry.set("add", self.bridge.function(self.make_add_fn(hook.name())));
            hooks.set(hook.name(), entry);
        }
        root.set("hooks", hooks);

        let api = Arc::clone(self);
        let on: NativeFn = Arc::new(move |args| {
            let event_name = arg(api.bridge.as_ref(), args, 1).expect_str("eventName")?;
            api.on(&event_name, arg(api.bridge.as_ref(), args, 2))?;
            Ok(api.bridge.undefined())
        });
        root.set("on", self.bridge.function(on));

        let api = Arc::clone(self);
        let once: NativeFn = Arc::new(move |args| {
            let event_name = arg(api.bridge.as_ref(), args, 1).expect_str("eventName")?;
            api.once(&event_name, arg(api.bridge.as_ref(), args, 2))?;
            Ok(api.bridge.undefined())
        });
        root.set("once", self.bridge.function(once));

        let api = Arc::clone(self);
        let send_event: NativeFn = Arc::new(move |args| {
            let event_name = arg(api.bridge.as_ref(), args, 1).expect_str("eventName")?;
            api.send_event(&event_name, args.get(2..).unwrap_or(&[]));
            Ok(api.bridge.undefined())
        });
        root.set("sendEvent", self.bridge.function(send_event));

        let api = Arc::clone(self);
        let clear: NativeFn = Arc::new(move |_| {
            api.clear();
            Ok(api.bridge.undefined())
        });
        root.set("clear", self.bridge.function(clear));

        root
    }

    fn make_add_fn(self: &Arc<Self>, hook_name: &str) -> NativeFn {
        let api = Arc::clone(self);
        let hook_name = hook_name.to_string();
        Arc::new(move |args| {
            let handler_object = arg(api.bridge.as_ref(), args, 1);
            let min_id = number_arg(args, 2);
            let max_id = number_arg(args, 3);
            let pattern = string_arg(args, 4);
            api.add_handler(
                &hook_name,
                &handler_object,
                min_id,
                max_id,
                pattern.as_deref(),
            )?;
            Ok(api.bridge.undefined())
        })
    }
}

/// Missing trailing arguments read as undefined, like an absent property
/// would.
fn arg(bridge: &dyn ScriptBridge, args: &[ScriptValue], index: usize) -> ScriptValue {
    args.get(index)
        .cloned()
        .unwrap_or_else(|| bridge.undefined())
}

fn number_arg(args: &[ScriptValue], index: usize) -> Option<u32> {
    args.get(index)
        .filter(|v| v.kind() == ValueKind::Number)
        .and_then(ScriptValue::as_f64)
        .map(|n| n as u32)
}

fn string_arg(args: &[ScriptValue], index: usize) -> Option<String> {
    args.get(index)
        .filter(|v| v.kind() == ValueKind::String)
        .and_then(|v| v.as_str())
}
