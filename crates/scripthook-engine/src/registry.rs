//! The engine's top-level registry: the built-in hooks and the named-event
//! callback registry, constructed together and reset together.

use std::sync::Arc;

use scripthook_core::traits::ScriptBridge;
use scripthook_executor::ScriptExecutor;

use crate::callbacks::CallbackRegistry;
use crate::hooks::{DispatchMode, Hook};

/// Name of the blocking animation-event hook.
pub const SEND_ANIMATION_EVENT: &str = "sendAnimationEvent";
/// Name of the fire-and-forget script-event hook.
pub const SEND_PAPYRUS_EVENT: &str = "sendPapyrusEvent";

/// Owns every hook and the callback registry for one engine instance.
///
/// The hook set is fixed at construction. `sendAnimationEvent` blocks its
/// caller and exposes a success flag at leave; `sendPapyrusEvent` is
/// fire-and-forget and exposes neither rewrites nor a success flag.
pub struct EventsRegistry {
    hooks: Vec<Arc<Hook>>,
    callbacks: CallbackRegistry,
}

impl EventsRegistry {
    /// Build the registry with its built-in hooks.
    pub fn new(bridge: Arc<dyn ScriptBridge>, executor: Arc<ScriptExecutor>) -> Self {
        let hooks = vec![
            Arc::new(Hook::new(
                SEND_ANIMATION_EVENT,
                "animEventName",
                Some("animationSucceeded"),
                DispatchMode::Blocking,
                Arc::clone(&bridge),
                Arc::clone(&executor),
            )),
            Arc::new(Hook::new(
                SEND_PAPYRUS_EVENT,
                "papyrusEventName",
                None,
                DispatchMode::FireAndForget,
                Arc::clone(&bridge),
                Arc::clone(&executor),
            )),
        ];
        let callbacks = CallbackRegistry::new(bridge, executor);
        Self { hooks, callbacks }
    }

    /// Look a hook up by name.
    pub fn hook(&self, name: &str) -> Option<&Arc<Hook>> {
        self.hooks.iter().find(|h| h.name() == name)
    }

    /// Every hook, in a stable order.
    pub fn hooks(&self) -> &[Arc<Hook>] {
        &self.hooks
    }

    /// The named-event callback registry.
    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    /// Drop all handlers, subscriptions, and in-flight bookkeeping.
    pub fn clear(&self) {
        for hook in &self.hooks {
            hook.clear();
        }
        self.callbacks.clear();
        tracing::info!("Event registry cleared");
    }
}

#[cfg(test)]
mod tests {
    use scripthook_bridge::MemoryBridge;
    use scripthook_core::config::executor::ExecutorConfig;

    use super::*;

    fn registry() -> EventsRegistry {
        let executor =
            Arc::new(ScriptExecutor::spawn(&ExecutorConfig::default()).expect("spawn executor"));
        EventsRegistry::new(Arc::new(MemoryBridge::new()), executor)
    }

    #[test]
    fn test_built_in_hooks_are_present() {
        let registry = registry();
        assert_eq!(registry.hooks().len(), 2);

        let anim = registry.hook(SEND_ANIMATION_EVENT).expect("anim hook");
        assert_eq!(anim.mode(), DispatchMode::Blocking);

        let papyrus = registry.hook(SEND_PAPYRUS_EVENT).expect("papyrus hook");
        assert_eq!(papyrus.mode(), DispatchMode::FireAndForget);

        assert!(registry.hook("noSuchHook").is_none());
    }
}
