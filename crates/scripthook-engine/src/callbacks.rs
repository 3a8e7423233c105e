//! Named-event callback broadcast registry.
//!
//! Maps event-category names to ordered lists of persistent and one-shot
//! script callbacks. Categories are a fixed, closed set of
//! producer-driven occurrences; subscribing under any other name fails
//! synchronously. Dispatch snapshots both lists and clears the live
//! one-shot list before invoking anything, so a callback that
//! re-registers itself never fires twice in one pass.
//!
//! Script thread only, like every other place script callables run.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use scripthook_core::error::AppError;
use scripthook_core::result::AppResult;
use scripthook_core::traits::{ScriptBridge, ScriptValue};
use scripthook_executor::ScriptExecutor;

/// The recognized event categories.
pub const EVENT_CATEGORIES: &[&str] = &[
    "tick",
    "update",
    "effectStart",
    "effectFinish",
    "magicEffectApply",
    "equip",
    "unequip",
    "hit",
    "containerChanged",
    "deathStart",
    "deathEnd",
    "loadGame",
    "combatState",
    "reset",
    "scriptInit",
    "trackedStats",
    "uniqueIdChange",
    "switchRaceComplete",
    "cellFullyLoaded",
    "grabRelease",
    "lockChanged",
    "moveAttachDetach",
    "objectLoaded",
    "waitStop",
    "activate",
];

type CallbackMap = HashMap<String, Vec<ScriptValue>>;

/// Ordered persistent and one-shot subscriptions per event category.
pub struct CallbackRegistry {
    bridge: Arc<dyn ScriptBridge>,
    executor: Arc<ScriptExecutor>,
    persistent: Mutex<CallbackMap>,
    one_shot: Mutex<CallbackMap>,
}

impl CallbackRegistry {
    /// Create an empty registry.
    pub fn new(bridge: Arc<dyn ScriptBridge>, executor: Arc<ScriptExecutor>) -> Self {
        Self {
            bridge,
            executor,
            persistent: Mutex::new(HashMap::new()),
            one_shot: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe a persistent callback to an event category.
    pub fn on(&self, event_name: &str, callback: ScriptValue) -> AppResult<()> {
        Self::register(&self.persistent, event_name, callback)
    }

    /// Subscribe a callback that fires at most once.
    pub fn once(&self, event_name: &str, callback: ScriptValue) -> AppResult<()> {
        Self::register(&self.one_shot, event_name, callback)
    }

    /// Fan an event out to its subscribers.
    ///
    /// Persistent callbacks run first, then one-shot callbacks, each in
    /// registration order as of the start of the pass. Individual
    /// callback failures go to the executor error channel and do not
    /// stop the pass. Unrecognized names simply dispatch to nobody: the
    /// category check binds subscription, not production.
    pub fn send_event(&self, event_name: &str, args: &[ScriptValue]) {
        let persistent = lock_map(&self.persistent)
            .get(event_name)
            .cloned()
            .unwrap_or_default();
        // The one-shot list empties before any callback runs, so a
        // re-registration from inside a callback waits for the next pass.
        let one_shot = lock_map(&self.one_shot)
            .remove(event_name)
            .unwrap_or_default();

        tracing::debug!(
            event = %event_name,
            persistent = persistent.len(),
            one_shot = one_shot.len(),
            "Dispatching event"
        );

        let mut call_args = Vec::with_capacity(args.len() + 1);
        call_args.push(self.bridge.undefined());
        call_args.extend_from_slice(args);

        for callback in persistent.iter().chain(one_shot.iter()) {
            if let Err(e) = callback.call(&call_args) {
                self.executor
                    .report(e.while_performing("sendEvent", event_name));
            }
        }
    }

    /// Remove every subscription. Session reset.
    pub fn clear(&self) {
        lock_map(&self.persistent).clear();
        lock_map(&self.one_shot).clear();
    }

    fn register(map: &Mutex<CallbackMap>, event_name: &str, callback: ScriptValue) -> AppResult<()> {
        if !EVENT_CATEGORIES.contains(&event_name) {
            return Err(AppError::unknown_event(format!(
                "Unrecognized event name '{event_name}'"
            )));
        }
        if !callback.is_callable() {
            return Err(AppError::validation(format!(
                "Callback for '{event_name}' is not callable"
            )));
        }
        lock_map(map)
            .entry(event_name.to_string())
            .or_default()
            .push(callback);
        tracing::debug!(event = %event_name, "Callback registered");
        Ok(())
    }
}

fn lock_map(map: &Mutex<CallbackMap>) -> MutexGuard<'_, CallbackMap> {
    map.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use scripthook_bridge::MemoryBridge;
    use scripthook_core::config::executor::ExecutorConfig;
    use scripthook_core::error::ErrorKind;

    use super::*;

    struct Fixture {
        bridge: MemoryBridge,
        executor: Arc<ScriptExecutor>,
        registry: CallbackRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            let bridge = MemoryBridge::new();
            let executor = Arc::new(
                ScriptExecutor::spawn(&ExecutorConfig::default()).expect("spawn executor"),
            );
            let registry = CallbackRegistry::new(
                Arc::new(bridge.clone()),
                Arc::clone(&executor),
            );
            Self {
                bridge,
                executor,
                registry,
            }
        }

        fn counting_callback(&self, counter: &Arc<AtomicUsize>) -> ScriptValue {
            let bridge = self.bridge.clone();
            let counter = Arc::clone(counter);
            self.bridge.function(Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(bridge.undefined())
            }))
        }
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let fx = Fixture::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let err = fx
            .registry
            .on("no-such-event", fx.counting_callback(&counter))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownEvent);
    }

    #[test]
    fn test_non_callable_callback_is_rejected() {
        let fx = Fixture::new();
        let err = fx.registry.on("tick", fx.bridge.string("nope")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_persistent_callbacks_fire_every_pass() {
        let fx = Fixture::new();
        let counter = Arc::new(AtomicUsize::new(0));
        fx.registry
            .on("tick", fx.counting_callback(&counter))
            .expect("on");
        fx.registry.send_event("tick", &[]);
        fx.registry.send_event("tick", &[]);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_once_fires_exactly_once() {
        let fx = Fixture::new();
        let counter = Arc::new(AtomicUsize::new(0));
        fx.registry
            .once("tick", fx.counting_callback(&counter))
            .expect("once");
        fx.registry.send_event("tick", &[]);
        fx.registry.send_event("tick", &[]);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_once_reregistration_waits_for_the_next_pass() {
        let fx = Fixture::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let registry = Arc::new(fx.registry);
        let chained = {
            let bridge = fx.bridge.clone();
            let registry = Arc::clone(&registry);
            let counter = Arc::clone(&counter);
            fx.bridge.function(Arc::new(move |_| {
                let inner_bridge = bridge.clone();
                let inner_counter = Arc::clone(&counter);
                registry.once(
                    "tick",
                    bridge.function(Arc::new(move |_| {
                        inner_counter.fetch_add(1, Ordering::SeqCst);
                        Ok(inner_bridge.undefined())
                    })),
                )?;
                Ok(bridge.undefined())
            }))
        };
        registry.once("tick", chained).expect("once");

        registry.send_event("tick", &[]);
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        registry.send_event("tick", &[]);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callbacks_receive_event_arguments() {
        let fx = Fixture::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let callback = {
            let bridge = fx.bridge.clone();
            let seen = Arc::clone(&seen);
            fx.bridge.function(Arc::new(move |args| {
                seen.lock().unwrap().push(args[1].as_f64());
                Ok(bridge.undefined())
            }))
        };
        fx.registry.on("hit", callback).expect("on");
        fx.registry.send_event("hit", &[fx.bridge.number(7.0)]);
        assert_eq!(*seen.lock().unwrap(), [Some(7.0)]);
    }

    #[test]
    fn test_failing_callback_routes_error_and_pass_continues() {
        let fx = Fixture::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let failing = fx
            .bridge
            .function(Arc::new(|_| Err(AppError::script("callback exploded"))));
        fx.registry.on("tick", failing).expect("on");
        fx.registry
            .on("tick", fx.counting_callback(&counter))
            .expect("on");

        fx.registry.send_event("tick", &[]);
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        fx.executor.flush();
        let errors = fx.executor.drain_errors();
        assert_eq!(errors.len(), 1);
        assert!(
            errors[0]
                .message
                .ends_with("(while performing sendEvent on 'tick')")
        );
    }

    #[test]
    fn test_unknown_name_dispatches_to_nobody() {
        let fx = Fixture::new();
        fx.registry.send_event("no-such-event", &[]);
        fx.executor.flush();
        assert!(fx.executor.drain_errors().is_empty());
    }

    #[test]
    fn test_clear_removes_all_subscriptions() {
        let fx = Fixture::new();
        let counter = Arc::new(AtomicUsize::new(0));
        fx.registry
            .on("tick", fx.counting_callback(&counter))
            .expect("on");
        fx.registry
            .once("tick", fx.counting_callback(&counter))
            .expect("once");
        fx.registry.clear();
        fx.registry.send_event("tick", &[]);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
