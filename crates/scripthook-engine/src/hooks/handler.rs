//! Handlers: a registration-time filter bound to an enter/leave callback
//! pair, plus the per-caller scratch state one invocation lives in.

use std::collections::HashMap;

use scripthook_core::error::AppError;
use scripthook_core::result::AppResult;
use scripthook_core::traits::{ScriptBridge, ScriptValue};
use scripthook_core::types::CallerId;

/// Immutable filter deciding which invocations a handler reacts to.
#[derive(Debug, Clone, Default)]
pub struct HandlerFilter {
    /// Inclusive lower bound on the subject id.
    pub min_id: Option<u32>,
    /// Inclusive upper bound on the subject id.
    pub max_id: Option<u32>,
    /// Event-name pattern; `None` matches every name.
    pub pattern: Option<super::Pattern>,
}

impl HandlerFilter {
    /// Evaluate the filter: min bound, max bound, then pattern, with
    /// short-circuit on the first failing check.
    pub fn matches(&self, id: u32, event_name: &str) -> bool {
        if self.min_id.is_some_and(|min| id < min) {
            return false;
        }
        if self.max_id.is_some_and(|max| id > max) {
            return false;
        }
        match &self.pattern {
            Some(pattern) => pattern.matches(event_name),
            None => true,
        }
    }
}

/// Scratch state for one caller's enter/leave pair on one handler.
///
/// Created lazily at enter and removed by the matching leave; the
/// storage container is cleared on every enter (never on leave) so a
/// handler can stash data in enter and read it back in leave.
#[derive(Debug)]
pub(crate) struct Invocation {
    /// Context object handed to the callbacks.
    pub context: ScriptValue,
    /// Associative container attached to the context as `"storage"`.
    pub storage: ScriptValue,
    /// Whether the filter matched at enter; leave skips non-matches.
    pub matched: bool,
}

impl Invocation {
    fn new(bridge: &dyn ScriptBridge) -> Self {
        Self {
            context: bridge.undefined(),
            storage: bridge.undefined(),
            matched: false,
        }
    }

    /// Idempotently create the context object and its storage container.
    pub fn prepare(&mut self, bridge: &dyn ScriptBridge) {
        if !self.context.is_object() {
            self.context = bridge.object();
        }
        if !self.storage.is_object() {
            self.storage = bridge.storage();
            self.context.set("storage", self.storage.clone());
        }
    }
}

/// A filter plus an enter/leave callback pair attached to a hook.
///
/// The callback pair and filter are shared state; the invocation map is
/// script-thread only.
#[derive(Debug)]
pub struct Handler {
    enter: ScriptValue,
    leave: ScriptValue,
    filter: HandlerFilter,
    invocations: HashMap<CallerId, Invocation>,
}

impl Handler {
    /// Build a handler from a script object exposing callable `enter` and
    /// `leave` members.
    pub fn new(handler_object: &ScriptValue, filter: HandlerFilter) -> AppResult<Self> {
        let enter = handler_object.get("enter");
        let leave = handler_object.get("leave");
        if !enter.is_callable() {
            return Err(AppError::validation(
                "Handler object must expose a callable 'enter' member",
            ));
        }
        if !leave.is_callable() {
            return Err(AppError::validation(
                "Handler object must expose a callable 'leave' member",
            ));
        }
        Ok(Self {
            enter,
            leave,
            filter,
            invocations: HashMap::new(),
        })
    }

    /// The registration-time filter.
    pub fn filter(&self) -> &HandlerFilter {
        &self.filter
    }

    /// The enter callback.
    pub(crate) fn enter_callback(&self) -> &ScriptValue {
        &self.enter
    }

    /// The leave callback.
    pub(crate) fn leave_callback(&self) -> &ScriptValue {
        &self.leave
    }

    /// Get or lazily create the caller's invocation scratch.
    pub(crate) fn invocation_entry(
        &mut self,
        bridge: &dyn ScriptBridge,
        caller: CallerId,
    ) -> &mut Invocation {
        self.invocations
            .entry(caller)
            .or_insert_with(|| Invocation::new(bridge))
    }

    /// Remove and return the caller's invocation scratch.
    pub(crate) fn take_invocation(&mut self, caller: CallerId) -> Option<Invocation> {
        self.invocations.remove(&caller)
    }

    /// Whether the caller currently has invocation scratch.
    #[cfg(test)]
    pub(crate) fn has_invocation(&self, caller: CallerId) -> bool {
        self.invocations.contains_key(&caller)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use scripthook_bridge::MemoryBridge;
    use scripthook_core::error::ErrorKind;

    use super::super::Pattern;
    use super::*;

    fn bounded_filter() -> HandlerFilter {
        HandlerFilter {
            min_id: Some(5),
            max_id: Some(10),
            pattern: None,
        }
    }

    #[test]
    fn test_filter_bounds_are_inclusive() {
        let filter = bounded_filter();
        assert!(!filter.matches(4, "any"));
        assert!(filter.matches(5, "any"));
        assert!(filter.matches(10, "any"));
        assert!(!filter.matches(11, "any"));
    }

    #[test]
    fn test_filter_in_bounds_depends_only_on_pattern() {
        let filter = HandlerFilter {
            pattern: Some(Pattern::parse("hit*").unwrap()),
            ..bounded_filter()
        };
        assert!(filter.matches(5, "hitStart"));
        assert!(!filter.matches(5, "blocked"));
        assert!(filter.matches(10, "hitStart"));
        assert!(!filter.matches(10, "blocked"));
    }

    #[test]
    fn test_empty_filter_matches_unconditionally() {
        let filter = HandlerFilter::default();
        assert!(filter.matches(0, ""));
        assert!(filter.matches(u32::MAX, "whatever"));
    }

    #[test]
    fn test_handler_requires_callable_members() {
        let bridge = MemoryBridge::new();
        let object = bridge.object();
        let err = Handler::new(&object, HandlerFilter::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let inner = bridge.clone();
        let noop = bridge.function(Arc::new(move |_| Ok(inner.undefined())));
        object.set("enter", noop);
        let err = Handler::new(&object, HandlerFilter::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_invocation_prepare_is_idempotent() {
        let bridge = MemoryBridge::new();
        let mut invocation = Invocation::new(&bridge);
        invocation.prepare(&bridge);
        let context = invocation.context.clone();
        let storage = invocation.storage.clone();
        storage.set("k", bridge.number(1.0));

        invocation.prepare(&bridge);
        assert!(invocation.context.is_object());
        // Same storage object survives a second prepare untouched.
        assert_eq!(
            context.get("storage").get("k").as_f64(),
            Some(1.0)
        );
    }
}
