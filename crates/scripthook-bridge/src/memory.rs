//! HashMap-backed value model.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use scripthook_core::error::AppError;
use scripthook_core::result::AppResult;
use scripthook_core::traits::{NativeFn, ScriptBridge, ScriptValue, ValueKind, ValueRepr};

/// One in-memory script value.
enum MemoryValue {
    Undefined,
    Bool(bool),
    Number(f64),
    Str(String),
    /// Objects and storage containers share the same representation; the
    /// engine only ever calls `clear` on values it created via
    /// [`ScriptBridge::storage`].
    Object(Mutex<HashMap<String, ScriptValue>>),
    Function(NativeFn),
}

impl MemoryValue {
    fn properties(&self) -> Option<MutexGuard<'_, HashMap<String, ScriptValue>>> {
        match self {
            Self::Object(props) => Some(props.lock().unwrap_or_else(|e| e.into_inner())),
            _ => None,
        }
    }
}

impl ValueRepr for MemoryValue {
    fn kind(&self) -> ValueKind {
        match self {
            Self::Undefined => ValueKind::Undefined,
            Self::Bool(_) => ValueKind::Bool,
            Self::Number(_) => ValueKind::Number,
            Self::Str(_) => ValueKind::String,
            Self::Object(_) => ValueKind::Object,
            Self::Function(_) => ValueKind::Function,
        }
    }

    fn get(&self, name: &str) -> ScriptValue {
        self.properties()
            .and_then(|props| props.get(name).cloned())
            .unwrap_or_else(|| ScriptValue::new(Arc::new(MemoryValue::Undefined)))
    }

    fn set(&self, name: &str, value: ScriptValue) {
        if let Some(mut props) = self.properties() {
            props.insert(name.to_string(), value);
        }
    }

    fn call(&self, args: &[ScriptValue]) -> AppResult<ScriptValue> {
        match self {
            Self::Function(f) => f(args),
            other => Err(AppError::script(format!(
                "Value of type {:?} is not callable",
                other.kind()
            ))),
        }
    }

    fn clear(&self) {
        if let Some(mut props) = self.properties() {
            props.clear();
        }
    }

    fn as_str(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Bridge producing [`MemoryValue`]-backed handles.
#[derive(Debug, Clone, Default)]
pub struct MemoryBridge;

impl MemoryBridge {
    /// Create a new in-memory bridge.
    pub fn new() -> Self {
        Self
    }
}

impl ScriptBridge for MemoryBridge {
    fn undefined(&self) -> ScriptValue {
        ScriptValue::new(Arc::new(MemoryValue::Undefined))
    }

    fn bool(&self, value: bool) -> ScriptValue {
        ScriptValue::new(Arc::new(MemoryValue::Bool(value)))
    }

    fn number(&self, value: f64) -> ScriptValue {
        ScriptValue::new(Arc::new(MemoryValue::Number(value)))
    }

    fn string(&self, value: &str) -> ScriptValue {
        ScriptValue::new(Arc::new(MemoryValue::Str(value.to_string())))
    }

    fn object(&self) -> ScriptValue {
        ScriptValue::new(Arc::new(MemoryValue::Object(Mutex::new(HashMap::new()))))
    }

    fn function(&self, f: NativeFn) -> ScriptValue {
        ScriptValue::new(Arc::new(MemoryValue::Function(f)))
    }

    fn storage(&self) -> ScriptValue {
        self.object()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use scripthook_core::error::ErrorKind;

    use super::*;

    #[test]
    fn test_object_properties_shared_across_handles() {
        let bridge = MemoryBridge::new();
        let obj = bridge.object();
        let alias = obj.clone();
        obj.set("name", bridge.string("hit"));
        assert_eq!(alias.get("name").as_str().as_deref(), Some("hit"));
    }

    #[test]
    fn test_missing_property_reads_undefined() {
        let bridge = MemoryBridge::new();
        let obj = bridge.object();
        assert_eq!(obj.get("nope").kind(), ValueKind::Undefined);
    }

    #[test]
    fn test_set_on_non_object_is_ignored() {
        let bridge = MemoryBridge::new();
        let num = bridge.number(3.0);
        num.set("x", bridge.bool(true));
        assert_eq!(num.get("x").kind(), ValueKind::Undefined);
    }

    #[test]
    fn test_function_receives_arguments() {
        let bridge = MemoryBridge::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let f = {
            let calls = Arc::clone(&calls);
            bridge.function(Arc::new(move |args| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(args[1].clone())
            }))
        };
        let arg = bridge.string("echo");
        let out = f.call(&[bridge.undefined(), arg]).expect("call");
        assert_eq!(out.as_str().as_deref(), Some("echo"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_calling_non_function_fails() {
        let bridge = MemoryBridge::new();
        let err = bridge.string("x").call(&[]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Script);
    }

    #[test]
    fn test_storage_clear_empties_container() {
        let bridge = MemoryBridge::new();
        let storage = bridge.storage();
        storage.set("k", bridge.number(1.0));
        storage.clear();
        assert_eq!(storage.get("k").kind(), ValueKind::Undefined);
    }
}
