//! Abstract script-value bridge.
//!
//! The hook engine passes data to and from script handlers through an
//! opaque value model so that all script-engine-specific marshaling stays
//! behind this boundary. A concrete engine binding (or the in-memory
//! bridge used for tests and the host harness) implements [`ValueRepr`]
//! and [`ScriptBridge`].
//!
//! Values are handles: cloning a [`ScriptValue`] clones the handle, not
//! the underlying object, so property writes through one handle are
//! visible through every other handle to the same object.

use std::fmt;
use std::sync::Arc;

use crate::error::AppError;
use crate::result::AppResult;

/// Type tag distinguishing the value categories the engine cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// No value.
    Undefined,
    /// A boolean.
    Bool,
    /// A double-precision number.
    Number,
    /// A string.
    String,
    /// An object with named properties (including associative containers).
    Object,
    /// A callable.
    Function,
}

/// A native closure exposed to script code as a callable value.
///
/// By convention the first argument is the receiver (`undefined` for free
/// function calls), matching how the engine invokes handler callbacks.
pub type NativeFn = Arc<dyn Fn(&[ScriptValue]) -> AppResult<ScriptValue> + Send + Sync>;

/// Object-safe representation of one script value.
///
/// Non-object values answer property reads with `undefined` and ignore
/// property writes; non-callable values fail `call` with a script error.
pub trait ValueRepr: Send + Sync {
    /// Return the type tag of this value.
    fn kind(&self) -> ValueKind;

    /// Read a named property (objects only).
    fn get(&self, name: &str) -> ScriptValue;

    /// Write a named property (objects only).
    fn set(&self, name: &str, value: ScriptValue);

    /// Invoke this value as a callable.
    fn call(&self, args: &[ScriptValue]) -> AppResult<ScriptValue>;

    /// Remove every entry from this associative container (containers only).
    fn clear(&self);

    /// The string payload, if this is a string value.
    fn as_str(&self) -> Option<String>;

    /// The numeric payload, if this is a number value.
    fn as_f64(&self) -> Option<f64>;

    /// The boolean payload, if this is a bool value.
    fn as_bool(&self) -> Option<bool>;
}

/// Cloneable handle to a script value.
#[derive(Clone)]
pub struct ScriptValue(Arc<dyn ValueRepr>);

impl ScriptValue {
    /// Wrap a concrete representation in a handle.
    pub fn new(repr: Arc<dyn ValueRepr>) -> Self {
        Self(repr)
    }

    /// Return the type tag of this value.
    pub fn kind(&self) -> ValueKind {
        self.0.kind()
    }

    /// Read a named property.
    pub fn get(&self, name: &str) -> ScriptValue {
        self.0.get(name)
    }

    /// Write a named property.
    pub fn set(&self, name: &str, value: ScriptValue) {
        self.0.set(name, value);
    }

    /// Invoke this value as a callable.
    pub fn call(&self, args: &[ScriptValue]) -> AppResult<ScriptValue> {
        self.0.call(args)
    }

    /// Remove every entry from this associative container.
    pub fn clear(&self) {
        self.0.clear();
    }

    /// The string payload, if any.
    pub fn as_str(&self) -> Option<String> {
        self.0.as_str()
    }

    /// The numeric payload, if any.
    pub fn as_f64(&self) -> Option<f64> {
        self.0.as_f64()
    }

    /// The boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        self.0.as_bool()
    }

    /// Whether this value is an object.
    pub fn is_object(&self) -> bool {
        self.kind() == ValueKind::Object
    }

    /// Whether this value is callable.
    pub fn is_callable(&self) -> bool {
        self.kind() == ValueKind::Function
    }

    /// The string payload, or a script error naming the property.
    pub fn expect_str(&self, what: &str) -> AppResult<String> {
        self.as_str()
            .ok_or_else(|| AppError::script(format!("'{what}' is not a string")))
    }
}

impl fmt::Debug for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptValue({:?})", self.kind())
    }
}

/// Factory for script values.
///
/// One bridge instance represents one script engine; every value the
/// engine creates for handler contexts and storage goes through it.
pub trait ScriptBridge: Send + Sync {
    /// The `undefined` value.
    fn undefined(&self) -> ScriptValue;

    /// A boolean value.
    fn bool(&self, value: bool) -> ScriptValue;

    /// A number value.
    fn number(&self, value: f64) -> ScriptValue;

    /// A string value.
    fn string(&self, value: &str) -> ScriptValue;

    /// A fresh empty object.
    fn object(&self) -> ScriptValue;

    /// A callable wrapping a native closure.
    fn function(&self, f: NativeFn) -> ScriptValue;

    /// A fresh associative container usable as handler scratch storage.
    fn storage(&self) -> ScriptValue;
}
