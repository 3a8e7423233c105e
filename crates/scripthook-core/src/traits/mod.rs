//! Capability traits the engine depends on.
//!
//! Implementations live in sibling crates; the engine itself only ever
//! sees these interfaces.

pub mod script;

pub use script::{NativeFn, ScriptBridge, ScriptValue, ValueKind, ValueRepr};
