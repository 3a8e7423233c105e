//! # scripthook-bridge
//!
//! In-memory implementation of the script-value bridge.
//!
//! Objects are shared property maps, functions are native closures, and
//! the storage container is an object whose `clear` empties it. This is
//! the binding used by the host harness and the dispatch tests; a real
//! script engine binding implements the same `scripthook-core` traits.

pub mod memory;

pub use memory::MemoryBridge;
