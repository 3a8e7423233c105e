//! Shared engine types.

pub mod caller;

pub use caller::CallerId;
