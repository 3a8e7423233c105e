//! Hook dispatch: pattern matching, handlers, and the enter/leave protocol.

pub mod handler;
pub mod hook;
pub mod pattern;

pub use handler::{Handler, HandlerFilter};
pub use hook::{DispatchMode, Hook};
pub use pattern::Pattern;
