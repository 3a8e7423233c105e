//! # scripthook-core
//!
//! Core crate for ScriptHook. Contains the abstract script-value bridge,
//! configuration schemas, caller identity, and the unified error system.
//!
//! This crate has **no** internal dependencies on other ScriptHook crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
