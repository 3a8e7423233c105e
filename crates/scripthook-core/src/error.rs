//! Unified application error types for ScriptHook.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Errors that cross the native/script
//! boundary are never thrown at the native caller; the hook engine routes
//! them to the executor's asynchronous error channel instead.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A wildcard pattern string was malformed at registration time.
    PatternSyntax,
    /// A subscription used an event name outside the recognized set.
    UnknownEvent,
    /// Enter/Leave protocol violation (double enter, leave without enter).
    Reentrancy,
    /// A script-side callable failed or a value was used the wrong way.
    Script,
    /// The script-thread executor is unavailable or dropped a task.
    Executor,
    /// Input validation failed.
    Validation,
    /// A configuration error occurred.
    Configuration,
    /// An internal engine error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PatternSyntax => write!(f, "PATTERN_SYNTAX"),
            Self::UnknownEvent => write!(f, "UNKNOWN_EVENT"),
            Self::Reentrancy => write!(f, "REENTRANCY"),
            Self::Script => write!(f, "SCRIPT"),
            Self::Executor => write!(f, "EXECUTOR"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout ScriptHook.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire engine boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a pattern-syntax error.
    pub fn pattern_syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PatternSyntax, message)
    }

    /// Create an unknown-event error.
    pub fn unknown_event(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownEvent, message)
    }

    /// Create a reentrancy error.
    pub fn reentrancy(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Reentrancy, message)
    }

    /// Create a script error.
    pub fn script(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Script, message)
    }

    /// Create an executor error.
    pub fn executor(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Executor, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Annotate this error with the hook and operation it was raised in.
    ///
    /// Used when redirecting a failure to the asynchronous error channel so
    /// the report still identifies the offending call site, e.g.
    /// `"REENTRANCY: ... (while performing enter on 'sendAnimationEvent')"`.
    pub fn while_performing(self, operation: &str, hook_name: &str) -> Self {
        Self {
            kind: self.kind,
            message: format!(
                "{} (while performing {} on '{}')",
                self.message, operation, hook_name
            ),
            source: self.source,
        }
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Internal,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
