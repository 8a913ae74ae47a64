//! Engine error taxonomy
//!
//! Five kinds with a machine-readable discriminator. Config errors surface
//! immediately; resource errors abort the call but leave the context
//! consistent; numeric errors are recovered locally with a neutral value
//! and logged once per call; NotFound is normal recovery output carried as
//! `(None, confidence 0)` rather than an Err.

use std::fmt;

/// Machine-readable error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Resource,
    Numeric,
    NotFound,
    Fatal,
}

impl ErrorKind {
    /// Stable discriminator string for logs and callers
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Config => "config",
            ErrorKind::Resource => "resource",
            ErrorKind::Numeric => "numeric",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Fatal => "fatal",
        }
    }
}

/// Engine error: a kind plus a human-readable message
#[derive(Debug, Clone)]
pub struct EngineError {
    kind: ErrorKind,
    message: String,
}

impl EngineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        EngineError {
            kind,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn resource(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Resource, message)
    }

    pub fn numeric(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Numeric, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for EngineError {}

/// Engine-level result alias
pub type EngineResult<T> = Result<T, EngineError>;
