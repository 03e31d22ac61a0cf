// ABOUTME: Error types for declutter including the ErrorCode enum and CleanError struct.
// ABOUTME: Only the parsing and decoding edges are fallible; the cleanup passes never fail.

use std::fmt;

/// Error codes representing the categories of failures around the cleanup core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The markup could not be turned into a document tree.
    Parse,
    /// The input bytes or the requested configuration were unusable.
    Input,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::Parse => "parse error",
            ErrorCode::Input => "input error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for declutter operations.
#[derive(Debug, thiserror::Error)]
pub struct CleanError {
    pub code: ErrorCode,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for CleanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "declutter: {}: {}", self.op, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl CleanError {
    /// Create a Parse error.
    pub fn parse(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self {
            code: ErrorCode::Parse,
            op: op.into(),
            source,
        }
    }

    /// Create an Input error.
    pub fn input(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self {
            code: ErrorCode::Input,
            op: op.into(),
            source,
        }
    }

    /// Returns true if this is a Parse error.
    pub fn is_parse(&self) -> bool {
        self.code == ErrorCode::Parse
    }

    /// Returns true if this is an Input error.
    pub fn is_input(&self) -> bool {
        self.code == ErrorCode::Input
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, CleanError>;
