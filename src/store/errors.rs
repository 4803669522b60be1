//! Store error types
//!
//! Storage failures are distinguishable from validation failures so
//! callers can tell "retry or check the disk" apart from "fix your
//! input". Each error carries a stable code string, a message and the
//! underlying I/O error when one exists.

use std::fmt;
use std::io;

/// Store-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// The backing file could not be read
    ReadFailed,
    /// The backing file could not be written
    WriteFailed,
}

impl StoreErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorCode::ReadFailed => "REG_STORE_READ_FAILED",
            StoreErrorCode::WriteFailed => "REG_STORE_WRITE_FAILED",
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store error with code, message and I/O source
#[derive(Debug)]
pub struct StoreError {
    code: StoreErrorCode,
    message: String,
    source: Option<io::Error>,
}

impl StoreError {
    /// Create a read-failure error
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StoreErrorCode::ReadFailed,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a write-failure error
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StoreErrorCode::WriteFailed,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
