//! CLI-specific error types

use std::fmt;
use std::io;

use crate::registry::RegistryError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// A workflow rejected the operation
    OperationFailed,
    /// The referenced person does not exist
    NotFound,
    /// I/O failure outside the store itself
    IoError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::OperationFailed => "REG_CLI_OPERATION_FAILED",
            Self::NotFound => "REG_CLI_NOT_FOUND",
            Self::IoError => "REG_CLI_IO_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Operation failure
    pub fn operation_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::OperationFailed, msg)
    }

    /// Person not found
    pub fn not_found(id: &str) -> Self {
        Self::new(CliErrorCode::NotFound, format!("no person with id {:?}", id))
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<RegistryError> for CliError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::NotFound(ref id) => Self::not_found(id),
            other => Self::operation_failed(other.to_string()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
