//! Registry error types
//!
//! Validation, not-found and conflict outcomes are expected conditions
//! that callers recover from; only `Store` wraps a failure of the
//! backing medium where retry or operator intervention applies.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for registry workflows
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry workflow errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A supplied field fails its format or range rule
    #[error("invalid {field}: {value:?}")]
    InvalidField {
        /// Which field failed
        field: &'static str,
        /// The rejected value
        value: String,
    },

    /// No record carries the referenced identifier
    #[error("no person with id {0:?}")]
    NotFound(String),

    /// A record with this identifier already exists
    #[error("person id {0:?} already exists")]
    DuplicateId(String),

    /// A policy gate blocked the update
    #[error("update rejected: {0}")]
    PolicyViolation(&'static str),

    /// The backing store could not be read or written
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// Convenience constructor for field-validation failures.
    pub fn invalid_field(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            value: value.into(),
        }
    }
}
