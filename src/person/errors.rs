//! Codec error types
//!
//! A line that fails to decode is dropped from the loaded set by the
//! store, so these errors describe which part of the line was malformed
//! rather than carrying recovery hints.

use thiserror::Error;

/// Result type for line decoding
pub type ParseResult<T> = Result<T, ParseError>;

/// Reasons a persisted line cannot be decoded into a [`super::Person`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Fewer than six top-level `|` delimiters in the line
    #[error("line has fewer than six field delimiters")]
    MissingDelimiters,

    /// The right-side delimiters overlap the left-side ones, meaning the
    /// address field cannot contribute its four internal delimiters
    #[error("field boundaries are inconsistent")]
    InconsistentBoundaries,

    /// The suspended field is not the literal `true` or `false`
    #[error("invalid suspended flag: {0:?}")]
    InvalidSuspendedFlag(String),

    /// A demerit entry carries an offense date that is not a valid
    /// DD-MM-YYYY calendar date
    #[error("invalid offense date in demerit data: {0:?}")]
    InvalidOffenseDate(String),

    /// A demerit entry carries a point value that is not an integer
    #[error("invalid point value in demerit data: {0:?}")]
    InvalidPointValue(String),
}
