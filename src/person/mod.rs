//! Person record type and line codec
//!
//! One person is persisted as exactly one `|`-delimited text line:
//!
//! ```text
//! personID|firstName|lastName|address|birthdate|suspended|demeritData
//! ```
//!
//! The address field legitimately contains four more `|` characters
//! (street-number|street|city|state|country), so decoding cannot simply
//! split on `|`. See [`record`] for the boundary algorithm.

pub mod errors;
pub mod record;

pub use errors::{ParseError, ParseResult};
pub use record::Person;
