//! Pure validation predicates for person records
//!
//! All checks here are deterministic functions over their inputs with no
//! I/O and no mutation. The registry workflows call them on supplied
//! field values before touching the store; the codec reuses the date
//! parser for offense dates.

mod dates;
mod rules;

pub use dates::{age_in_years, is_valid_date, parse_date, DATE_FORMAT};
pub use rules::{is_valid_address, is_valid_person_id, REQUIRED_STATE};
