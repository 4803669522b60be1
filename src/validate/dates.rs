//! Strict DD-MM-YYYY date parsing and whole-year age computation

use chrono::{Datelike, NaiveDate};

/// The single fixed date format used for birthdates and offense dates.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Parses a date in strict DD-MM-YYYY form.
///
/// The shape is checked before handing off to chrono because `%d`/`%m`
/// would also accept one-digit components; the fixed format requires
/// exactly two-two-four digits with `-` separators. Calendar validity is
/// strict: day 32 or month 13 is rejected, never rolled over.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[2] != b'-' || bytes[5] != b'-' {
        return None;
    }
    let digit_positions = [0, 1, 3, 4, 6, 7, 8, 9];
    if !digit_positions.iter().all(|&i| bytes[i].is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Returns true when the string is a real calendar date in DD-MM-YYYY.
pub fn is_valid_date(s: &str) -> bool {
    parse_date(s).is_some()
}

/// Whole completed years between `birth` and `reference`.
///
/// Year difference, decremented by one when the reference month/day
/// precedes the birth month/day within the year. Negative when the
/// reference date predates the birth date.
pub fn age_in_years(birth: NaiveDate, reference: NaiveDate) -> i32 {
    let mut age = reference.year() - birth.year();
    if (reference.month(), reference.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}
