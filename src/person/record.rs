//! Person record and the line codec
//!
//! Line layout:
//!
//! ```text
//! +-----------+-----------+----------+-------------------+-----------+-----------+-------------+
//! | personID  | firstName | lastName | address (5 parts) | birthdate | suspended | demeritData |
//! +-----------+-----------+----------+-------------------+-----------+-----------+-------------+
//! ```
//!
//! `address` always contributes exactly four internal `|` characters, so a
//! well-formed line has at least ten `|`s total. Decoding locates the first
//! three delimiters from the left (id / firstName / lastName) and the last
//! three from the right (suspended-birthdate boundary, then demeritData);
//! the remainder between them is the address.
//!
//! `demeritData` is a sequence of `DD-MM-YYYY:points` pairs joined by `;`,
//! with a trailing `;` allowed. Map enumeration order is unspecified, so
//! round-trip equality must be judged by the date-to-points mapping, not by
//! literal string identity of the demerit field.
//!
//! There is no escaping: a free-text field containing `|`, `:` or `;`
//! corrupts parsing. This is a known format limitation.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::validate::{parse_date, DATE_FORMAT};

use super::errors::{ParseError, ParseResult};

/// One managed person's identity, contact and demerit-history data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    /// Externally supplied identifier, unique across the store
    pub id: String,
    /// Given name, free text
    pub first_name: String,
    /// Family name, free text
    pub last_name: String,
    /// Five `|`-delimited sub-fields: number|street|city|state|country
    pub address: String,
    /// Birth date in DD-MM-YYYY
    pub birthdate: String,
    /// Set by the demerit workflow when the windowed point total exceeds
    /// the age-appropriate threshold; never cleared in scope
    pub suspended: bool,
    /// Offense date to points accrued on that date. Inserting a second
    /// entry for an existing date overwrites the prior value.
    pub demerit_points: HashMap<NaiveDate, u32>,
}

impl Person {
    /// Create a new person with no demerit history and no suspension.
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        address: impl Into<String>,
        birthdate: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            address: address.into(),
            birthdate: birthdate.into(),
            suspended: false,
            demerit_points: HashMap::new(),
        }
    }

    /// Encode this person as one storage line (without trailing newline).
    ///
    /// Demerit entries are emitted in map iteration order, each followed
    /// by `;`.
    pub fn encode_line(&self) -> String {
        let mut demerit_data = String::new();
        for (date, points) in &self.demerit_points {
            demerit_data.push_str(&date.format(DATE_FORMAT).to_string());
            demerit_data.push(':');
            demerit_data.push_str(&points.to_string());
            demerit_data.push(';');
        }

        format!(
            "{}|{}|{}|{}|{}|{}|{}",
            self.id,
            self.first_name,
            self.last_name,
            self.address,
            self.birthdate,
            self.suspended,
            demerit_data
        )
    }

    /// Decode one storage line into a person.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the line has fewer than six `|` delimiters,
    /// if the left/right delimiter boundaries overlap, if the suspended
    /// field is not `true`/`false`, or if a present demerit entry carries
    /// an invalid date or a non-integer point value. Blank demerit entries
    /// and entries without a `:` separator are skipped, not fatal.
    pub fn decode_line(line: &str) -> ParseResult<Self> {
        // First three delimiters from the left.
        let idx1 = line.find('|').ok_or(ParseError::MissingDelimiters)?;
        let idx2 = line[idx1 + 1..]
            .find('|')
            .map(|i| idx1 + 1 + i)
            .ok_or(ParseError::MissingDelimiters)?;
        let idx3 = line[idx2 + 1..]
            .find('|')
            .map(|i| idx2 + 1 + i)
            .ok_or(ParseError::MissingDelimiters)?;

        // Last three delimiters from the right. Each must sit strictly
        // after the third left-side delimiter, otherwise the line cannot
        // hold a five-part address between them.
        let last1 = line.rfind('|').ok_or(ParseError::MissingDelimiters)?;
        let last2 = line[..last1]
            .rfind('|')
            .ok_or(ParseError::MissingDelimiters)?;
        let last3 = line[..last2]
            .rfind('|')
            .ok_or(ParseError::MissingDelimiters)?;
        if last3 <= idx3 {
            return Err(ParseError::InconsistentBoundaries);
        }

        let id = &line[..idx1];
        let first_name = &line[idx1 + 1..idx2];
        let last_name = &line[idx2 + 1..idx3];
        let address = &line[idx3 + 1..last3];
        let birthdate = &line[last3 + 1..last2];
        let suspended = match &line[last2 + 1..last1] {
            "true" => true,
            "false" => false,
            other => return Err(ParseError::InvalidSuspendedFlag(other.to_string())),
        };
        let demerit_data = &line[last1 + 1..];

        let mut demerit_points = HashMap::new();
        for entry in demerit_data.split(';') {
            if entry.trim().is_empty() {
                continue;
            }
            let Some((date_str, points_str)) = entry.split_once(':') else {
                continue;
            };
            let date = parse_date(date_str)
                .ok_or_else(|| ParseError::InvalidOffenseDate(date_str.to_string()))?;
            let points: u32 = points_str
                .parse()
                .map_err(|_| ParseError::InvalidPointValue(points_str.to_string()))?;
            demerit_points.insert(date, points);
        }

        Ok(Self {
            id: id.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            address: address.to_string(),
            birthdate: birthdate.to_string(),
            suspended,
            demerit_points,
        })
    }
}
