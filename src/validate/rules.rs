//! Identifier and address format rules

/// The state every stored address must carry in its fourth sub-field.
pub const REQUIRED_STATE: &str = "Victoria";

/// Checks the person-identifier format.
///
/// An identifier is valid when:
/// - it is exactly 10 characters long
/// - characters 0-1 are each an ASCII digit in `'2'..='9'`
/// - characters 8-9 are each an uppercase ASCII letter
/// - at least two of the middle six characters (2-7) are special, where
///   special means not alphanumeric
pub fn is_valid_person_id(id: &str) -> bool {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() != 10 {
        return false;
    }
    if !chars[..2].iter().all(|c| ('2'..='9').contains(c)) {
        return false;
    }
    if !chars[8..].iter().all(|c| c.is_ascii_uppercase()) {
        return false;
    }
    let special_count = chars[2..8].iter().filter(|c| !c.is_alphanumeric()).count();
    special_count >= 2
}

/// Checks the address format.
///
/// Splitting on `|` must yield exactly five parts and the fourth part
/// must equal [`REQUIRED_STATE`]. Empty sub-parts are allowed as long as
/// the count and the state constraint hold.
pub fn is_valid_address(address: &str) -> bool {
    let parts: Vec<&str> = address.split('|').collect();
    parts.len() == 5 && parts[3] == REQUIRED_STATE
}
