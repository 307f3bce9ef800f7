use crate::codepoint::is_unit_alphabet_member;

/// Maximum length of a unit, in code points.
pub const MAX_UNIT_LEN: usize = 63;

/// Returns `true` if `unit` is a valid unit.
///
/// A valid unit is non-empty, at most [`MAX_UNIT_LEN`] code points long, and consists only of ASCII letters, digits,
/// square brackets, percent signs, forward slashes, and underscores. Brackets don't have to be balanced.
///
/// Units are validated, never rewritten: an invalid unit should be treated as if no unit was given.
pub fn is_valid_unit(unit: &str) -> bool {
    // Every valid code point is a single byte, so any unit over the limit in bytes is either too long or contains an
    // invalid code point.
    !unit.is_empty() && unit.len() <= MAX_UNIT_LEN && unit.chars().all(is_unit_alphabet_member)
}
