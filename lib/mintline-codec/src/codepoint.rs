//! Code point classification.
//!
//! Every normalizer in this crate is a single forward pass that asks one or more of these predicates about each code
//! point it visits. All of them are constant-time.

/// Returns `true` if `c` is an ASCII letter, in either case.
#[inline]
pub const fn is_ascii_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Returns `true` if `c` is an ASCII digit.
#[inline]
pub const fn is_ascii_digit(c: char) -> bool {
    c.is_ascii_digit()
}

#[inline]
pub const fn is_underscore(c: char) -> bool {
    c == '_'
}

#[inline]
pub const fn is_hyphen(c: char) -> bool {
    c == '-'
}

#[inline]
pub const fn is_colon(c: char) -> bool {
    c == ':'
}

#[inline]
pub const fn is_dot(c: char) -> bool {
    c == '.'
}

/// Returns `true` if `c` may not appear in a dimension value, even escaped.
///
/// This covers the Unicode control characters (general category `Cc`), which includes line breaks that would
/// otherwise split a line in two.
#[inline]
pub fn is_control_or_disallowed(c: char) -> bool {
    c.is_control()
}

/// Returns `true` if `c` has to be preceded by a backslash when written as part of a dimension value.
#[inline]
pub const fn needs_escaping(c: char) -> bool {
    matches!(c, ' ' | ',' | '=' | '\\' | '"')
}

/// Returns `true` if `c` is allowed in a unit.
#[inline]
pub const fn is_unit_alphabet_member(c: char) -> bool {
    is_ascii_letter(c) || is_ascii_digit(c) || matches!(c, '[' | ']' | '%' | '/' | '_')
}

/// Returns `true` if `c` may start the first section of a key.
#[inline]
pub(crate) const fn is_valid_leading_char(c: char) -> bool {
    is_ascii_letter(c) || is_underscore(c)
}

/// Returns `true` if `c` may start a metric key section other than the first.
#[inline]
pub(crate) const fn is_valid_inner_leading_char(c: char) -> bool {
    is_valid_leading_char(c) || is_ascii_digit(c)
}

/// Returns `true` if `c` may appear anywhere past the leading position of a metric key section.
#[inline]
pub(crate) const fn is_valid_metric_key_char(c: char) -> bool {
    is_ascii_letter(c) || is_ascii_digit(c) || is_underscore(c) || is_hyphen(c)
}

/// Returns `true` if `c` may appear anywhere past the leading position of a dimension key section.
#[inline]
pub(crate) const fn is_valid_dimension_key_char(c: char) -> bool {
    is_valid_metric_key_char(c) || is_colon(c)
}
