use std::borrow::Cow;

use tracing::debug;

use crate::codepoint::needs_escaping;
use crate::normalize::{truncate_chars, MAX_DIMENSION_VALUE_LEN};

/// Returns `true` if the given dimension value contains at least one character that must be escaped.
///
/// The characters that must be escaped are space, comma, equals sign, backslash, and double quote.
pub fn need_to_escape_dimension_value(value: &str) -> bool {
    value.chars().any(needs_escaping)
}

/// Escapes a dimension value for use in a metric line.
///
/// Each escapable character is prefixed with a backslash. The escaped value is capped at [`MAX_DIMENSION_VALUE_LEN`]
/// code points. Whenever that cap cuts through an escape sequence, the dangling backslash is removed as well, so the
/// result never ends in an unterminated escape.
///
/// The cap applies to every input, including one with nothing to escape: a value is returned unchanged only if
/// [`need_to_escape_dimension_value`] is `false` for it and it is at most [`MAX_DIMENSION_VALUE_LEN`] code points long.
/// Normalized values always fit.
///
/// The input is expected to already be normalized (see
/// [`normalize_dimension_value`][crate::normalize_dimension_value]). An absent value stays absent: escape it with
/// `value.map(escape_dimension_value)`.
pub fn escape_dimension_value(value: &str) -> Cow<'_, str> {
    if !need_to_escape_dimension_value(value) {
        return Cow::Borrowed(truncate_chars(value, MAX_DIMENSION_VALUE_LEN));
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    let mut len = 0;
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if needs_escaping(c) {
            escaped.push('\\');
            len += 1;
        }
        escaped.push(c);
        len += 1;

        if len >= MAX_DIMENSION_VALUE_LEN {
            if len > MAX_DIMENSION_VALUE_LEN || !chars.as_str().is_empty() {
                debug!(
                    max_len = MAX_DIMENSION_VALUE_LEN,
                    "Escaped dimension value exceeds maximum length. Truncating."
                );
            }
            break;
        }
    }

    if len > MAX_DIMENSION_VALUE_LEN {
        let truncated_len = truncate_chars(&escaped, MAX_DIMENSION_VALUE_LEN).len();
        escaped.truncate(truncated_len);

        // A trailing run of backslashes with odd length means the last escape sequence was cut in half.
        let trailing_backslashes = escaped.chars().rev().take_while(|c| *c == '\\').count();
        if trailing_backslashes % 2 == 1 {
            escaped.pop();
        }
    }

    Cow::Owned(escaped)
}
