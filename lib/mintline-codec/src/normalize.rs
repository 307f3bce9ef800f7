//! Normalization of metric keys, dimension keys, and dimension values.
//!
//! All three normalizers work on Unicode code points, make a single left-to-right pass over their input, and replace
//! every maximal run of disallowed code points with a single underscore. Lengths are bounded in code points, never in
//! bytes.
use std::borrow::Cow;

use tracing::debug;

use crate::codepoint::{
    is_control_or_disallowed, is_valid_dimension_key_char, is_valid_inner_leading_char, is_valid_leading_char,
    is_valid_metric_key_char,
};

/// Maximum length of a normalized metric key, in code points.
pub const MAX_METRIC_KEY_LEN: usize = 250;

/// Maximum length of a normalized dimension key, in code points.
pub const MAX_DIMENSION_KEY_LEN: usize = 100;

/// Maximum length of a normalized dimension value, in code points.
pub const MAX_DIMENSION_VALUE_LEN: usize = 250;

const QUOTED_EMPTY_VALUE: &str = "\"\"";

/// Which characters may start each section of a key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum LeadingRule {
    /// The first section must start with a letter or underscore, later sections may also start with a digit.
    DigitsAfterFirst,

    /// Every section must start with a letter or underscore.
    EverySection,
}

impl LeadingRule {
    fn for_section(self, index: usize) -> fn(char) -> bool {
        match (self, index) {
            (Self::DigitsAfterFirst, 0) | (Self::EverySection, _) => is_valid_leading_char,
            (Self::DigitsAfterFirst, _) => is_valid_inner_leading_char,
        }
    }
}

/// Rules for one kind of dot-sectioned key.
struct KeyRules {
    max_len: usize,
    leading: LeadingRule,
    is_valid_char: fn(char) -> bool,
    lowercase: bool,
}

const METRIC_KEY_RULES: KeyRules = KeyRules {
    max_len: MAX_METRIC_KEY_LEN,
    leading: LeadingRule::DigitsAfterFirst,
    is_valid_char: is_valid_metric_key_char,
    lowercase: false,
};

const DIMENSION_KEY_RULES: KeyRules = KeyRules {
    max_len: MAX_DIMENSION_KEY_LEN,
    leading: LeadingRule::EverySection,
    is_valid_char: is_valid_dimension_key_char,
    lowercase: true,
};

/// Normalizes a metric key.
///
/// The key keeps its case. Within each dot-separated section, every run of characters other than ASCII letters,
/// digits, underscores, and hyphens becomes a single underscore. The first section must start with a letter or an
/// underscore, and any later section with a letter, a digit, or an underscore: a leading run of other characters is
/// replaced by a single underscore. Empty sections are removed, so consecutive dots collapse and a trailing dot is dropped. The result is capped at
/// [`MAX_METRIC_KEY_LEN`] code points.
///
/// Returns `None` if no valid key can be produced, which is the case for empty input and for input starting with a
/// dot. A metric whose key normalizes to `None` must not be sent.
pub fn normalize_metric_key(key: &str) -> Option<String> {
    if key.is_empty() || key.starts_with('.') {
        debug!(key, "Metric key is empty or starts with a dot. Discarding.");
        return None;
    }

    let normalized = normalize_key(key, &METRIC_KEY_RULES);
    if normalized.is_empty() {
        debug!(key, "Metric key normalized to an empty string. Discarding.");
        return None;
    }

    Some(normalized)
}

/// Normalizes a dimension key.
///
/// Follows the same rules as [`normalize_metric_key`], with the following differences: colons are also valid, every
/// section (not only the first) must start with a letter or underscore, ASCII letters are lower-cased, leading dots
/// are dropped, and the result is capped at [`MAX_DIMENSION_KEY_LEN`] code points.
///
/// This never fails: invalid input normalizes to an empty string, and callers are expected to drop dimensions with an
/// empty key.
pub fn normalize_dimension_key(key: &str) -> String {
    normalize_key(key, &DIMENSION_KEY_RULES)
}

/// Normalizes a dimension value.
///
/// Every run of control characters is replaced by a single underscore, and the result is capped at
/// [`MAX_DIMENSION_VALUE_LEN`] code points. No other character is touched. A value consisting of exactly two double
/// quotes (`""`) is an empty value in disguise, and normalizes to the empty string.
///
/// The result is not escaped. See [`escape_dimension_value`][crate::escape_dimension_value].
pub fn normalize_dimension_value(value: &str) -> Cow<'_, str> {
    if value == QUOTED_EMPTY_VALUE {
        return Cow::Borrowed("");
    }

    if !value.chars().any(is_control_or_disallowed) {
        return Cow::Borrowed(truncate_chars(value, MAX_DIMENSION_VALUE_LEN));
    }

    let mut normalized = String::with_capacity(value.len());
    let mut in_invalid_run = false;
    let mut len = 0;
    for c in value.chars() {
        if len == MAX_DIMENSION_VALUE_LEN {
            debug!(
                max_len = MAX_DIMENSION_VALUE_LEN,
                "Dimension value exceeds maximum length. Truncating."
            );
            break;
        }

        if is_control_or_disallowed(c) {
            if !in_invalid_run {
                normalized.push('_');
                len += 1;
                in_invalid_run = true;
            }
        } else {
            normalized.push(c);
            len += 1;
            in_invalid_run = false;
        }
    }

    if normalized == QUOTED_EMPTY_VALUE {
        normalized.clear();
    }

    Cow::Owned(normalized)
}

fn normalize_key(key: &str, rules: &KeyRules) -> String {
    let mut normalized = String::with_capacity(key.len().min(rules.max_len + 1));

    for (i, section) in key.split('.').filter(|section| !section.is_empty()).enumerate() {
        if !normalized.is_empty() {
            normalized.push('.');
        }

        normalize_section(&mut normalized, section, rules.leading.for_section(i), rules);

        // Every character we emit is ASCII, so the byte length is the code point length.
        if normalized.len() > rules.max_len {
            break;
        }
    }

    if normalized.len() > rules.max_len {
        debug!(key, max_len = rules.max_len, "Key exceeds maximum length. Truncating.");
        normalized.truncate(rules.max_len);
        if normalized.ends_with('.') {
            normalized.pop();
        }
    }

    normalized
}

fn normalize_section(normalized: &mut String, section: &str, is_valid_leading: fn(char) -> bool, rules: &KeyRules) {
    let mut chars = section.chars().peekable();

    let mut replaced = false;
    while chars.next_if(|c| !is_valid_leading(*c)).is_some() {
        replaced = true;
    }
    if replaced {
        normalized.push('_');
    }

    let mut in_invalid_run = false;
    for c in chars {
        if (rules.is_valid_char)(c) {
            normalized.push(if rules.lowercase { c.to_ascii_lowercase() } else { c });
            in_invalid_run = false;
        } else if !in_invalid_run {
            normalized.push('_');
            in_invalid_run = true;
        }

        if normalized.len() > rules.max_len {
            break;
        }
    }
}

/// Returns the longest prefix of `s` that is at most `max_chars` code points long.
pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn metric_keys() {
        let cases: Vec<(&str, Option<&str>)> = vec![
            ("basecase", Some("basecase")),
            ("just.a.normal.key", Some("just.a.normal.key")),
            ("_case", Some("_case")),
            ("case_case", Some("case_case")),
            ("case1", Some("case1")),
            ("1case", Some("_case")),
            ("!@#case", Some("_case")),
            ("case!@#", Some("case_")),
            ("Case", Some("Case")),
            ("CASE", Some("CASE")),
            ("someCase", Some("someCase")),
            ("prefix.case", Some("prefix.case")),
            ("This.Is.Valid", Some("This.Is.Valid")),
            ("0a.b", Some("_a.b")),
            ("_a.b", Some("_a.b")),
            ("a.0", Some("a.0")),
            ("a.0.c", Some("a.0.c")),
            ("a.0b.c", Some("a.0b.c")),
            ("a.-b", Some("a._b")),
            ("a.---b", Some("a._b")),
            ("a.-~b", Some("a._b")),
            ("a.~0", Some("a._0")),
            ("a.b-", Some("a.b-")),
            ("-dim", Some("_dim")),
            ("dim-", Some("dim-")),
            ("dim---", Some("dim---")),
            ("", None),
            ("000", Some("_")),
            ("0.section", Some("_.section")),
            ("~key", Some("_key")),
            ("~0#key", Some("_key")),
            ("some~key", Some("some_key")),
            ("some#~äkey", Some("some_key")),
            ("a..b", Some("a.b")),
            ("a.....b", Some("a.b")),
            (".", None),
            ("...", None),
            (".a", None),
            ("a.", Some("a")),
            (".a.", None),
            ("___a", Some("___a")),
            ("a___", Some("a___")),
            ("a.b$%@.c#@", Some("a.b_.c_")),
            ("a___b", Some("a___b")),
            ("._._._a_._._.", None),
            ("_._._.a_._", Some("_._._.a_._")),
            ("an..empty.section", Some("an.empty.section")),
            ("a,,,b  c=d\\e\\ =,f", Some("a_b_c_d_e_f")),
            (
                "a!b\"c#d$e%f&g'h(i)j*k+l,m-n.o/p:q;r<s=t>u?v@w[x]y\\z^0 1_2;3{4|5}6~7",
                Some("a_b_c_d_e_f_g_h_i_j_k_l_m-n.o_p_q_r_s_t_u_v_w_x_y_z_0_1_2_3_4_5_6_7"),
            ),
            ("a.b.+", Some("a.b._")),
            ("metric.key-number-1.001", Some("metric.key-number-1.001")),
            ("MyMetric", Some("MyMetric")),
            ("0MyMetric", Some("_MyMetric")),
            ("mÄtric", Some("m_tric")),
            ("metriÄ", Some("metri_")),
            ("Ätric", Some("_tric")),
            ("meträääääÖÖÖc", Some("metr_c")),
        ];

        for (input, expected) in cases {
            assert_eq!(normalize_metric_key(input).as_deref(), expected, "input {:?}", input);
        }
    }

    #[test]
    fn metric_key_truncated() {
        let long = "a".repeat(270);
        assert_eq!(normalize_metric_key(&long), Some("a".repeat(MAX_METRIC_KEY_LEN)));

        // A cut that lands right after a dot must not leave the dot dangling.
        let dotted = format!("{}.b", "a".repeat(MAX_METRIC_KEY_LEN - 1));
        assert_eq!(normalize_metric_key(&dotted), Some("a".repeat(MAX_METRIC_KEY_LEN - 1)));

        // Truncation applies to the rewritten key, so a long run of invalid characters still only counts once.
        let collapsed = format!("a{}b", "ä".repeat(300));
        assert_eq!(normalize_metric_key(&collapsed).as_deref(), Some("a_b"));
    }

    #[test]
    fn dimension_keys() {
        let cases = vec![
            ("dim", "dim"),
            ("dim1", "dim1"),
            ("_dim", "_dim"),
            ("Dim", "dim"),
            ("dIm", "dim"),
            ("diM", "dim"),
            ("äABC", "_abc"),
            ("!@#case", "_case"),
            ("case!@#", "case_"),
            ("DIM", "dim"),
            ("dim:dim", "dim:dim"),
            ("dim_dim", "dim_dim"),
            ("dim-dim", "dim-dim"),
            ("-dim", "_dim"),
            ("dim-", "dim-"),
            ("dim---", "dim---"),
            ("---dim", "_dim"),
            (":dim", "_dim"),
            ("~@#ä", "_"),
            ("aaa~@#ä", "aaa_"),
            ("aaa___", "aaa___"),
            ("000", "_"),
            ("dim1.value1", "dim1.value1"),
            ("dim.0dim", "dim._dim"),
            ("dim.000", "dim._"),
            ("dim.~val", "dim._val"),
            ("dim.val~~", "dim.val_"),
            ("dim.~~~", "dim._"),
            ("dim._val", "dim._val"),
            ("dim.___", "dim.___"),
            ("dim.dim.dim.dim", "dim.dim.dim.dim"),
            ("a..b", "a.b"),
            ("a.....b", "a.b"),
            (".a", "a"),
            ("a.b:c.d", "a.b:c.d"),
            ("a.", "a"),
            (".", ""),
            ("a...", "a"),
            (".a.", "a"),
            ("   a", "_a"),
            ("a   ", "a_"),
            ("a b", "a_b"),
            ("a    b", "a_b"),
            ("", ""),
            ("dim.val:count.val001", "dim.val:count.val001"),
            ("a,,,b  c=d\\e\\ =,f", "a_b_c_d_e_f"),
            (
                "a!b\"c#d$e%f&g'h(i)j*k+l,m-n.o/p:q;r<s=t>u?v@w[x]y\\z^0 1_2;3{4|5}6~7",
                "a_b_c_d_e_f_g_h_i_j_k_l_m-n.o_p:q_r_s_t_u_v_w_x_y_z_0_1_2_3_4_5_6_7",
            ),
            ("Tag", "tag"),
            ("0Tag", "_tag"),
            ("tÄg", "t_g"),
            ("mytäääg", "myt_g"),
            ("ääätag", "_tag"),
            ("ä_ätag", "___tag"),
            ("Bla___", "bla___"),
        ];

        for (input, expected) in cases {
            assert_eq!(normalize_dimension_key(input), expected, "input {:?}", input);
        }
    }

    #[test]
    fn dimension_key_truncated() {
        assert_eq!(normalize_dimension_key(&"a".repeat(120)), "a".repeat(MAX_DIMENSION_KEY_LEN));
        assert_eq!(normalize_dimension_key(&"A".repeat(120)), "a".repeat(MAX_DIMENSION_KEY_LEN));
    }

    #[test]
    fn dimension_values() {
        let cases = vec![
            ("value", "value"),
            ("", ""),
            ("VALUE", "VALUE"),
            ("a:3", "a:3"),
            ("~@#ä", "~@#ä"),
            ("a b", "a b"),
            ("a,b", "a,b"),
            ("a=b", "a=b"),
            ("a\\b", "a\\b"),
            (" ,=\\", " ,=\\"),
            ("key=\"value\"", "key=\"value\""),
            ("\u{0000}a\u{0007}", "_a_"),
            ("a\u{0001}b", "a_b"),
            ("\u{0034}\u{0066}", "\u{0034}\u{0066}"),
            ("\u{0132}_\u{0133}_\u{0150}_\u{0156}", "\u{0132}_\u{0133}_\u{0150}_\u{0156}"),
            ("\u{0000}a", "_a"),
            ("\u{0000}\u{0000}", "_"),
            ("\u{0000}\u{0000}\u{0000}a", "_a"),
            ("a\u{0000}\u{0000}\u{0000}", "a_"),
            ("a\u{0000}", "a_"),
            ("a\u{0000}b", "a_b"),
            ("a\u{0000}\u{0007}\u{0000}b", "a_b"),
            ("line\nbreak", "line_break"),
            ("\"\"", ""),
            ("\"a\"", "\"a\""),
            ("\"\"\"", "\"\"\""),
        ];

        for (input, expected) in cases {
            assert_eq!(normalize_dimension_value(input), expected, "input {:?}", input);
        }
    }

    #[test]
    fn dimension_value_absent() {
        let absent: Option<&str> = None;
        assert_eq!(absent.map(normalize_dimension_value).unwrap_or_default(), "");
    }

    #[test]
    fn dimension_value_truncated() {
        assert_eq!(normalize_dimension_value(&"a".repeat(270)), "a".repeat(MAX_DIMENSION_VALUE_LEN));

        // Multi-byte code points count once each.
        let dogs = "🐶".repeat(300);
        assert_eq!(normalize_dimension_value(&dogs).chars().count(), MAX_DIMENSION_VALUE_LEN);

        let mixed = format!("{}\u{0000}{}", "a".repeat(10), "ä".repeat(300));
        let normalized = normalize_dimension_value(&mixed);
        assert_eq!(normalized.chars().count(), MAX_DIMENSION_VALUE_LEN);
        assert!(normalized.starts_with("aaaaaaaaaa_ä"));
    }

    #[test]
    fn dimension_value_borrows_when_untouched() {
        assert!(matches!(normalize_dimension_value("plain value"), Cow::Borrowed(_)));
        assert!(matches!(normalize_dimension_value("bell\u{0007}"), Cow::Owned(_)));
    }

    #[test]
    fn truncate_chars_respects_code_points() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abc", 2), "ab");
        assert_eq!(truncate_chars("äöü", 2), "äö");
        assert_eq!(truncate_chars("äöü", 0), "");
    }

    proptest! {
        #[test]
        fn property_test_metric_key_idempotent(input in "\\PC{0,300}") {
            if let Some(once) = normalize_metric_key(&input) {
                prop_assert_eq!(normalize_metric_key(&once), Some(once.clone()));
                prop_assert!(once.chars().count() <= MAX_METRIC_KEY_LEN);
            }
        }

        #[test]
        fn property_test_metric_key_sections_start_validly(input in "[a-zA-Z0-9._~#-]{1,80}") {
            if let Some(key) = normalize_metric_key(&input) {
                for (i, section) in key.split('.').enumerate() {
                    let first = section.chars().next();
                    prop_assert!(first.is_some(), "empty section in {:?}", key);
                    let first = first.unwrap_or_default();
                    if i == 0 {
                        prop_assert!(is_valid_leading_char(first), "key {:?}", key);
                    } else {
                        prop_assert!(is_valid_inner_leading_char(first), "key {:?}", key);
                    }
                }
            }
        }

        #[test]
        fn property_test_dimension_key_idempotent(input in "\\PC{0,150}") {
            let once = normalize_dimension_key(&input);
            prop_assert_eq!(normalize_dimension_key(&once), once.clone());
            prop_assert!(once.chars().count() <= MAX_DIMENSION_KEY_LEN);
            prop_assert!(!once.chars().any(|c| c.is_ascii_uppercase()));
        }

        #[test]
        fn property_test_dimension_value_bounded(input in "(\\PC|[\\x00-\\x1F]){0,400}") {
            let normalized = normalize_dimension_value(&input);
            prop_assert!(normalized.chars().count() <= MAX_DIMENSION_VALUE_LEN);
            prop_assert!(!normalized.chars().any(is_control_or_disallowed));
        }

        #[test]
        fn property_test_control_runs_collapse(prefix in "[a-z]{1,10}", run_len in 1usize..50, suffix in "[a-z]{1,10}") {
            let input = format!("{}{}{}", prefix, "\u{0007}".repeat(run_len), suffix);
            prop_assert_eq!(normalize_dimension_value(&input), format!("{}_{}", prefix, suffix));
        }
    }
}
