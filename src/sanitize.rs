//! Free-text sanitization for poll questions and options
//!
//! Strips the characters and patterns that would let user content smuggle
//! markup or script into a page:
//!
//! - `<` and `>` anywhere in the text
//! - the `javascript:` scheme prefix, in any letter case
//! - inline event-handler assignments such as `onclick=` or `onerror=`
//!
//! The result is trimmed. Everything happens in one linear pass per step,
//! and no step can splice together a pattern an earlier step removed, so the
//! function is idempotent.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

const SCRIPT_SCHEME: &str = "javascript:";

/// Word characters immediately followed by `=`, e.g. `onclick=`
static EVENT_HANDLER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\w+=").expect("Invalid event handler regex"));

/// Sanitize a piece of user text.
pub fn sanitize(text: &str) -> String {
    let without_scheme = strip_script_schemes(text.chars().filter(|c| *c != '<' && *c != '>'));

    // A removed `\w+=` is always preceded by a non-word character or the
    // start of the text, so removal cannot form a new match of either pattern.
    EVENT_HANDLER_REGEX
        .replace_all(&without_scheme, "")
        .trim()
        .to_string()
}

/// Sanitize a raw input value. Anything that is not a string yields an empty string.
pub fn sanitize_value(value: &Value) -> String {
    match value {
        Value::String(text) => sanitize(text),
        _ => String::new(),
    }
}

/// Drops every `javascript:` (any case), including ones that only appear once
/// an inner occurrence is gone, e.g. `javajavascript:script:`.
fn strip_script_schemes(chars: impl Iterator<Item = char>) -> String {
    let mut out = String::new();

    for c in chars {
        out.push(c);

        if out.len() >= SCRIPT_SCHEME.len() {
            let tail = out.len() - SCRIPT_SCHEME.len();
            if out.is_char_boundary(tail) && out[tail..].eq_ignore_ascii_case(SCRIPT_SCHEME) {
                out.truncate(tail);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(sanitize("What is your favourite colour?"), "What is your favourite colour?");
    }

    #[test]
    fn test_strips_angle_brackets() {
        assert_eq!(sanitize("<b>bold</b>"), "bbold/b");
        assert_eq!(sanitize("a < b > c"), "a  b  c");
    }

    #[test]
    fn test_strips_script_scheme_any_case() {
        assert_eq!(sanitize("javascript:alert(1)"), "alert(1)");
        assert_eq!(sanitize("JaVaScRiPt:alert(1)"), "alert(1)");
    }

    #[test]
    fn test_strips_event_handlers() {
        assert_eq!(sanitize("img onerror=alert(1)"), "img alert(1)");
        assert_eq!(sanitize("ONCLICK=steal()"), "steal()");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(sanitize("   padded   "), "padded");
        assert_eq!(sanitize("\t\n"), "");
    }

    #[test]
    fn test_removal_does_not_splice_new_patterns() {
        // Dropping the bracket would otherwise reassemble the scheme.
        assert_eq!(sanitize("java<script:alert(1)"), "alert(1)");
        // Dropping the inner scheme would otherwise reassemble the outer one.
        assert_eq!(sanitize("javajavascript:script:x"), "x");
    }

    #[test]
    fn test_deeply_nested_schemes_removed() {
        let depth = 20_000;
        let nested = format!(
            "{}javascript:{}tail",
            "java".repeat(depth),
            "script:".repeat(depth)
        );
        assert_eq!(sanitize(&nested), "tail");

        let mixed_case = format!("{}JavaScript:{}x", "JAVA".repeat(50), "Script:".repeat(50));
        assert_eq!(sanitize(&mixed_case), "x");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "   ",
            "Hello world",
            "<script>alert('x')</script>",
            "javajavascript:script:alert(1)",
            "  onload=onclick==x  ",
            "a<<b>>c",
            "jav<ascript:void(0)",
            "  mixed \t <i>content</i> onerror=1 JAVASCRIPT: tail  ",
            "ünïcödé=välue",
            "a=javascript:b=",
            "java=script:x",
            "jajavascript:vascript:javascript:",
        ];

        for sample in samples {
            let once = sanitize(sample);
            assert_eq!(sanitize(&once), once, "sanitize not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_non_string_values_become_empty() {
        assert_eq!(sanitize_value(&json!(null)), "");
        assert_eq!(sanitize_value(&json!(42)), "");
        assert_eq!(sanitize_value(&json!(["a"])), "");
        assert_eq!(sanitize_value(&json!(" <ok> ")), "ok");
    }
}
