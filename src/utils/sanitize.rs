//! Input sanitization for request bodies and query strings.
//!
//! Strips null bytes, markup, SQL metacharacters and NoSQL operators from
//! every string, then trims. Object keys are cleaned the same way.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::config::SANITIZE_WARN_RATIO;

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap());

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

static SQL_META: Lazy<Regex> = Lazy::new(|| Regex::new(r"'|;|\\|/\*|\*/|--").unwrap());

static NOSQL_OPERATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$(where|ne|in|nin|not|or|and|nor|exists|type|mod|regex|text|search)")
        .unwrap()
});

/// Fields passed through untouched. Passwords are hashed, never
/// interpreted, and rewriting them would lock users out.
const VERBATIM_FIELDS: &[&str] = &["password"];

/// Clean a single string.
pub fn sanitize_str(input: &str) -> String {
    let cleaned = input.replace('\0', "");
    let cleaned = SCRIPT_BLOCK.replace_all(&cleaned, "");
    let cleaned = HTML_TAG.replace_all(&cleaned, "");
    let cleaned = SQL_META.replace_all(&cleaned, "");
    let cleaned = NOSQL_OPERATOR.replace_all(&cleaned, "");
    let cleaned = cleaned.trim().to_string();

    let before = input.chars().count();
    let after = cleaned.chars().count();
    if (after as f64) < (before as f64) * SANITIZE_WARN_RATIO {
        tracing::warn!(before, after, "Significant sanitization applied");
    }

    cleaned
}

/// Recursively clean every string and object key in a JSON value.
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_str(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, val)| {
                    if VERBATIM_FIELDS.contains(&key.as_str()) {
                        (key, val)
                    } else {
                        (sanitize_str(&key), sanitize_value(val))
                    }
                })
                .collect::<Map<_, _>>(),
        ),
        other => other,
    }
}
