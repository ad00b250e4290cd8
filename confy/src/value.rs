//! Best-effort coercion of environment and override strings.
//!
//! Parsing never fails: each candidate form is tried in turn and the
//! original string is returned when none applies.

use serde_json::{Number, Value};

/// Coerce a raw string into a typed value.
///
/// Rules are tried in order after trimming whitespace:
///
/// 1. `true`, `false` and `null` (any case).
/// 2. Integers without a decimal point or exponent.
/// 3. Finite floating-point numbers.
/// 4. JSON documents delimited by `{}`, `[]` or `""`.
///
/// Anything else is returned as the original, untrimmed string.
///
/// # Examples
///
/// ```
/// use confy::value::parse_str;
/// use serde_json::json;
///
/// assert_eq!(parse_str(" TRUE "), json!(true));
/// assert_eq!(parse_str("6000"), json!(6000));
/// assert_eq!(parse_str("[1, 2]"), json!([1, 2]));
/// assert_eq!(parse_str(" plain "), json!(" plain "));
/// ```
#[must_use]
pub fn parse_str(raw: &str) -> Value {
    let trimmed = raw.trim();
    if is_integer_syntax(trimmed) {
        // Digits too wide for 64 bits stay text rather than losing precision.
        return parse_integer(trimmed).unwrap_or_else(|| Value::String(raw.to_owned()));
    }
    parse_keyword(trimmed)
        .or_else(|| parse_float(trimmed))
        .or_else(|| parse_structured(trimmed))
        .unwrap_or_else(|| Value::String(raw.to_owned()))
}

/// Coerce `value` when it is a string; any other value passes through.
///
/// ```
/// use confy::value::parse_value;
/// use serde_json::json;
///
/// assert_eq!(parse_value(json!("false")), json!(false));
/// assert_eq!(parse_value(json!(123)), json!(123));
/// ```
#[must_use]
pub fn parse_value(value: Value) -> Value {
    match value {
        Value::String(raw) => parse_str(&raw),
        other => other,
    }
}

fn parse_keyword(trimmed: &str) -> Option<Value> {
    if trimmed.eq_ignore_ascii_case("true") {
        Some(Value::Bool(true))
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(Value::Bool(false))
    } else if trimmed.eq_ignore_ascii_case("null") {
        Some(Value::Null)
    } else {
        None
    }
}

fn is_integer_syntax(trimmed: &str) -> bool {
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn parse_integer(trimmed: &str) -> Option<Value> {
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(Value::Number(n.into()));
    }
    trimmed.parse::<u64>().ok().map(|n| Value::Number(n.into()))
}

fn parse_float(trimmed: &str) -> Option<Value> {
    // Rust's float grammar also accepts `inf` and `NaN`; those have no JSON
    // representation and fall through to the later rules.
    let parsed = trimmed.parse::<f64>().ok()?;
    Number::from_f64(parsed).map(Value::Number)
}

fn parse_structured(trimmed: &str) -> Option<Value> {
    let mut chars = trimmed.chars();
    let first = chars.next()?;
    let closer = match first {
        '{' => '}',
        '[' => ']',
        '"' => '"',
        _ => return None,
    };
    if trimmed.len() < 2 || !trimmed.ends_with(closer) {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}
