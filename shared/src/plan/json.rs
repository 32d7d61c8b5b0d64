//! Lenient accessors over loosely-typed plan JSON
//!
//! Plans are LLM-generated, so any field may be missing, null, a number
//! where a string was expected, or the reverse.

use serde_json::Value;

/// Whether a value counts as present for "first non-empty wins" chains
///
/// Null, `false`, zero, NaN and the empty string are absent; everything
/// else (including empty arrays and objects) is present.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0 && !v.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// First present value among the candidates, in order
pub fn first_truthy<'a, I>(candidates: I) -> Option<&'a Value>
where
    I: IntoIterator<Item = Option<&'a Value>>,
{
    candidates.into_iter().flatten().find(|v| is_truthy(v))
}

/// Field `key` of `value` when it is a non-empty string
pub fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Field `key` of `value` as an array slice, empty when absent or not an array
pub fn array_field<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Parse a leading integer out of a number or string
///
/// `"165 cal"` gives 165, `12.7` gives 12, `"abc"` gives `None`.
pub fn parse_int(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).map(f64::trunc),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

fn parse_leading_int(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    rest[..end].parse::<f64>().ok().map(|v| sign * v)
}

/// Integer-parse the first present candidate, `0.0` when nothing parses
pub fn int_from_first<'a, I>(candidates: I) -> f64
where
    I: IntoIterator<Item = Option<&'a Value>>,
{
    first_truthy(candidates).and_then(parse_int).unwrap_or(0.0)
}

/// Like [`parse_int`], but numbers keep their fraction for later rounding
pub fn parse_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        _ => parse_int(value),
    }
}

/// [`parse_amount`] of the first present candidate, `0.0` when nothing parses
pub fn amount_from_first<'a, I>(candidates: I) -> f64
where
    I: IntoIterator<Item = Option<&'a Value>>,
{
    first_truthy(candidates).and_then(parse_amount).unwrap_or(0.0)
}

/// Round an accumulated amount into a non-negative whole count
pub fn to_count(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}

/// Upper-case the first character
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
