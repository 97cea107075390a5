//! Coercion of loosely-typed input into typed values.
//!
//! # Responsibility
//! - Convert raw parameter text into the type a target field requires.
//! - Provide the best-effort inference used when the caller did not declare
//!   a field type.
//! - Convert already-typed values at comparison time.
//!
//! # Invariants
//! - Inference accepts only unsigned digit runs as integers and digit runs
//!   with exactly one decimal point as floats; everything else that is not
//!   `true`/`false` stays text.
//! - Declared-type conversion failures are `InvalidValue`, never silent.

use super::{ExpectedType, TransformError, TransformResult};
use crate::model::record::ID_FIELD;
use crate::model::value::TypedValue;
use once_cell::sync::Lazy;
use regex::Regex;

/// Fields that are always numeric regardless of caller intent.
pub const RESERVED_NUMERIC_FIELDS: &[&str] = &["price", "quantity"];

static INTEGER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid integer regex"));
static DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9]+\.[0-9]*|\.[0-9]+)$").expect("valid decimal regex"));

/// Returns whether `field` is declared numeric by the reserved schema.
pub fn is_reserved_numeric(field: &str) -> bool {
    RESERVED_NUMERIC_FIELDS.contains(&field)
}

/// Coerces one raw operation parameter for `field`.
///
/// - `id` must parse as an integer.
/// - reserved numeric fields must parse as a float.
/// - anything else goes through [`infer_value`].
///
/// # Errors
/// - `InvalidValue` when a declared integer/number does not parse.
pub fn coerce_value(field: &str, raw: &str) -> TransformResult<TypedValue> {
    if field == ID_FIELD {
        return parse_integer(field, raw).map(TypedValue::Integer);
    }
    if is_reserved_numeric(field) {
        return coerce_numeric(field, raw);
    }
    Ok(infer_value(raw))
}

/// Coerces a raw value for a field the caller declares numeric.
pub fn coerce_numeric(field: &str, raw: &str) -> TransformResult<TypedValue> {
    parse_float(field, raw).map(TypedValue::Float)
}

/// Best-effort type inference for untyped text.
pub fn infer_value(raw: &str) -> TypedValue {
    if INTEGER_RE.is_match(raw) {
        // Digit runs beyond i64 fall through to the float branch.
        if let Ok(value) = raw.parse::<i64>() {
            return TypedValue::Integer(value);
        }
        if let Ok(value) = raw.parse::<f64>() {
            return TypedValue::Float(value);
        }
    }
    if DECIMAL_RE.is_match(raw) {
        if let Ok(value) = raw.parse::<f64>() {
            return TypedValue::Float(value);
        }
    }
    if raw.eq_ignore_ascii_case("true") {
        return TypedValue::Boolean(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return TypedValue::Boolean(false);
    }
    TypedValue::Text(raw.to_string())
}

/// Parses a boolean flag parameter (`true|false|1|0`, case-insensitive).
pub fn parse_flag(field: &str, raw: &str) -> TransformResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(TransformError::invalid_value(
            field,
            raw,
            ExpectedType::Boolean,
        )),
    }
}

/// Converts a typed value to an integer for identifier comparison.
///
/// Whole floats and integer text convert; fractional floats, booleans and
/// other text fail.
pub fn value_as_integer(field: &str, value: &TypedValue) -> TransformResult<i64> {
    match value {
        TypedValue::Integer(int) => Ok(*int),
        TypedValue::Float(float)
            if float.fract() == 0.0 && *float >= i64::MIN as f64 && *float < i64::MAX as f64 =>
        {
            Ok(*float as i64)
        }
        TypedValue::Text(text) => parse_integer(field, text),
        other => Err(TransformError::invalid_value(
            field,
            other,
            ExpectedType::Integer,
        )),
    }
}

/// Converts a typed value to a float for numeric comparison.
pub fn value_as_float(field: &str, value: &TypedValue) -> TransformResult<f64> {
    match value {
        TypedValue::Integer(int) => Ok(*int as f64),
        TypedValue::Float(float) => Ok(*float),
        TypedValue::Text(text) => parse_float(field, text),
        TypedValue::Boolean(_) => Err(TransformError::invalid_value(
            field,
            value,
            ExpectedType::Number,
        )),
    }
}

fn parse_integer(field: &str, raw: &str) -> TransformResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| TransformError::invalid_value(field, raw, ExpectedType::Integer))
}

fn parse_float(field: &str, raw: &str) -> TransformResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| TransformError::invalid_value(field, raw, ExpectedType::Number))
}
