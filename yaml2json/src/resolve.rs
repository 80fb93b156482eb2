//! Scalar resolution.
//!
//! Untagged plain scalars follow the YAML 1.1 implicit typing used by safe
//! loaders: the null, bool, int and float patterns below are tried in that
//! order and anything else stays a string. `y` and `n` are strings. Floats
//! additionally accept an exponent without a dot (`1e5`).
//!
//! Scalars carrying an explicit core tag (`!!str`, `!!int`, ...) are
//! converted to that type or rejected.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Number, Value};

use crate::error::{LoadError, LoadErrorKind};

static NULL_PATTERN: LazyLock<Regex> = LazyLock::new(|| compile(r"^(?:~|null|Null|NULL)?$"));

static BOOL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"^(?:yes|Yes|YES|no|No|NO",
        r"|true|True|TRUE|false|False|FALSE",
        r"|on|On|ON|off|Off|OFF)$",
    ))
});

static INT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"^(?:[-+]?0b[0-1_]+",                 // binary
        r"|[-+]?0[0-7_]+",                     // octal
        r"|[-+]?(?:0|[1-9][0-9_]*)",           // decimal
        r"|[-+]?0x[0-9a-fA-F_]+",              // hexadecimal
        r"|[-+]?[1-9][0-9_]*(?::[0-5]?[0-9])+", // base 60
        r")$",
    ))
});

static FLOAT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"^(?:[-+]?[0-9][0-9_]*\.[0-9_]*(?:[eE][-+]?[0-9]+)?", // 1.5, 1.e5
        r"|[-+]?[0-9][0-9_]*[eE][-+]?[0-9]+",                 // 1e5
        r"|[-+]?\.[0-9_]+(?:[eE][-+]?[0-9]+)?",               // .5
        r"|[-+]?[0-9][0-9_]*(?::[0-5]?[0-9])+\.[0-9_]*",       // base 60
        r"|[-+]?\.(?:inf|Inf|INF)",
        r"|\.(?:nan|NaN|NAN)",
        r")$",
    ))
});

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid scalar pattern: {err}"),
    }
}

/// Resolve an untagged plain scalar to its implicit type.
///
/// # Errors
///
/// Returns an error if the scalar is numeric but has no JSON
/// representation: an integer outside the 64-bit range, or a float that
/// overflows or is `.inf`/`.nan`.
pub fn resolve_plain(text: &str) -> Result<Value, LoadError> {
    if NULL_PATTERN.is_match(text) {
        Ok(Value::Null)
    } else if BOOL_PATTERN.is_match(text) {
        construct_bool(text)
    } else if INT_PATTERN.is_match(text) {
        construct_int(text)
    } else if FLOAT_PATTERN.is_match(text) {
        construct_float(text)
    } else {
        Ok(Value::String(text.to_owned()))
    }
}

/// Convert a scalar carrying the core tag `!!{suffix}`.
///
/// `!!timestamp` values are kept as strings. Any suffix other than `str`,
/// `null`, `bool`, `int`, `float` or `timestamp` is unsupported on a scalar.
///
/// # Errors
///
/// Returns an error if the tag is unsupported, or if the text is not a
/// valid value of the tagged type.
pub fn resolve_tagged(suffix: &str, text: &str) -> Result<Value, LoadError> {
    match suffix {
        "str" | "timestamp" => Ok(Value::String(text.to_owned())),
        "null" => Ok(Value::Null),
        "bool" => construct_bool(text),
        "int" if INT_PATTERN.is_match(text) => construct_int(text),
        "float" if FLOAT_PATTERN.is_match(text) || INT_PATTERN.is_match(text) => {
            construct_float(text)
        }
        "int" | "float" => Err(LoadError::new(
            LoadErrorKind::InvalidScalar,
            format!("`{text}` is not a valid !!{suffix} value"),
        )),
        other => Err(LoadError::new(
            LoadErrorKind::UnsupportedTag,
            format!("unsupported tag `!!{other}`"),
        )),
    }
}

fn construct_bool(text: &str) -> Result<Value, LoadError> {
    match text.to_ascii_lowercase().as_str() {
        "yes" | "true" | "on" => Ok(Value::Bool(true)),
        "no" | "false" | "off" => Ok(Value::Bool(false)),
        _ => Err(LoadError::new(
            LoadErrorKind::InvalidScalar,
            format!("`{text}` is not a valid !!bool value"),
        )),
    }
}

fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else {
        (false, text.strip_prefix('+').unwrap_or(text))
    }
}

fn construct_int(text: &str) -> Result<Value, LoadError> {
    let cleaned = text.replace('_', "");
    let (negative, digits) = split_sign(&cleaned);

    let (body, radix) = if digits == "0" {
        ("0", 10)
    } else if let Some(bin) = digits.strip_prefix("0b") {
        (bin, 2)
    } else if let Some(hex) = digits.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(oct) = digits.strip_prefix('0') {
        (oct, 8)
    } else {
        (digits, 10)
    };

    if body.is_empty() {
        return Err(LoadError::new(
            LoadErrorKind::InvalidScalar,
            format!("`{text}` is not a valid !!int value"),
        ));
    }

    let magnitude = if body.contains(':') {
        sexagesimal_int(body)
    } else {
        u128::from_str_radix(body, radix).ok()
    };

    magnitude
        .and_then(|m| i128::try_from(m).ok())
        .map(|m| if negative { -m } else { m })
        .and_then(number_from_i128)
        .map(Value::Number)
        .ok_or_else(|| {
            LoadError::new(
                LoadErrorKind::IntegerOutOfRange,
                format!("integer `{text}` does not fit in 64 bits"),
            )
        })
}

fn sexagesimal_int(body: &str) -> Option<u128> {
    body.split(':').try_fold(0_u128, |acc, part| {
        acc.checked_mul(60)?.checked_add(part.parse::<u128>().ok()?)
    })
}

/// Narrow an integer to the JSON number range, preferring `i64`.
fn number_from_i128(value: i128) -> Option<Number> {
    if let Ok(signed) = i64::try_from(value) {
        Some(Number::from(signed))
    } else {
        u64::try_from(value).ok().map(Number::from)
    }
}

fn construct_float(text: &str) -> Result<Value, LoadError> {
    let cleaned = text.replace('_', "").to_ascii_lowercase();
    let (negative, body) = split_sign(&cleaned);

    let magnitude = match body {
        ".inf" => Some(f64::INFINITY),
        ".nan" => Some(f64::NAN),
        _ if body.contains(':') => sexagesimal_float(body),
        _ => body.parse::<f64>().ok(),
    }
    .ok_or_else(|| {
        LoadError::new(
            LoadErrorKind::InvalidScalar,
            format!("`{text}` is not a valid !!float value"),
        )
    })?;

    let value = if negative { -magnitude } else { magnitude };
    finite_number(value).map(Value::Number).ok_or_else(|| {
        LoadError::new(
            LoadErrorKind::NonFiniteFloat,
            format!("float `{text}` has no JSON representation"),
        )
    })
}

fn sexagesimal_float(body: &str) -> Option<f64> {
    body.split(':').try_fold(0.0_f64, |acc, part| {
        part.parse::<f64>().ok().map(|digit| acc * 60.0 + digit)
    })
}

/// Wrap a float as a JSON number; infinities and NaN have none.
fn finite_number(value: f64) -> Option<Number> {
    if value.is_finite() {
        Number::from_f64(value)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plain(text: &str) -> Value {
        resolve_plain(text).unwrap()
    }

    fn plain_err(text: &str) -> LoadErrorKind {
        resolve_plain(text).unwrap_err().kind
    }

    #[test]
    fn test_null_forms() {
        for text in ["", "~", "null", "Null", "NULL"] {
            assert_eq!(plain(text), Value::Null, "text: {text:?}");
        }
        assert_eq!(plain("nULL"), json!("nULL"));
    }

    #[test]
    fn test_yaml11_booleans() {
        for text in ["yes", "Yes", "YES", "true", "True", "on", "ON"] {
            assert_eq!(plain(text), json!(true), "text: {text:?}");
        }
        for text in ["no", "No", "false", "FALSE", "off", "Off"] {
            assert_eq!(plain(text), json!(false), "text: {text:?}");
        }
    }

    #[test]
    fn test_single_letters_stay_strings() {
        for text in ["y", "Y", "n", "N"] {
            assert_eq!(plain(text), json!(text));
        }
    }

    #[test]
    fn test_integer_forms() {
        assert_eq!(plain("0"), json!(0));
        assert_eq!(plain("42"), json!(42));
        assert_eq!(plain("-17"), json!(-17));
        assert_eq!(plain("+5"), json!(5));
        assert_eq!(plain("1_000"), json!(1000));
        assert_eq!(plain("017"), json!(15));
        assert_eq!(plain("0x1F"), json!(31));
        assert_eq!(plain("0b101"), json!(5));
        assert_eq!(plain("1:30"), json!(90));
        assert_eq!(plain("-1:00:00"), json!(-3600));
    }

    #[test]
    fn test_integer_edges_of_64_bit_range() {
        assert_eq!(plain("9223372036854775807"), json!(i64::MAX));
        assert_eq!(plain("-9223372036854775808"), json!(i64::MIN));
        assert_eq!(plain("18446744073709551615"), json!(u64::MAX));
    }

    #[test]
    fn test_integer_beyond_64_bits_is_rejected() {
        assert_eq!(
            plain_err("18446744073709551616"),
            LoadErrorKind::IntegerOutOfRange
        );
        assert_eq!(
            plain_err("-9223372036854775809"),
            LoadErrorKind::IntegerOutOfRange
        );
        assert_eq!(
            plain_err("0x1_0000_0000_0000_0000"),
            LoadErrorKind::IntegerOutOfRange
        );
        assert_eq!(
            plain_err("999999999999999999999999999999999999999999"),
            LoadErrorKind::IntegerOutOfRange
        );
    }

    #[test]
    fn test_number_from_i128_prefers_signed() {
        assert_eq!(number_from_i128(-1), Some(Number::from(-1_i64)));
        assert_eq!(number_from_i128(i128::from(u64::MAX)), Some(Number::from(u64::MAX)));
        assert_eq!(number_from_i128(i128::from(u64::MAX) + 1), None);
    }

    #[test]
    fn test_float_forms() {
        assert_eq!(plain("1.5"), json!(1.5));
        assert_eq!(plain("-0.25"), json!(-0.25));
        assert_eq!(plain(".5"), json!(0.5));
        assert_eq!(plain("1."), json!(1.0));
        assert_eq!(plain("1.0e+3"), json!(1000.0));
        assert_eq!(plain("1e3"), json!(1000.0));
        assert_eq!(plain("1_000.5"), json!(1000.5));
        assert_eq!(plain("1:30.5"), json!(90.5));
    }

    #[test]
    fn test_non_finite_floats_are_rejected() {
        for text in [".inf", "-.inf", "+.Inf", ".nan", ".NaN", "1e400", "-1e400"] {
            assert_eq!(plain_err(text), LoadErrorKind::NonFiniteFloat, "text: {text:?}");
        }
    }

    #[test]
    fn test_other_plain_text_is_string() {
        for text in ["hello", "2001-12-14", "1.2.3", "0x", "12abc", "inf", "nan", "<<"] {
            assert_eq!(plain(text), json!(text), "text: {text:?}");
        }
    }

    #[test]
    fn test_tagged_str_keeps_text() {
        assert_eq!(resolve_tagged("str", "123").unwrap(), json!("123"));
        assert_eq!(resolve_tagged("str", "yes").unwrap(), json!("yes"));
        assert_eq!(resolve_tagged("timestamp", "2001-12-14").unwrap(), json!("2001-12-14"));
    }

    #[test]
    fn test_tagged_numbers_and_bools() {
        assert_eq!(resolve_tagged("int", "12").unwrap(), json!(12));
        assert_eq!(resolve_tagged("float", "12").unwrap(), json!(12.0));
        assert_eq!(resolve_tagged("bool", "Off").unwrap(), json!(false));
        assert_eq!(resolve_tagged("null", "anything").unwrap(), Value::Null);
    }

    #[test]
    fn test_tagged_value_must_match_type() {
        let err = resolve_tagged("int", "twelve").unwrap_err();
        assert_eq!(err.kind, LoadErrorKind::InvalidScalar);
        assert!(err.message.contains("!!int"), "got: {}", err.message);
        assert_eq!(
            resolve_tagged("bool", "y").unwrap_err().kind,
            LoadErrorKind::InvalidScalar
        );
        assert_eq!(
            resolve_tagged("float", "fast").unwrap_err().kind,
            LoadErrorKind::InvalidScalar
        );
    }

    #[test]
    fn test_tagged_outside_scalar_types_is_unsupported() {
        for suffix in ["binary", "set", "omap", "seq", "python/object"] {
            let err = resolve_tagged(suffix, "aGVsbG8=").unwrap_err();
            assert_eq!(err.kind, LoadErrorKind::UnsupportedTag, "suffix: {suffix}");
        }
    }
}
