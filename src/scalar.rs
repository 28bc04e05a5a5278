//! Scalar coercion.
//!
//! Interprets plain scalar text as native values: null markers, booleans,
//! arbitrary-precision integers, floats, and (optionally) `YYYY-MM-DD`
//! dates. Anything unrecognized stays a string.

use crate::value::{Date, Value};
use num_bigint::BigInt;
use num_traits::Num;

/// Coerce plain scalar text into a native value.
pub fn coerce(text: &str, interpret_dates: bool) -> Value {
    let s = text.trim();
    if s.is_empty() || s == "~" || s.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Some(b) = parse_bool(s) {
        return Value::Bool(b);
    }
    match s {
        ".inf" | "+.inf" => return Value::Float(f64::INFINITY),
        "-.inf" => return Value::Float(f64::NEG_INFINITY),
        ".nan" => return Value::Float(f64::NAN),
        _ => {}
    }
    if let Some(n) = parse_integer(s) {
        return Value::Integer(n);
    }
    if let Some(f) = parse_float(s) {
        return Value::Float(f);
    }
    if interpret_dates {
        if let Some(d) = parse_date(s) {
            return Value::Date(d);
        }
    }
    Value::String(s.to_string())
}

/// Boolean markers, case-insensitive.
fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes") || s.eq_ignore_ascii_case("on")
    {
        return Some(true);
    }
    if s.eq_ignore_ascii_case("false")
        || s.eq_ignore_ascii_case("no")
        || s.eq_ignore_ascii_case("off")
    {
        return Some(false);
    }
    None
}

/// Decimal integers of any size, plus `0x`/`0o`/`0b` radix prefixes.
fn parse_integer(s: &str) -> Option<BigInt> {
    let (sign, body) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let n = if let Some(hex) = body.strip_prefix("0x") {
        BigInt::from_str_radix(hex, 16).ok()?
    } else if let Some(oct) = body.strip_prefix("0o") {
        BigInt::from_str_radix(oct, 8).ok()?
    } else if let Some(bin) = body.strip_prefix("0b") {
        BigInt::from_str_radix(bin, 2).ok()?
    } else {
        if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        BigInt::from_str_radix(body, 10).ok()?
    };
    Some(n * sign)
}

/// Floats with a decimal point or exponent; plain integers are excluded so
/// they stay arbitrary precision.
fn parse_float(s: &str) -> Option<f64> {
    if !s.contains('.') && !s.contains('e') && !s.contains('E') {
        return None;
    }
    let body = s
        .strip_prefix('-')
        .or_else(|| s.strip_prefix('+'))
        .unwrap_or(s);
    let mut has_digit = false;
    for c in body.chars() {
        match c {
            '0'..='9' => has_digit = true,
            '.' | 'e' | 'E' | '+' | '-' => {}
            _ => return None,
        }
    }
    if !has_digit {
        return None;
    }
    s.parse::<f64>().ok()
}

/// `YYYY-MM-DD` with plausible month and day ranges.
fn parse_date(s: &str) -> Option<Date> {
    let mut parts = s.splitn(3, '-');
    let year = parts.next()?;
    let month = parts.next()?;
    let day = parts.next()?;
    if year.len() != 4 || month.len() != 2 || day.len() != 2 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some(Date { year, month, day })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_markers() {
        assert_eq!(coerce("", false), Value::Null);
        assert_eq!(coerce("~", false), Value::Null);
        assert_eq!(coerce("null", false), Value::Null);
        assert_eq!(coerce("NULL", false), Value::Null);
    }

    #[test]
    fn booleans() {
        assert_eq!(coerce("true", false), Value::Bool(true));
        assert_eq!(coerce("Yes", false), Value::Bool(true));
        assert_eq!(coerce("off", false), Value::Bool(false));
    }

    #[test]
    fn integers() {
        assert_eq!(coerce("42", false), Value::Integer(42.into()));
        assert_eq!(coerce("-7", false), Value::Integer((-7).into()));
        assert_eq!(coerce("0xff", false), Value::Integer(255.into()));
        assert_eq!(coerce("0o17", false), Value::Integer(15.into()));
        // larger than any machine word
        let big = coerce("123456789012345678901234567890", false);
        assert!(matches!(big, Value::Integer(_)));
    }

    #[test]
    fn floats() {
        assert_eq!(coerce("1.5", false), Value::Float(1.5));
        assert_eq!(coerce("-2e3", false), Value::Float(-2000.0));
        assert_eq!(coerce(".inf", false), Value::Float(f64::INFINITY));
        assert!(coerce(".nan", false).as_float().unwrap().is_nan());
    }

    #[test]
    fn dates_behind_flag() {
        assert_eq!(
            coerce("2024-02-29", true),
            Value::Date(Date {
                year: 2024,
                month: 2,
                day: 29
            })
        );
        assert_eq!(
            coerce("2024-02-29", false),
            Value::String("2024-02-29".to_string())
        );
        // bad month stays a string
        assert!(matches!(coerce("2024-13-01", true), Value::String(_)));
    }

    #[test]
    fn plain_text_stays_a_string() {
        assert_eq!(coerce("hello", false), Value::String("hello".to_string()));
        assert_eq!(coerce("1.2.3", false), Value::String("1.2.3".to_string()));
    }
}
