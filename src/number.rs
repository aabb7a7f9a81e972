//! Numeric literal rules and number formatting.
//!
//! * `0x`/`0X` prefix: hexadecimal, read as an unsigned bit pattern. Up to
//!   `0xFFFFFFFF` it is an `int` (bits reinterpreted), above that an `int64`.
//! * Leading `0` followed by more digits: octal, signed like decimal.
//! * A `.` or exponent anywhere: float.
//! * Anything else: decimal. Values outside the 32-bit range promote to
//!   `int64`; an `L` or `LL` suffix forces `int64`.

use crate::value::IntegerBase;

/// A classified numeric literal. `base` is `None` for decimal literals, whose
/// output base is left to the writer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int {
        value: i32,
        base: Option<IntegerBase>,
    },
    Int64 {
        value: i64,
        base: Option<IntegerBase>,
    },
    Float(f64),
}

fn strip_long_suffix(text: &str) -> (&str, bool) {
    if let Some(rest) = text.strip_suffix("LL").or_else(|| text.strip_suffix("ll")) {
        (rest, true)
    } else if let Some(rest) = text.strip_suffix('L').or_else(|| text.strip_suffix('l')) {
        (rest, true)
    } else {
        (text, false)
    }
}

/// Classifies and converts a numeric literal. The error is a short reason.
pub fn parse_literal(text: &str) -> Result<Number, String> {
    let (negative, signed, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, true, &text[1..]),
        Some(b'+') => (false, true, &text[1..]),
        _ => (false, false, text),
    };
    if unsigned.is_empty() {
        return Err("missing digits".to_string());
    }

    if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        if signed {
            return Err("hexadecimal literals cannot carry a sign".to_string());
        }
        let (digits, long) = strip_long_suffix(hex);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("malformed hexadecimal literal".to_string());
        }
        let bits = u64::from_str_radix(digits, 16)
            .map_err(|_| "hexadecimal literal exceeds 64 bits".to_string())?;
        return Ok(match u32::try_from(bits) {
            Ok(small) if !long => Number::Int {
                value: small as i32,
                base: Some(IntegerBase::Hex),
            },
            _ => Number::Int64 {
                value: bits as i64,
                base: Some(IntegerBase::Hex),
            },
        });
    }

    if unsigned.contains(['.', 'e', 'E']) {
        if !unsigned
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        {
            return Err("malformed floating point literal".to_string());
        }
        let value: f64 = text
            .parse()
            .map_err(|_| "malformed floating point literal".to_string())?;
        if !value.is_finite() {
            return Err("floating point literal out of range".to_string());
        }
        return Ok(Number::Float(value));
    }

    let (digits, long) = strip_long_suffix(unsigned);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err("malformed integer literal".to_string());
    }
    let (radix, base) = if digits.len() > 1 && digits.starts_with('0') {
        if digits.chars().any(|c| c > '7') {
            return Err("invalid digit in octal literal".to_string());
        }
        (8, Some(IntegerBase::Octal))
    } else {
        (10, None)
    };
    let magnitude = u64::from_str_radix(digits, radix)
        .map_err(|_| "integer literal exceeds 64 bits".to_string())?;
    let signed_value = if negative {
        -i128::from(magnitude)
    } else {
        i128::from(magnitude)
    };
    let value = i64::try_from(signed_value)
        .map_err(|_| "integer literal exceeds 64 bits".to_string())?;

    if !long {
        if let Ok(small) = i32::try_from(value) {
            return Ok(Number::Int { value: small, base });
        }
    }
    Ok(Number::Int64 { value, base })
}

/// Formats an integer so that it lexes back to the same kind and value.
/// 64-bit values always carry the `L` suffix.
pub fn format_integer(value: i64, is_int64: bool, base: IntegerBase) -> String {
    let suffix = if is_int64 { "L" } else { "" };
    match base {
        IntegerBase::Decimal => format!("{value}{suffix}"),
        IntegerBase::Hex if is_int64 => format!("0x{:X}{suffix}", value as u64),
        IntegerBase::Hex => format!("0x{:X}", value as i32 as u32),
        IntegerBase::Octal => {
            let magnitude = value.unsigned_abs();
            if magnitude == 0 {
                format!("0{suffix}")
            } else {
                let sign = if value < 0 { "-" } else { "" };
                format!("{sign}0{magnitude:o}{suffix}")
            }
        }
    }
}

/// Formats a float so that it lexes back as a float.
///
/// Without a precision the shortest representation that reads back to the
/// same `f64` is used: fixed notation for magnitudes in `[1e-4, 1e16)`,
/// scientific otherwise. With a precision the output has that many
/// significant digits, in the style of C's `%g`.
pub fn format_float(value: f64, precision: Option<usize>) -> String {
    match precision {
        None => {
            let magnitude = value.abs();
            if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
                format!("{value:e}")
            } else {
                ensure_float_marker(format!("{value}"))
            }
        }
        Some(precision) => {
            let precision = precision.max(1);
            let scientific = format!("{:.*e}", precision - 1, value);
            let Some((mantissa, exponent)) = scientific.split_once('e') else {
                return scientific;
            };
            let exponent: i32 = exponent.parse().unwrap_or(0);
            if exponent < -4 || exponent >= precision as i32 {
                format!("{}e{exponent}", trim_fraction(mantissa))
            } else {
                let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
                ensure_float_marker(trim_fraction(&format!("{value:.decimals$}")).to_string())
            }
        }
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

fn ensure_float_marker(mut text: String) -> String {
    if !text.contains(['.', 'e', 'E']) {
        text.push_str(".0");
    }
    text
}

pub(crate) fn float_to_i32(value: f64) -> Option<i32> {
    let truncated = value.trunc();
    if value.is_finite() && truncated >= f64::from(i32::MIN) && truncated <= f64::from(i32::MAX) {
        Some(truncated as i32)
    } else {
        None
    }
}

pub(crate) fn float_to_i64(value: f64) -> Option<i64> {
    let truncated = value.trunc();
    // i64::MAX is not representable; 2^63 is the first value out of range.
    if value.is_finite() && truncated >= -9_223_372_036_854_775_808.0 && truncated < 9_223_372_036_854_775_808.0 {
        Some(truncated as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(value: i32, base: Option<IntegerBase>) -> Number {
        Number::Int { value, base }
    }

    fn int64(value: i64, base: Option<IntegerBase>) -> Number {
        Number::Int64 { value, base }
    }

    #[test]
    fn test_decimal_literals() {
        assert_eq!(parse_literal("0"), Ok(int(0, None)));
        assert_eq!(parse_literal("42"), Ok(int(42, None)));
        assert_eq!(parse_literal("-17"), Ok(int(-17, None)));
        assert_eq!(parse_literal("+5"), Ok(int(5, None)));
        assert_eq!(parse_literal("-2147483648"), Ok(int(i32::MIN, None)));
    }

    #[test]
    fn test_overflow_promotes_to_int64() {
        assert_eq!(parse_literal("99999999999"), Ok(int64(99_999_999_999, None)));
        assert_eq!(parse_literal("2147483648"), Ok(int64(2_147_483_648, None)));
        assert_eq!(parse_literal("-2147483649"), Ok(int64(-2_147_483_649, None)));
    }

    #[test]
    fn test_long_suffix_forces_int64() {
        assert_eq!(parse_literal("5L"), Ok(int64(5, None)));
        assert_eq!(parse_literal("5LL"), Ok(int64(5, None)));
        assert_eq!(parse_literal("0x10L"), Ok(int64(16, Some(IntegerBase::Hex))));
    }

    #[test]
    fn test_beyond_64_bits_is_rejected() {
        assert!(parse_literal("9223372036854775808").is_err());
        assert_eq!(
            parse_literal("-9223372036854775808"),
            Ok(int64(i64::MIN, None))
        );
        assert!(parse_literal("0x1FFFFFFFFFFFFFFFF").is_err());
    }

    #[test]
    fn test_hex_is_a_bit_pattern() {
        assert_eq!(parse_literal("0xFF"), Ok(int(255, Some(IntegerBase::Hex))));
        assert_eq!(parse_literal("0xFFFFFFFF"), Ok(int(-1, Some(IntegerBase::Hex))));
        assert_eq!(
            parse_literal("0x100000000"),
            Ok(int64(4_294_967_296, Some(IntegerBase::Hex)))
        );
        assert!(parse_literal("-0x10").is_err());
        assert!(parse_literal("0x").is_err());
        assert!(parse_literal("0xG1").is_err());
    }

    #[test]
    fn test_octal_literals() {
        assert_eq!(parse_literal("010"), Ok(int(8, Some(IntegerBase::Octal))));
        assert_eq!(parse_literal("-017"), Ok(int(-15, Some(IntegerBase::Octal))));
        assert_eq!(parse_literal("00"), Ok(int(0, Some(IntegerBase::Octal))));
        assert!(parse_literal("08").is_err());
    }

    #[test]
    fn test_float_literals() {
        assert_eq!(parse_literal("0.5"), Ok(Number::Float(0.5)));
        assert_eq!(parse_literal("1."), Ok(Number::Float(1.0)));
        assert_eq!(parse_literal(".25"), Ok(Number::Float(0.25)));
        assert_eq!(parse_literal("1e3"), Ok(Number::Float(1000.0)));
        assert_eq!(parse_literal("-2.5E-3"), Ok(Number::Float(-0.0025)));
        assert_eq!(parse_literal("0e1"), Ok(Number::Float(0.0)));
        assert!(parse_literal("1e").is_err());
        assert!(parse_literal("1.5.2").is_err());
        assert!(parse_literal("1e999").is_err());
    }

    #[test]
    fn test_format_integer_bases() {
        assert_eq!(format_integer(42, false, IntegerBase::Decimal), "42");
        assert_eq!(format_integer(42, true, IntegerBase::Decimal), "42L");
        assert_eq!(format_integer(255, false, IntegerBase::Hex), "0xFF");
        assert_eq!(format_integer(-1, false, IntegerBase::Hex), "0xFFFFFFFF");
        assert_eq!(format_integer(-1, true, IntegerBase::Hex), "0xFFFFFFFFFFFFFFFFL");
        assert_eq!(format_integer(8, false, IntegerBase::Octal), "010");
        assert_eq!(format_integer(-8, false, IntegerBase::Octal), "-010");
        assert_eq!(format_integer(0, false, IntegerBase::Octal), "0");
    }

    #[test]
    fn test_formatted_integers_read_back() {
        for (value, is_int64) in [(-1i64, false), (i64::from(i32::MIN), false), (5, true), (-77, true)] {
            for base in [IntegerBase::Decimal, IntegerBase::Hex, IntegerBase::Octal] {
                let text = format_integer(value, is_int64, base);
                let parsed = parse_literal(&text).unwrap();
                match parsed {
                    Number::Int { value: v, .. } => {
                        assert!(!is_int64, "{text} lost its int64 kind");
                        assert_eq!(i64::from(v), value, "{text}");
                    }
                    Number::Int64 { value: v, .. } => {
                        assert!(is_int64, "{text} gained an int64 kind");
                        assert_eq!(v, value, "{text}");
                    }
                    Number::Float(_) => panic!("{text} read back as a float"),
                }
            }
        }
    }

    #[test]
    fn test_format_float_shortest() {
        assert_eq!(format_float(1.0, None), "1.0");
        assert_eq!(format_float(-0.5, None), "-0.5");
        assert_eq!(format_float(3.141592653589793, None), "3.141592653589793");
        assert_eq!(format_float(1e20, None), "1e20");
        assert_eq!(format_float(1.5e-7, None), "1.5e-7");
        assert_eq!(format_float(0.0, None), "0.0");
    }

    #[test]
    fn test_format_float_with_precision() {
        assert_eq!(format_float(3.14159265, Some(3)), "3.14");
        assert_eq!(format_float(1234567.0, Some(3)), "1.23e6");
        assert_eq!(format_float(0.00001234, Some(2)), "1.2e-5");
        assert_eq!(format_float(2.0, Some(6)), "2.0");
        assert_eq!(format_float(100.0, Some(6)), "100.0");
    }

    #[test]
    fn test_float_to_integer_narrowing() {
        assert_eq!(float_to_i32(3.9), Some(3));
        assert_eq!(float_to_i32(-3.9), Some(-3));
        assert_eq!(float_to_i32(3e10), None);
        assert_eq!(float_to_i64(3e10), Some(30_000_000_000));
        assert_eq!(float_to_i64(f64::NAN), None);
    }
}
