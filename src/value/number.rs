//! Numeral grammar and canonical number formatting.
//!
//! These two functions implement the string/number duality: [`parse_numeral`]
//! decides which strings are numeric and what they denote, and
//! [`format_float`] renders floats in the canonical `%.14g` text form used
//! whenever a number is converted to a string.
//!
//! # Grammar
//!
//! A numeral is, after skipping leading and trailing whitespace:
//!
//! - an optional `+` or `-` sign, followed by
//! - a decimal numeral `digits[.digits][(e|E)[sign]digits]` (either side of
//!   the point may be empty, but not both), or
//! - a hex numeral `0x`/`0X` followed by hex digits with an optional
//!   fraction and an optional binary exponent `(p|P)[sign]digits`.
//!
//! Decimal numerals without point or exponent are integers unless they
//! overflow 64 bits, in which case they become floats. Hex numerals without
//! point or exponent are integers that wrap around modulo 2^64. `inf` and
//! `nan` spellings are rejected.

use std::fmt;

/// A parsed numeral: either an exact integer or a float.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    /// A 64-bit integer.
    Int(i64),
    /// A 64-bit float.
    Float(f64),
}

impl Number {
    /// Returns the value as a float.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    /// Returns the value as an integer, truncating any fraction toward zero.
    ///
    /// NaN maps to zero and out-of-range floats saturate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn truncate(self) -> i64 {
        match self {
            Number::Int(v) => v,
            Number::Float(v) => v as i64,
        }
    }

    /// Returns the value as an integer if it has one without rounding.
    #[must_use]
    pub fn exact_integer(self) -> Option<i64> {
        match self {
            Number::Int(v) => Some(v),
            Number::Float(v) => float_to_exact_integer(v),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{v}"),
            Number::Float(v) => f.write_str(&format_float(*v)),
        }
    }
}

/// Converts a float to an integer only when no rounding is involved.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn float_to_exact_integer(value: f64) -> Option<i64> {
    // 2^63 is exactly representable; i64::MAX as f64 rounds up to it.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if value.fract() == 0.0 && (-LIMIT..LIMIT).contains(&value) {
        Some(value as i64)
    } else {
        None
    }
}

fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

/// Parses `text` under the numeral grammar.
///
/// Returns `None` when the text is not a numeral.
///
/// # Examples
///
/// ```rust
/// use luavalue::value::{parse_numeral, Number};
///
/// assert_eq!(parse_numeral(" 10 "), Some(Number::Int(10)));
/// assert_eq!(parse_numeral("0x10"), Some(Number::Int(16)));
/// assert_eq!(parse_numeral("1e2"), Some(Number::Float(100.0)));
/// assert_eq!(parse_numeral("0x1p4"), Some(Number::Float(16.0)));
/// assert_eq!(parse_numeral("abc"), None);
/// assert_eq!(parse_numeral("inf"), None);
/// ```
#[must_use]
pub fn parse_numeral(text: &str) -> Option<Number> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(|b| !is_space(*b))?;
    let end = bytes.iter().rposition(|b| !is_space(*b))? + 1;
    let body = &bytes[start..end];

    let (negative, unsigned) = match body.first()? {
        b'-' => (true, &body[1..]),
        b'+' => (false, &body[1..]),
        _ => (false, body),
    };

    if unsigned.len() > 1 && unsigned[0] == b'0' && matches!(unsigned[1], b'x' | b'X') {
        parse_hex(&unsigned[2..], negative)
    } else {
        parse_decimal(unsigned, negative)
    }
}

fn parse_hex(digits: &[u8], negative: bool) -> Option<Number> {
    let mut mantissa: u64 = 0;
    let mut float_mantissa = 0.0_f64;
    let mut exponent: i64 = 0;
    let mut any_digit = false;
    let mut seen_point = false;
    let mut is_float = false;
    let mut pos = 0;

    while pos < digits.len() {
        let byte = digits[pos];
        if byte == b'.' {
            if seen_point {
                return None;
            }
            seen_point = true;
            is_float = true;
        } else if let Some(digit) = char::from(byte).to_digit(16) {
            any_digit = true;
            mantissa = mantissa.wrapping_mul(16).wrapping_add(u64::from(digit));
            float_mantissa = float_mantissa * 16.0 + f64::from(digit);
            if seen_point {
                exponent -= 4;
            }
        } else {
            break;
        }
        pos += 1;
    }

    if !any_digit {
        return None;
    }

    if pos < digits.len() {
        if !matches!(digits[pos], b'p' | b'P') {
            return None;
        }
        is_float = true;
        exponent += parse_exponent(&digits[pos + 1..])?;
    }

    if is_float {
        let clamped = i32::try_from(exponent.clamp(-2200, 2200)).ok()?;
        let value = float_mantissa * 2.0_f64.powi(clamped);
        Some(Number::Float(if negative { -value } else { value }))
    } else {
        #[allow(clippy::cast_possible_wrap)]
        let value = mantissa as i64;
        Some(Number::Int(if negative {
            value.wrapping_neg()
        } else {
            value
        }))
    }
}

fn parse_exponent(text: &[u8]) -> Option<i64> {
    let (negative, digits) = match text.first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }

    let magnitude = digits.iter().fold(0_i64, |acc, d| {
        acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

fn parse_decimal(text: &[u8], negative: bool) -> Option<Number> {
    let int_len = text.iter().take_while(|b| b.is_ascii_digit()).count();
    let (int_part, rest) = text.split_at(int_len);

    let (frac_part, rest) = match rest.first() {
        Some(b'.') => {
            let frac_len = rest[1..].iter().take_while(|b| b.is_ascii_digit()).count();
            (Some(&rest[1..=frac_len]), &rest[1 + frac_len..])
        }
        _ => (None, rest),
    };

    if int_part.is_empty() && frac_part.map_or(true, <[u8]>::is_empty) {
        return None;
    }

    let exponent = match rest.first() {
        None => None,
        Some(b'e' | b'E') => Some(parse_exponent(&rest[1..])?),
        Some(_) => return None,
    };

    if frac_part.is_none() && exponent.is_none() {
        if let Some(value) = decimal_integer(int_part, negative) {
            return Some(Number::Int(value));
        }
    }

    // Rebuild a canonical literal so the float parser never sees an empty side
    // of the point.
    let mut literal = String::with_capacity(text.len() + 4);
    if negative {
        literal.push('-');
    }
    literal.push_str(digits_or_zero(int_part));
    literal.push('.');
    literal.push_str(digits_or_zero(frac_part.unwrap_or_default()));
    if let Some(exponent) = exponent {
        literal.push_str(&format!("e{exponent}"));
    }

    literal.parse::<f64>().ok().map(Number::Float)
}

fn digits_or_zero(digits: &[u8]) -> &str {
    if digits.is_empty() {
        "0"
    } else {
        std::str::from_utf8(digits).unwrap_or("0")
    }
}

fn decimal_integer(digits: &[u8], negative: bool) -> Option<i64> {
    let mut magnitude: u64 = 0;
    for digit in digits {
        magnitude = magnitude
            .checked_mul(10)?
            .checked_add(u64::from(digit - b'0'))?;
    }

    if negative {
        if magnitude == 1 << 63 {
            Some(i64::MIN)
        } else {
            i64::try_from(magnitude).ok().map(|v| -v)
        }
    } else {
        i64::try_from(magnitude).ok()
    }
}

/// Formats a float the way the runtime converts numbers to strings.
///
/// Uses 14 significant digits (`%.14g`), and appends `.0` when the result
/// would otherwise read as an integer so that the text parses back as a float.
///
/// # Examples
///
/// ```rust
/// use luavalue::value::format_float;
///
/// assert_eq!(format_float(3.0), "3.0");
/// assert_eq!(format_float(0.1), "0.1");
/// assert_eq!(format_float(1e100), "1e+100");
/// assert_eq!(format_float(-0.0), "-0.0");
/// assert_eq!(format_float(f64::INFINITY), "inf");
/// ```
#[must_use]
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return if value.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_string();
    }

    let mut text = format_general(value, 14);
    if text.bytes().all(|b| b == b'-' || b.is_ascii_digit()) {
        text.push_str(".0");
    }
    text
}

/// C `%.<precision>g` formatting for finite values.
fn format_general(value: f64, precision: usize) -> String {
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let scientific = format!("{:.*e}", precision - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    let precision_exp = precision as i32;
    if exponent < -4 || exponent >= precision_exp {
        let mantissa = trim_fraction(mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    } else {
        #[allow(clippy::cast_sign_loss)]
        let decimals = (precision_exp - 1 - exponent) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
