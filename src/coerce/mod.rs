//! The `to_*` / `opt_*` / `check_*` accessor families on [`Value`].
//!
//! Every native target shape has three accessors with a fixed contract:
//!
//! | Tier | Absent (`nil`) | Convertible | Wrong type |
//! |------|----------------|-------------|------------|
//! | `to_*` | zero/empty/`false`/`None` | converted | zero/empty/`false`/`None` |
//! | `opt_*(default)` | `default` | converted | type error |
//! | `check_*` | type error | converted | type error |
//!
//! # Numeric Rules
//!
//! - `Int` converts exactly; narrowing to a smaller width wraps like `as`
//! - An integral `Float` converts exactly; a fractional one truncates toward
//!   zero for integer targets in all three tiers
//! - A `Float` outside the `i64` range (or NaN) has no integer representation:
//!   `to_*` saturates while integer `opt_*`/`check_*` fail
//! - A numeral string is parsed first. If it does not parse, `to_*` yields
//!   zero, `opt_*` yields the default and `check_*` fails. If it denotes a
//!   fractional value, integer `opt_*`/`check_*` fail with "number has no
//!   integer representation" while `to_*` truncates.
//!
//! The accessors are split by tier into the `to`, `opt` and `check`
//! submodules; the operand classification they share lives here.
//!
//! [`Value`]: crate::Value

mod check;
mod opt;
mod to;

use crate::{
    value::{float_to_exact_integer, parse_numeral, Number, Value},
    Error, ErrorKind, Result,
};

/// How a value looks to a numeric accessor.
#[derive(Debug, PartialEq)]
pub(crate) enum Operand<T> {
    /// `nil`.
    Absent,
    /// A value of the requested shape.
    Present(T),
    /// A numeral string whose value had to be truncated; carries the truncation.
    Inexact(T),
    /// A string that is not a numeral.
    Malformed,
    /// Any other type.
    Mismatch,
}

impl<T> Operand<T> {
    fn map<U>(self, f: impl FnOnce(T) -> U) -> Operand<U> {
        match self {
            Operand::Absent => Operand::Absent,
            Operand::Present(v) => Operand::Present(f(v)),
            Operand::Inexact(v) => Operand::Inexact(f(v)),
            Operand::Malformed => Operand::Malformed,
            Operand::Mismatch => Operand::Mismatch,
        }
    }

    /// The `to_*` reading: anything unusable becomes `zero`.
    pub(crate) fn or_zero(self, zero: T) -> T {
        match self {
            Operand::Present(v) | Operand::Inexact(v) => v,
            Operand::Absent | Operand::Malformed | Operand::Mismatch => zero,
        }
    }

    /// The `opt_*` reading: absent and malformed operands take `default`.
    pub(crate) fn or_default(
        self,
        value: &Value,
        expected: &'static str,
        default: T,
    ) -> Result<T> {
        match self {
            Operand::Present(v) => Ok(v),
            Operand::Absent | Operand::Malformed => Ok(default),
            Operand::Inexact(_) => Err(ErrorKind::NoIntegerRepresentation.into()),
            Operand::Mismatch => Err(type_error!(expected, value)),
        }
    }

    /// The `check_*` reading: only a present operand succeeds.
    pub(crate) fn required(self, value: &Value, expected: &'static str) -> Result<T> {
        match self {
            Operand::Present(v) => Ok(v),
            Operand::Inexact(_) => Err(ErrorKind::NoIntegerRepresentation.into()),
            Operand::Malformed => Err(malformed(value)),
            Operand::Absent | Operand::Mismatch => Err(type_error!(expected, value)),
        }
    }
}

fn malformed(value: &Value) -> Error {
    ErrorKind::MalformedNumber(value.as_str().unwrap_or_default().to_string()).into()
}

impl Value {
    /// Classifies the value for integer accessors.
    pub(crate) fn integer_operand(&self) -> Operand<i64> {
        match self {
            Value::Nil => Operand::Absent,
            Value::Int(i) => Operand::Present(*i),
            Value::Float(f) => match float_to_exact_integer(f.trunc()) {
                Some(i) => Operand::Present(i),
                None => Operand::Inexact(Number::Float(*f).truncate()),
            },
            Value::Str(s) => match parse_numeral(s) {
                Some(number) => match number.exact_integer() {
                    Some(i) => Operand::Present(i),
                    None => Operand::Inexact(number.truncate()),
                },
                None => Operand::Malformed,
            },
            _ => Operand::Mismatch,
        }
    }

    /// Classifies the value for float accessors.
    pub(crate) fn float_operand(&self) -> Operand<f64> {
        self.number_operand().map(Number::as_f64)
    }

    /// Classifies the value for number accessors, keeping the integer/float split.
    pub(crate) fn number_operand(&self) -> Operand<Number> {
        match self {
            Value::Nil => Operand::Absent,
            Value::Int(i) => Operand::Present(Number::Int(*i)),
            Value::Float(f) => Operand::Present(Number::Float(*f)),
            Value::Str(s) => parse_numeral(s).map_or(Operand::Malformed, Operand::Present),
            _ => Operand::Mismatch,
        }
    }

    /// Classifies the value for text accessors; numbers render canonically.
    pub(crate) fn text_operand(&self) -> Operand<String> {
        match self {
            Value::Nil => Operand::Absent,
            Value::Str(s) => Operand::Present(s.to_string()),
            Value::Int(_) | Value::Float(_) => Operand::Present(self.to_string()),
            _ => Operand::Mismatch,
        }
    }

    /// Classifies the value as an object of one variant.
    pub(crate) fn object_operand<T: Clone>(
        &self,
        pick: impl FnOnce(&Value) -> Option<&T>,
    ) -> Operand<T> {
        if self.is_nil() {
            return Operand::Absent;
        }
        pick(self).map_or(Operand::Mismatch, |object| Operand::Present(object.clone()))
    }
}
