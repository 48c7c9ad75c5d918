//! Defaulted conversions for optional arguments.
//!
//! `nil` yields the default. A present value of the wrong type is a type
//! error; a string that is not a numeral also yields the default.

use std::{any::Any, sync::Arc};

use super::Operand;
use crate::{
    value::{Closure, Function, Table, Thread, TypeTag, UserData, Value},
    Result,
};

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
impl Value {
    /// Returns the boolean, or `default` when `nil`.
    ///
    /// # Errors
    ///
    /// Type error when the value is present but not a boolean.
    pub fn opt_boolean(&self, default: bool) -> Result<bool> {
        match self {
            Value::Nil => Ok(default),
            Value::Boolean(b) => Ok(*b),
            _ => Err(type_error!("boolean", self)),
        }
    }

    /// Returns the value as a byte, or `default` when absent.
    ///
    /// # Errors
    ///
    /// See [`Value::opt_long`].
    pub fn opt_byte(&self, default: u8) -> Result<u8> {
        self.opt_integer_as(i64::from(default)).map(|v| v as u8)
    }

    /// Returns the value as a character, or `default` when absent.
    ///
    /// # Errors
    ///
    /// See [`Value::opt_long`].
    pub fn opt_char(&self, default: char) -> Result<char> {
        if self.is_nil() {
            return Ok(default);
        }
        Ok(u32::try_from(self.opt_integer_as(i64::from(u32::from(default)))?)
            .ok()
            .and_then(char::from_u32)
            .unwrap_or('\0'))
    }

    /// Returns the value as an `i16`, or `default` when absent.
    ///
    /// # Errors
    ///
    /// See [`Value::opt_long`].
    pub fn opt_short(&self, default: i16) -> Result<i16> {
        self.opt_integer_as(i64::from(default)).map(|v| v as i16)
    }

    /// Returns the value as an `i32`, or `default` when absent.
    ///
    /// # Errors
    ///
    /// See [`Value::opt_long`].
    pub fn opt_int(&self, default: i32) -> Result<i32> {
        self.opt_integer_as(i64::from(default)).map(|v| v as i32)
    }

    /// Returns the value as an `i64`, or `default` when absent.
    ///
    /// A string that is not a numeral also yields `default`.
    ///
    /// # Errors
    ///
    /// Type error when the value is present and not numeric, and "number
    /// has no integer representation" for a fractional numeral string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use luavalue::Value;
    ///
    /// assert_eq!(Value::Nil.opt_long(7)?, 7);
    /// assert_eq!(Value::from("12").opt_long(7)?, 12);
    /// assert_eq!(Value::from(2.75).opt_long(7)?, 2);
    /// assert!(Value::from(true).opt_long(7).is_err());
    /// # Ok::<(), luavalue::Error>(())
    /// ```
    pub fn opt_long(&self, default: i64) -> Result<i64> {
        self.opt_integer_as(default)
    }

    fn opt_integer_as(&self, default: i64) -> Result<i64> {
        self.integer_operand().or_default(self, "number", default)
    }

    /// Returns the value as an `f32`, or `default` when absent.
    ///
    /// # Errors
    ///
    /// Type error when the value is present and not numeric.
    pub fn opt_float(&self, default: f32) -> Result<f32> {
        self.float_operand()
            .or_default(self, "number", f64::from(default))
            .map(|v| v as f32)
    }

    /// Returns the value as an `f64`, or `default` when absent.
    ///
    /// # Errors
    ///
    /// Type error when the value is present and not numeric.
    pub fn opt_double(&self, default: f64) -> Result<f64> {
        self.float_operand().or_default(self, "number", default)
    }

    /// Returns the value as an integer value, or `default` when absent.
    ///
    /// # Errors
    ///
    /// See [`Value::opt_long`].
    pub fn opt_integer(&self, default: Value) -> Result<Value> {
        match self.integer_operand() {
            Operand::Absent | Operand::Malformed => Ok(default),
            operand => operand.or_default(self, "number", 0).map(Value::Int),
        }
    }

    /// Returns the value as a number value, or `default` when absent.
    ///
    /// Numeral strings are converted to numbers.
    ///
    /// # Errors
    ///
    /// Type error when the value is present and not numeric.
    pub fn opt_number(&self, default: Value) -> Result<Value> {
        match self.number_operand() {
            Operand::Absent | Operand::Malformed => Ok(default),
            operand => operand.required(self, "number").map(Value::from),
        }
    }

    /// Returns the value as text, or `default` when absent.
    ///
    /// Numbers are rendered in canonical form.
    ///
    /// # Errors
    ///
    /// Type error when the value is present and neither a string nor a number.
    pub fn opt_text(&self, default: &str) -> Result<String> {
        self.text_operand()
            .or_default(self, "string", default.to_string())
    }

    /// Returns the value as a string value, or `default` when absent.
    ///
    /// # Errors
    ///
    /// Type error when the value is present and neither a string nor a number.
    pub fn opt_string(&self, default: Value) -> Result<Value> {
        match self {
            Value::Nil => Ok(default),
            Value::Str(_) => Ok(self.clone()),
            Value::Int(_) | Value::Float(_) => Ok(Value::from(self.to_string())),
            _ => Err(type_error!("string", self)),
        }
    }

    /// Returns the table, or `default` when absent.
    ///
    /// # Errors
    ///
    /// Type error when the value is present and not a table.
    pub fn opt_table(&self, default: Option<Table>) -> Result<Option<Table>> {
        self.object_operand(Value::as_table)
            .map(Some)
            .or_default(self, "table", default)
    }

    /// Returns the coroutine, or `default` when absent.
    ///
    /// # Errors
    ///
    /// Type error when the value is present and not a thread.
    pub fn opt_thread(&self, default: Option<Thread>) -> Result<Option<Thread>> {
        self.object_operand(Value::as_thread)
            .map(Some)
            .or_default(self, "thread", default)
    }

    /// Returns the function, or `default` when absent.
    ///
    /// # Errors
    ///
    /// Type error when the value is present and not a function.
    pub fn opt_function(&self, default: Option<Function>) -> Result<Option<Function>> {
        self.object_operand(Value::as_function)
            .map(Some)
            .or_default(self, "function", default)
    }

    /// Returns the closure, or `default` when absent.
    ///
    /// # Errors
    ///
    /// Type error when the value is present and not a script closure.
    pub fn opt_closure(&self, default: Option<Arc<Closure>>) -> Result<Option<Arc<Closure>>> {
        self.object_operand(|v| v.as_function().and_then(Function::as_closure))
            .map(Some)
            .or_default(self, "closure", default)
    }

    /// Returns the userdata, or `default` when absent.
    ///
    /// # Errors
    ///
    /// Type error when the value is present and not userdata.
    pub fn opt_userdata(&self, default: Option<UserData>) -> Result<Option<UserData>> {
        self.object_operand(Value::as_userdata)
            .map(Some)
            .or_default(self, "userdata", default)
    }

    /// Returns the userdata assignable to `class`, or `default` when absent.
    ///
    /// # Errors
    ///
    /// Type error naming the class when the value is present and not
    /// userdata assignable to `class`.
    pub fn opt_userdata_class(
        &self,
        class: &TypeTag,
        default: Option<UserData>,
    ) -> Result<Option<UserData>> {
        if self.is_nil() {
            return Ok(default);
        }
        self.check_userdata_class(class).map(Some)
    }

    /// Returns the payload as a `T`, or `default` when absent.
    ///
    /// # Errors
    ///
    /// Type error when the value is present and not userdata holding a `T`.
    pub fn opt_userdata_of<T: Any + Send + Sync>(
        &self,
        default: Option<Arc<T>>,
    ) -> Result<Option<Arc<T>>> {
        if self.is_nil() {
            return Ok(default);
        }
        self.check_userdata_of::<T>().map(Some)
    }

    /// Returns the value itself, or `default` when `nil`.
    #[must_use]
    pub fn opt_value(&self, default: Value) -> Value {
        if self.is_nil() {
            default
        } else {
            self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{value::NativeFunction, ErrorKind, Varargs};

    #[test]
    fn test_absent_yields_default() -> Result<()> {
        assert!(Value::Nil.opt_boolean(true)?);
        assert_eq!(Value::Nil.opt_byte(9)?, 9);
        assert_eq!(Value::Nil.opt_char('z')?, 'z');
        assert_eq!(Value::Nil.opt_short(-2)?, -2);
        assert_eq!(Value::Nil.opt_int(42)?, 42);
        assert_eq!(Value::Nil.opt_long(-1)?, -1);
        assert_eq!(Value::Nil.opt_float(0.5)?, 0.5);
        assert_eq!(Value::Nil.opt_double(1.5)?, 1.5);
        assert_eq!(Value::Nil.opt_text("dflt")?, "dflt");
        assert_eq!(Value::Nil.opt_string(Value::from("d"))?, Value::from("d"));
        assert_eq!(Value::Nil.opt_integer(Value::from(3))?, Value::from(3));
        assert_eq!(Value::Nil.opt_number(Value::from(3.5))?, Value::from(3.5));
        assert!(Value::Nil.opt_table(None)?.is_none());
        assert!(Value::Nil.opt_function(None)?.is_none());
        assert!(Value::Nil.opt_thread(None)?.is_none());
        assert!(Value::Nil.opt_closure(None)?.is_none());
        assert!(Value::Nil.opt_userdata(None)?.is_none());
        assert_eq!(Value::Nil.opt_value(Value::from(1)), Value::from(1));
        Ok(())
    }

    #[test]
    fn test_present_values_convert() -> Result<()> {
        assert!(!Value::from(false).opt_boolean(true)?);
        assert_eq!(Value::from(7).opt_int(0)?, 7);
        assert_eq!(Value::from(7.8).opt_int(0)?, 7);
        assert_eq!(Value::from("0x1F").opt_long(0)?, 31);
        assert_eq!(Value::from(65).opt_char(' ')?, 'A');
        assert_eq!(Value::from("2.5").opt_double(0.0)?, 2.5);
        assert_eq!(Value::from(4).opt_text("")?, "4");
        assert_eq!(Value::from(4.0).opt_string(Value::Nil)?, Value::from("4.0"));
        assert_eq!(Value::from("4").opt_integer(Value::Nil)?, Value::Int(4));
        assert_eq!(Value::from("4.5").opt_number(Value::Nil)?, Value::Float(4.5));
        assert_eq!(Value::from(false).opt_value(Value::from(1)), Value::from(false));
        Ok(())
    }

    #[test]
    fn test_malformed_numeral_yields_default() -> Result<()> {
        assert_eq!(Value::from("many").opt_int(5)?, 5);
        assert_eq!(Value::from("").opt_double(2.0)?, 2.0);
        assert_eq!(Value::from("x1").opt_number(Value::from(0))?, Value::from(0));
        Ok(())
    }

    #[test]
    fn test_fractional_numeral_string_fails() {
        let err = Value::from("3.5").opt_int(0).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NoIntegerRepresentation);
        assert!(err.is_type_error());

        let err = Value::from("3.5").opt_integer(Value::Nil).unwrap_err();
        assert_eq!(err.message(), "number has no integer representation");
    }

    #[test]
    fn test_float_without_integer_representation_fails() {
        let err = Value::from(1e300).opt_long(0).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NoIntegerRepresentation);

        let err = Value::from(f64::NAN).opt_int(7).unwrap_err();
        assert_eq!(err.message(), "number has no integer representation");

        assert!(Value::from(f64::NEG_INFINITY).opt_integer(Value::Nil).is_err());
    }

    #[test]
    fn test_wrong_type_fails() {
        let table = Value::from(Table::new());

        let err = table.opt_int(0).unwrap_err();
        assert_eq!(err.message(), "number expected, got table");

        let err = Value::from(1).opt_boolean(false).unwrap_err();
        assert_eq!(err.message(), "boolean expected, got number");

        let err = Value::from(true).opt_text("").unwrap_err();
        assert_eq!(err.message(), "string expected, got boolean");

        let err = Value::from(1).opt_table(None).unwrap_err();
        assert_eq!(err.message(), "table expected, got number");

        let native = Value::from(NativeFunction::new("f", |_: &Varargs| Ok(Varargs::empty())));
        let err = native.opt_closure(None).unwrap_err();
        assert_eq!(err.message(), "closure expected, got function");
    }

    #[test]
    fn test_userdata_filters() {
        struct Handle;
        let tag = TypeTag::of::<Handle>();
        let value = Value::from(UserData::new(Handle));

        assert!(value.opt_userdata_class(&tag, None).unwrap().is_some());
        assert!(value.opt_userdata_of::<Handle>(None).unwrap().is_some());
        assert!(Value::Nil.opt_userdata_class(&tag, None).unwrap().is_none());

        let err = value.opt_userdata_of::<String>(None).unwrap_err();
        assert!(err.is_type_error());
    }
}
