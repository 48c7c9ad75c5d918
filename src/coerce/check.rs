//! Strict conversions for required arguments.
//!
//! Absence is a failure just like a wrong type. A string that is not a
//! numeral fails with its own message naming the string.

use std::{any::Any, sync::Arc};

use crate::{
    value::{Closure, Function, Table, Thread, TypeTag, UserData, Value},
    Error, ErrorKind, Result,
};

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
impl Value {
    /// Returns the boolean.
    ///
    /// # Errors
    ///
    /// Type error unless the value is a boolean.
    pub fn check_boolean(&self) -> Result<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            _ => Err(type_error!("boolean", self)),
        }
    }

    /// Returns the value as a byte, wrapping like `as`.
    ///
    /// # Errors
    ///
    /// See [`Value::check_long`].
    pub fn check_byte(&self) -> Result<u8> {
        self.check_long().map(|v| v as u8)
    }

    /// Returns the value as a character; `'\0'` for invalid code points.
    ///
    /// # Errors
    ///
    /// See [`Value::check_long`].
    pub fn check_char(&self) -> Result<char> {
        Ok(u32::try_from(self.check_long()?)
            .ok()
            .and_then(char::from_u32)
            .unwrap_or('\0'))
    }

    /// Returns the value as an `i16`, wrapping like `as`.
    ///
    /// # Errors
    ///
    /// See [`Value::check_long`].
    pub fn check_short(&self) -> Result<i16> {
        self.check_long().map(|v| v as i16)
    }

    /// Returns the value as an `i32`, wrapping like `as`.
    ///
    /// # Errors
    ///
    /// See [`Value::check_long`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use luavalue::Value;
    ///
    /// assert_eq!(Value::from("3.0").check_int()?, 3);
    /// assert_eq!(Value::from(3.5).check_int()?, 3);
    ///
    /// let err = Value::from("3.5").check_int().unwrap_err();
    /// assert!(err.is_type_error());
    /// assert_eq!(err.message(), "number has no integer representation");
    /// # Ok::<(), luavalue::Error>(())
    /// ```
    pub fn check_int(&self) -> Result<i32> {
        self.check_long().map(|v| v as i32)
    }

    /// Returns the value as an `i64`; floats truncate toward zero.
    ///
    /// # Errors
    ///
    /// Type error when the value is not numeric or absent, a malformed number
    /// error for a string that is not a numeral, and "number has no integer
    /// representation" for a fractional numeral string.
    pub fn check_long(&self) -> Result<i64> {
        self.integer_operand().required(self, "number")
    }

    /// Returns the value as an `f32`.
    ///
    /// # Errors
    ///
    /// See [`Value::check_double`].
    pub fn check_float(&self) -> Result<f32> {
        self.check_double().map(|v| v as f32)
    }

    /// Returns the value as an `f64`.
    ///
    /// # Errors
    ///
    /// Type error when the value is not numeric or absent, and a malformed
    /// number error for a string that is not a numeral.
    pub fn check_double(&self) -> Result<f64> {
        self.float_operand().required(self, "number")
    }

    /// Returns the value as an integer value.
    ///
    /// # Errors
    ///
    /// See [`Value::check_long`].
    pub fn check_integer(&self) -> Result<Value> {
        self.check_long().map(Value::Int)
    }

    /// Returns the value as a number value; numeral strings are converted.
    ///
    /// # Errors
    ///
    /// See [`Value::check_double`].
    pub fn check_number(&self) -> Result<Value> {
        self.number_operand()
            .required(self, "number")
            .map(Value::from)
    }

    /// Returns the value as a number value, failing with `msg` otherwise.
    ///
    /// # Errors
    ///
    /// A runtime error carrying `msg` when the value is not numeric.
    pub fn check_number_msg(&self, msg: &str) -> Result<Value> {
        match self.as_number() {
            Some(number) => Ok(Value::from(number)),
            None => Err(runtime_error!(msg)),
        }
    }

    /// Returns the value as text; numbers render canonically.
    ///
    /// # Errors
    ///
    /// Type error unless the value is a string or a number.
    pub fn check_text(&self) -> Result<String> {
        self.text_operand().required(self, "string")
    }

    /// Returns the value as a string value; numbers are converted.
    ///
    /// # Errors
    ///
    /// Type error unless the value is a string or a number.
    pub fn check_string(&self) -> Result<Value> {
        match self {
            Value::Str(_) => Ok(self.clone()),
            Value::Int(_) | Value::Float(_) => Ok(Value::from(self.to_string())),
            _ => Err(type_error!("string", self)),
        }
    }

    /// Returns the table handle.
    ///
    /// # Errors
    ///
    /// Type error unless the value is a table.
    pub fn check_table(&self) -> Result<Table> {
        self.object_operand(Value::as_table).required(self, "table")
    }

    /// Returns the coroutine handle.
    ///
    /// # Errors
    ///
    /// Type error unless the value is a thread.
    pub fn check_thread(&self) -> Result<Thread> {
        self.object_operand(Value::as_thread).required(self, "thread")
    }

    /// Returns the function handle.
    ///
    /// # Errors
    ///
    /// Type error unless the value is a function.
    pub fn check_function(&self) -> Result<Function> {
        self.object_operand(Value::as_function)
            .required(self, "function")
    }

    /// Returns the script closure.
    ///
    /// # Errors
    ///
    /// Type error unless the value is a script closure.
    pub fn check_closure(&self) -> Result<Arc<Closure>> {
        self.object_operand(|v| v.as_function().and_then(Function::as_closure))
            .required(self, "closure")
    }

    /// Returns the userdata handle.
    ///
    /// # Errors
    ///
    /// Type error unless the value is userdata.
    pub fn check_userdata(&self) -> Result<UserData> {
        self.object_operand(Value::as_userdata)
            .required(self, "userdata")
    }

    /// Returns the userdata handle when it is assignable to `class`.
    ///
    /// # Errors
    ///
    /// Type error naming the class unless the value is userdata assignable to
    /// `class`.
    pub fn check_userdata_class(&self, class: &TypeTag) -> Result<UserData> {
        self.to_userdata_class(class)
            .ok_or_else(|| type_error!(class.short_name(), self))
    }

    /// Returns the payload when it is exactly a `T`.
    ///
    /// # Errors
    ///
    /// Type error naming `T` unless the value is userdata holding a `T`.
    pub fn check_userdata_of<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        self.to_userdata_of::<T>()
            .ok_or_else(|| type_error!(TypeTag::of::<T>().short_name(), self))
    }

    /// Returns the value itself unless it is `nil`.
    ///
    /// # Errors
    ///
    /// "value expected" type error for `nil`.
    pub fn check_not_nil(&self) -> Result<&Value> {
        if self.is_nil() {
            Err(type_error!("value", self))
        } else {
            Ok(self)
        }
    }

    /// Builds the argument error for a value of the wrong type.
    ///
    /// The message reads `bad argument: <expected> expected, got <type>`.
    /// Positional checks through [`crate::Varargs`] report the argument
    /// index instead.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use luavalue::Value;
    ///
    /// let err = Value::from(true).arg_error("table");
    /// assert_eq!(err.message(), "bad argument: table expected, got boolean");
    /// ```
    #[must_use]
    pub fn arg_error(&self, expected: &str) -> Error {
        Error::from(ErrorKind::Argument {
            index: None,
            detail: Box::new(ErrorKind::Type {
                expected: expected.to_string().into(),
                actual: self.type_name(),
            }),
        })
    }
}
