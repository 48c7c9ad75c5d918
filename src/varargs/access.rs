//! Positional accessors over argument lists.
//!
//! Each accessor applies the matching [`Value`] accessor to argument `i`
//! (1-based). A position past the end reads as `nil`, so the absent rules of
//! the value accessors apply to it. Failures are re-raised as argument errors
//! carrying `i`, and a missing argument is reported as `got no value`.
//!
//! The fallible accessors resolve a deferred call before reading it and
//! return the call's own error when it raised.

use std::{any::Any, sync::Arc};

use super::Varargs;
use crate::{
    arg_error_at,
    value::{Closure, Function, LuaType, Table, Thread, TypeTag, UserData, Value},
    Result,
};

macro_rules! positional_predicates {
    ($($name:ident),* $(,)?) => {
        $(
            #[doc = concat!("Applies [`Value::", stringify!($name), "`] to argument `i`.")]
            #[must_use]
            pub fn $name(&self, i: usize) -> bool {
                self.arg(i).$name()
            }
        )*
    };
}

macro_rules! positional_conversions {
    ($($name:ident -> $ret:ty),* $(,)?) => {
        $(
            #[doc = concat!("Applies [`Value::", stringify!($name), "`] to argument `i`.")]
            #[must_use]
            pub fn $name(&self, i: usize) -> $ret {
                self.arg(i).$name()
            }
        )*
    };
}

macro_rules! positional_defaults {
    ($($name:ident($default:ty) -> $ret:ty),* $(,)?) => {
        $(
            #[doc = concat!("Applies [`Value::", stringify!($name), "`] to argument `i`.")]
            ///
            /// # Errors
            ///
            /// An argument error for position `i` when the argument is present
            /// but not convertible.
            pub fn $name(&self, i: usize, default: $default) -> Result<$ret> {
                self.at(i, |value| value.$name(default))
            }
        )*
    };
}

macro_rules! positional_checks {
    ($($name:ident -> $ret:ty),* $(,)?) => {
        $(
            #[doc = concat!("Applies [`Value::", stringify!($name), "`] to argument `i`.")]
            ///
            /// # Errors
            ///
            /// An argument error for position `i` when the argument is absent or
            /// not convertible.
            pub fn $name(&self, i: usize) -> Result<$ret> {
                self.at(i, |value| value.$name())
            }
        )*
    };
}

impl Varargs {
    /// Runs `accessor` on argument `i`, turning its failure into an argument
    /// error at position `i`.
    ///
    /// A deferred call is resolved first; if it raised, that error is returned
    /// as is.
    fn at<T>(&self, i: usize, accessor: impl FnOnce(&Value) -> Result<T>) -> Result<T> {
        let args = self.eval()?;
        let missing = !args.is_value(i);
        accessor(&args.arg(i)).map_err(|err| err.at_argument(i, missing))
    }

    /// Returns the runtime type of argument `i`; `nil` when out of range.
    #[must_use]
    pub fn lua_type(&self, i: usize) -> LuaType {
        self.arg(i).lua_type()
    }

    /// Returns the type name of argument `i`, or `no value` when out of range.
    #[must_use]
    pub fn type_name(&self, i: usize) -> &'static str {
        if self.is_value(i) {
            self.arg(i).type_name()
        } else {
            "no value"
        }
    }

    /// Returns `true` when position `i` exists, even if it holds `nil`.
    #[must_use]
    pub fn is_value(&self, i: usize) -> bool {
        (1..=self.narg()).contains(&i)
    }

    /// Returns `true` when position `i` is out of range or holds `nil`.
    #[must_use]
    pub fn is_none_or_nil(&self, i: usize) -> bool {
        self.arg(i).is_nil()
    }

    positional_predicates!(
        is_nil,
        is_boolean,
        is_number,
        is_string,
        is_int,
        is_int_type,
        is_long,
        is_table,
        is_function,
        is_closure,
        is_thread,
        is_userdata,
        is_valid_key,
    );

    /// Returns `true` when argument `i` is userdata holding exactly a `T`.
    #[must_use]
    pub fn is_userdata_of<T: Any>(&self, i: usize) -> bool {
        self.arg(i).is_userdata_of::<T>()
    }

    /// Returns `true` when argument `i` is userdata assignable to `class`.
    #[must_use]
    pub fn is_userdata_class(&self, i: usize, class: &TypeTag) -> bool {
        self.arg(i).is_userdata_class(class)
    }

    positional_conversions!(
        to_boolean -> bool,
        to_byte -> u8,
        to_char -> char,
        to_short -> i16,
        to_int -> i32,
        to_long -> i64,
        to_float -> f32,
        to_double -> f64,
        to_text -> String,
        to_number -> Value,
        to_value_string -> Value,
        to_table -> Option<Table>,
        to_thread -> Option<Thread>,
        to_function -> Option<Function>,
        to_closure -> Option<Arc<Closure>>,
        to_userdata -> Option<UserData>,
    );

    /// Returns argument `i` as userdata assignable to `class`, if it is one.
    #[must_use]
    pub fn to_userdata_class(&self, i: usize, class: &TypeTag) -> Option<UserData> {
        self.arg(i).to_userdata_class(class)
    }

    /// Returns the payload of argument `i` when it is exactly a `T`.
    #[must_use]
    pub fn to_userdata_of<T: Any + Send + Sync>(&self, i: usize) -> Option<Arc<T>> {
        self.arg(i).to_userdata_of::<T>()
    }

    positional_defaults!(
        opt_boolean(bool) -> bool,
        opt_byte(u8) -> u8,
        opt_char(char) -> char,
        opt_short(i16) -> i16,
        opt_int(i32) -> i32,
        opt_long(i64) -> i64,
        opt_float(f32) -> f32,
        opt_double(f64) -> f64,
        opt_integer(Value) -> Value,
        opt_number(Value) -> Value,
        opt_text(&str) -> String,
        opt_string(Value) -> Value,
        opt_table(Option<Table>) -> Option<Table>,
        opt_thread(Option<Thread>) -> Option<Thread>,
        opt_function(Option<Function>) -> Option<Function>,
        opt_closure(Option<Arc<Closure>>) -> Option<Arc<Closure>>,
        opt_userdata(Option<UserData>) -> Option<UserData>,
    );

    /// Returns argument `i` as userdata assignable to `class`, or `default`
    /// when absent.
    ///
    /// # Errors
    ///
    /// An argument error for position `i` when the argument is present but
    /// not assignable to `class`.
    pub fn opt_userdata_class(
        &self,
        i: usize,
        class: &TypeTag,
        default: Option<UserData>,
    ) -> Result<Option<UserData>> {
        self.at(i, |value| value.opt_userdata_class(class, default))
    }

    /// Returns the payload of argument `i` as a `T`, or `default` when absent.
    ///
    /// # Errors
    ///
    /// An argument error for position `i` when the argument is present but
    /// not userdata holding a `T`.
    pub fn opt_userdata_of<T: Any + Send + Sync>(
        &self,
        i: usize,
        default: Option<Arc<T>>,
    ) -> Result<Option<Arc<T>>> {
        self.at(i, |value| value.opt_userdata_of::<T>(default))
    }

    /// Returns argument `i`, or `default` when it is absent.
    #[must_use]
    pub fn opt_value(&self, i: usize, default: Value) -> Value {
        self.arg(i).opt_value(default)
    }

    positional_checks!(
        check_boolean -> bool,
        check_byte -> u8,
        check_char -> char,
        check_short -> i16,
        check_int -> i32,
        check_long -> i64,
        check_float -> f32,
        check_double -> f64,
        check_integer -> Value,
        check_number -> Value,
        check_text -> String,
        check_string -> Value,
        check_table -> Table,
        check_thread -> Thread,
        check_function -> Function,
        check_closure -> Arc<Closure>,
        check_userdata -> UserData,
    );

    /// Returns argument `i` as a number, failing with `msg` otherwise.
    ///
    /// # Errors
    ///
    /// An argument error for position `i` carrying `msg`.
    pub fn check_number_msg(&self, i: usize, msg: &str) -> Result<Value> {
        self.at(i, |value| value.check_number_msg(msg))
    }

    /// Returns argument `i` when it is userdata assignable to `class`.
    ///
    /// # Errors
    ///
    /// An argument error for position `i` otherwise.
    pub fn check_userdata_class(&self, i: usize, class: &TypeTag) -> Result<UserData> {
        self.at(i, |value| value.check_userdata_class(class))
    }

    /// Returns the payload of argument `i` when it is exactly a `T`.
    ///
    /// # Errors
    ///
    /// An argument error for position `i` otherwise.
    pub fn check_userdata_of<T: Any + Send + Sync>(&self, i: usize) -> Result<Arc<T>> {
        self.at(i, |value| value.check_userdata_of::<T>())
    }

    /// Returns argument `i`, which may be `nil` but must exist.
    ///
    /// # Errors
    ///
    /// `bad argument #i: value expected` when position `i` is out of range.
    pub fn check_value(&self, i: usize) -> Result<Value> {
        let args = self.eval()?;
        if args.is_value(i) {
            Ok(args.arg(i))
        } else {
            Err(arg_error_at(i, "value expected"))
        }
    }

    /// Returns argument `i` unless it is absent.
    ///
    /// # Errors
    ///
    /// An argument error for position `i` when it is out of range or `nil`.
    pub fn check_not_nil(&self, i: usize) -> Result<Value> {
        self.at(i, |value| value.check_not_nil().cloned())
    }

    /// Raises an argument error for position `i` with `msg` unless `test`
    /// holds.
    ///
    /// # Errors
    ///
    /// `bad argument #i: msg` when `test` is false.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use luavalue::{Value, Varargs};
    ///
    /// let args = Varargs::of([Value::from(-4)]);
    /// let n = args.check_int(1)?;
    ///
    /// let err = args.arg_check(n >= 0, 1, "must be non-negative").unwrap_err();
    /// assert_eq!(err.message(), "bad argument #1: must be non-negative");
    /// assert!(args.arg_check(true, 1, "unused").is_ok());
    /// # Ok::<(), luavalue::Error>(())
    /// ```
    pub fn arg_check(&self, test: bool, i: usize, msg: &str) -> Result<()> {
        if test {
            Ok(())
        } else {
            Err(arg_error_at(i, msg))
        }
    }
}
