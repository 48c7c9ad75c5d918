//! The runtime value type and its type predicates.
//!
//! [`Value`] is the closed set of everything a script can hold. Scalars are
//! stored inline and compared by content; tables, functions, userdata and
//! coroutines are shared handles compared by identity.
//!
//! The predicates in this module are total: they answer for every variant and
//! never fail. Numeral strings count as numbers and numbers count as strings,
//! so `is_number` and `is_string` overlap.
//!
//! # Examples
//!
//! ```rust
//! use luavalue::{LuaType, Value};
//!
//! let v = Value::from(" 0x10 ");
//! assert_eq!(v.lua_type(), LuaType::String);
//! assert!(v.is_number());
//! assert!(v.is_int());
//! assert!(!v.is_int_type());
//!
//! assert!(Value::from(3.0).is_long());
//! assert!(!Value::from(3.5).is_long());
//! assert!(!Value::Nil.is_valid_key());
//! ```

use std::{any::Any, fmt, sync::Arc};

use crate::{
    value::{
        constants::metamethod,
        number::{float_to_exact_integer, format_float, parse_numeral, Number},
        Function, LuaType, NativeFunction, Table, Thread, TypeTag, UserData,
    },
    ErrorKind, Result, Varargs, FALSE, TRUE,
};

/// A runtime value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// The absent value.
    #[default]
    Nil,
    /// `true` or `false`.
    Boolean(bool),
    /// A 64-bit integer number.
    Int(i64),
    /// A 64-bit float number.
    Float(f64),
    /// Immutable text.
    Str(Arc<str>),
    /// A shared table.
    Table(Table),
    /// A host function or script closure.
    Function(Function),
    /// A host payload.
    UserData(UserData),
    /// A coroutine.
    Thread(Thread),
}

impl Value {
    /// Returns the runtime type.
    #[must_use]
    pub fn lua_type(&self) -> LuaType {
        match self {
            Value::Nil => LuaType::Nil,
            Value::Boolean(_) => LuaType::Boolean,
            Value::Int(_) | Value::Float(_) => LuaType::Number,
            Value::Str(_) => LuaType::String,
            Value::Table(_) => LuaType::Table,
            Value::Function(_) => LuaType::Function,
            Value::UserData(_) => LuaType::UserData,
            Value::Thread(_) => LuaType::Thread,
        }
    }

    /// Returns the lowercase type name, as the language's `type()` reports it.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.lua_type().name()
    }

    /// Returns `true` for `nil`.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns `true` for `true` and `false`.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    /// Returns `true` for numbers and numeral strings.
    #[must_use]
    pub fn is_number(&self) -> bool {
        self.as_number().is_some()
    }

    /// Returns `true` for strings and numbers.
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Value::Str(_) | Value::Int(_) | Value::Float(_))
    }

    /// Returns `true` when the value converts to an `i32` without rounding.
    #[must_use]
    pub fn is_int(&self) -> bool {
        self.exact_integer()
            .is_some_and(|i| i32::try_from(i).is_ok())
    }

    /// Returns `true` when the value is stored as an integer.
    ///
    /// Unlike [`Value::is_int`] this does not accept integral floats or
    /// numeral strings.
    #[must_use]
    pub fn is_int_type(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    /// Returns `true` when the value converts to an `i64` without rounding.
    #[must_use]
    pub fn is_long(&self) -> bool {
        self.exact_integer().is_some()
    }

    /// Returns `true` for tables.
    #[must_use]
    pub fn is_table(&self) -> bool {
        matches!(self, Value::Table(_))
    }

    /// Returns `true` for host functions and closures.
    #[must_use]
    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Returns `true` for script closures only.
    #[must_use]
    pub fn is_closure(&self) -> bool {
        matches!(self, Value::Function(f) if f.is_closure())
    }

    /// Returns `true` for coroutines.
    #[must_use]
    pub fn is_thread(&self) -> bool {
        matches!(self, Value::Thread(_))
    }

    /// Returns `true` for userdata of any type.
    #[must_use]
    pub fn is_userdata(&self) -> bool {
        matches!(self, Value::UserData(_))
    }

    /// Returns `true` for userdata whose payload is exactly a `T`.
    #[must_use]
    pub fn is_userdata_of<T: Any>(&self) -> bool {
        matches!(self, Value::UserData(u) if u.is::<T>())
    }

    /// Returns `true` for userdata assignable to `class`.
    #[must_use]
    pub fn is_userdata_class(&self, class: &TypeTag) -> bool {
        matches!(self, Value::UserData(u) if u.is_instance_of(class))
    }

    /// Returns `true` when the value can be used as a table key.
    #[must_use]
    pub fn is_valid_key(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Float(f) => !f.is_nan(),
            _ => true,
        }
    }

    /// Returns the numeric value of numbers and numeral strings.
    #[must_use]
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Int(i) => Some(Number::Int(*i)),
            Value::Float(f) => Some(Number::Float(*f)),
            Value::Str(s) => parse_numeral(s),
            _ => None,
        }
    }

    fn exact_integer(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) => float_to_exact_integer(*f),
            Value::Str(s) => parse_numeral(s).and_then(Number::exact_integer),
            _ => None,
        }
    }

    /// Returns the text of a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the table handle of a table value.
    #[must_use]
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the function handle of a function value.
    #[must_use]
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Returns the userdata handle of a userdata value.
    #[must_use]
    pub fn as_userdata(&self) -> Option<&UserData> {
        match self {
            Value::UserData(u) => Some(u),
            _ => None,
        }
    }

    /// Returns the coroutine handle of a thread value.
    #[must_use]
    pub fn as_thread(&self) -> Option<&Thread> {
        match self {
            Value::Thread(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the metatable of tables and userdata.
    #[must_use]
    pub fn metatable(&self) -> Option<Table> {
        match self {
            Value::Table(t) => t.metatable(),
            Value::UserData(u) => u.metatable(),
            _ => None,
        }
    }

    /// Looks up the handler for `event` in the metatable.
    #[must_use]
    pub fn metamethod(&self, event: &str) -> Option<Value> {
        self.metatable()
            .map(|meta| meta.get_field(event))
            .filter(|handler| !handler.is_nil())
    }

    /// Primitive equality, without metamethods.
    ///
    /// Numbers compare by mathematical value across integer and float,
    /// strings by content, and shared objects by identity.
    #[must_use]
    pub fn raw_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(i), Value::Float(f)) | (Value::Float(f), Value::Int(i)) => {
                float_to_exact_integer(*f) == Some(*i)
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::UserData(a), Value::UserData(b)) => a.ptr_eq(b),
            (Value::Thread(a), Value::Thread(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Calls the value, possibly returning a deferred tail call.
    ///
    /// Tables and userdata are callable through a `__call` function in their
    /// metatable, which receives the value itself as first argument.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::NotCallable`] when the value is not callable, and
    /// whatever the called function raises.
    pub fn invoke(&self, args: &Varargs) -> Result<Varargs> {
        match self {
            Value::Function(f) => f.invoke(args),
            _ => match self.metamethod(metamethod::CALL) {
                Some(Value::Function(handler)) => {
                    handler.invoke(&Varargs::prepend(self.clone(), args.clone()))
                }
                _ => Err(ErrorKind::NotCallable(self.type_name()).into()),
            },
        }
    }

    /// Calls the value and resolves any tail call it returns.
    ///
    /// # Errors
    ///
    /// See [`Value::invoke`].
    pub fn call(&self, args: &Varargs) -> Result<Varargs> {
        self.invoke(args)?.eval()
    }

    /// Calls the value in protected mode.
    ///
    /// Returns `true` followed by the results on success, or `false` and the
    /// error message when the call raised.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use luavalue::{Value, Varargs, FALSE};
    ///
    /// let status = Value::from(42).pcall(&Varargs::empty());
    /// assert_eq!(status.arg1(), FALSE);
    /// assert_eq!(status.arg(2), Value::from("attempt to call a number value"));
    /// ```
    #[must_use]
    pub fn pcall(&self, args: &Varargs) -> Varargs {
        match self.call(args) {
            Ok(results) => Varargs::prepend(TRUE, results),
            Err(err) => {
                log::debug!("protected call caught: {err}");
                Varargs::pair(FALSE, Value::from(err.message()))
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.raw_equals(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{}", format_float(*v)),
            Value::Str(s) => write!(f, "{s}"),
            Value::Table(t) => write!(f, "table: {:#016x}", t.id()),
            Value::Function(func) => write!(f, "function: {:#016x}", func.id()),
            Value::UserData(u) => write!(f, "userdata: {:#016x}", u.id()),
            Value::Thread(t) => write!(f, "thread: {:#016x}", t.id()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        match value {
            Number::Int(i) => Value::Int(i),
            Number::Float(f) => Value::Float(f),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(Arc::from(value))
    }
}

impl From<Arc<str>> for Value {
    fn from(value: Arc<str>) -> Self {
        Value::Str(value)
    }
}

impl From<Table> for Value {
    fn from(value: Table) -> Self {
        Value::Table(value)
    }
}

impl From<Function> for Value {
    fn from(value: Function) -> Self {
        Value::Function(value)
    }
}

impl From<NativeFunction> for Value {
    fn from(value: NativeFunction) -> Self {
        Value::Function(Function::from(value))
    }
}

impl From<UserData> for Value {
    fn from(value: UserData) -> Self {
        Value::UserData(value)
    }
}

impl From<Thread> for Value {
    fn from(value: Thread) -> Self {
        Value::Thread(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Into::into)
    }
}
