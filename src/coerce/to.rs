//! Best-effort conversions. None of these fail.

use std::{any::Any, sync::Arc};

use crate::value::{Closure, Function, Table, Thread, TypeTag, UserData, Value};

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
impl Value {
    /// Returns the truthiness of the value: everything except `nil` and
    /// `false` is true.
    #[must_use]
    pub fn to_boolean(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }

    /// Converts to a byte, wrapping like `as`; 0 when not numeric.
    #[must_use]
    pub fn to_byte(&self) -> u8 {
        self.to_long() as u8
    }

    /// Converts to the character with the numeric value as code point; `'\0'`
    /// when not numeric or not a valid code point.
    #[must_use]
    pub fn to_char(&self) -> char {
        u32::try_from(self.to_long())
            .ok()
            .and_then(char::from_u32)
            .unwrap_or('\0')
    }

    /// Converts to an `i16`, wrapping like `as`; 0 when not numeric.
    #[must_use]
    pub fn to_short(&self) -> i16 {
        self.to_long() as i16
    }

    /// Converts to an `i32`, wrapping like `as`; 0 when not numeric.
    #[must_use]
    pub fn to_int(&self) -> i32 {
        self.to_long() as i32
    }

    /// Converts to an `i64`, truncating fractions; 0 when not numeric.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use luavalue::Value;
    ///
    /// assert_eq!(Value::from(7.9).to_long(), 7);
    /// assert_eq!(Value::from("-3.5").to_long(), -3);
    /// assert_eq!(Value::from("0x10").to_long(), 16);
    /// assert_eq!(Value::from("ten").to_long(), 0);
    /// assert_eq!(Value::Nil.to_long(), 0);
    /// ```
    #[must_use]
    pub fn to_long(&self) -> i64 {
        self.integer_operand().or_zero(0)
    }

    /// Converts to an `f32`; 0 when not numeric.
    #[must_use]
    pub fn to_float(&self) -> f32 {
        self.to_double() as f32
    }

    /// Converts to an `f64`; 0 when not numeric.
    #[must_use]
    pub fn to_double(&self) -> f64 {
        self.float_operand().or_zero(0.0)
    }

    /// Renders any value as text.
    ///
    /// Numbers use the canonical number format, shared objects render as
    /// `type: address`.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Returns the numeric value of numbers and numeral strings, `nil`
    /// otherwise.
    #[must_use]
    pub fn to_number(&self) -> Value {
        self.as_number().map_or(Value::Nil, Value::from)
    }

    /// Returns strings unchanged and numbers as their text, `nil` otherwise.
    #[must_use]
    pub fn to_value_string(&self) -> Value {
        match self {
            Value::Str(_) => self.clone(),
            Value::Int(_) | Value::Float(_) => Value::from(self.to_string()),
            _ => Value::Nil,
        }
    }

    /// Returns the table handle, if this is a table.
    #[must_use]
    pub fn to_table(&self) -> Option<Table> {
        self.as_table().cloned()
    }

    /// Returns the coroutine handle, if this is a thread.
    #[must_use]
    pub fn to_thread(&self) -> Option<Thread> {
        self.as_thread().cloned()
    }

    /// Returns the function handle, if this is a function.
    #[must_use]
    pub fn to_function(&self) -> Option<Function> {
        self.as_function().cloned()
    }

    /// Returns the closure, if this is a script closure.
    #[must_use]
    pub fn to_closure(&self) -> Option<Arc<Closure>> {
        self.as_function().and_then(Function::as_closure).cloned()
    }

    /// Returns the userdata handle, if this is userdata.
    #[must_use]
    pub fn to_userdata(&self) -> Option<UserData> {
        self.as_userdata().cloned()
    }

    /// Returns the userdata handle when it is assignable to `class`.
    #[must_use]
    pub fn to_userdata_class(&self, class: &TypeTag) -> Option<UserData> {
        self.as_userdata()
            .filter(|data| data.is_instance_of(class))
            .cloned()
    }

    /// Returns the payload when this is userdata holding exactly a `T`.
    #[must_use]
    pub fn to_userdata_of<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.as_userdata().and_then(UserData::downcast::<T>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::NativeFunction;
    use crate::Varargs;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.to_boolean());
        assert!(!Value::from(false).to_boolean());
        assert!(Value::from(true).to_boolean());
        assert!(Value::from(0).to_boolean());
        assert!(Value::from("").to_boolean());
        assert!(Value::from(Table::new()).to_boolean());
    }

    #[test]
    fn test_integer_family() {
        assert_eq!(Value::from(3.9).to_int(), 3);
        assert_eq!(Value::from(-3.9).to_int(), -3);
        assert_eq!(Value::from("3.5").to_int(), 3);
        assert_eq!(Value::from(" 12 ").to_short(), 12);
        assert_eq!(Value::from(300).to_byte(), 44);
        assert_eq!(Value::from(70_000).to_short(), 4_464);
        assert_eq!(Value::from(i64::from(i32::MAX) + 1).to_int(), i32::MIN);
        assert_eq!(Value::from(1e300).to_long(), i64::MAX);
        assert_eq!(Value::from(true).to_int(), 0);
        assert_eq!(Value::from("abc").to_long(), 0);
    }

    #[test]
    fn test_char() {
        assert_eq!(Value::from(65).to_char(), 'A');
        assert_eq!(Value::from("0x263A").to_char(), '\u{263A}');
        assert_eq!(Value::from(0xD800).to_char(), '\0');
        assert_eq!(Value::from(-1).to_char(), '\0');
        assert_eq!(Value::Nil.to_char(), '\0');
    }

    #[test]
    fn test_float_family() {
        assert_eq!(Value::from(2.5).to_double(), 2.5);
        assert_eq!(Value::from(2).to_double(), 2.0);
        assert_eq!(Value::from("1e3").to_double(), 1000.0);
        assert_eq!(Value::from("0x8").to_float(), 8.0);
        assert_eq!(Value::from(Table::new()).to_double(), 0.0);
    }

    #[test]
    fn test_text_renders_everything() {
        assert_eq!(Value::Nil.to_text(), "nil");
        assert_eq!(Value::from(false).to_text(), "false");
        assert_eq!(Value::from(10).to_text(), "10");
        assert_eq!(Value::from(1e100).to_text(), "1e+100");
        assert!(Value::from(Table::new()).to_text().starts_with("table: "));
    }

    #[test]
    fn test_number_and_string_views() {
        assert_eq!(Value::from(" 5 ").to_number(), Value::Int(5));
        assert_eq!(Value::from("5.5").to_number(), Value::Float(5.5));
        assert!(Value::from("five").to_number().is_nil());
        assert!(Value::from(true).to_number().is_nil());

        assert_eq!(Value::from(5).to_value_string(), Value::from("5"));
        assert_eq!(Value::from("s").to_value_string(), Value::from("s"));
        assert!(Value::from(Table::new()).to_value_string().is_nil());
    }

    #[test]
    fn test_objects() {
        let table = Table::new();
        assert!(Value::from(table.clone()).to_table().is_some_and(|t| t.ptr_eq(&table)));
        assert!(Value::from(1).to_table().is_none());

        let native = NativeFunction::new("f", |_: &Varargs| Ok(Varargs::empty()));
        let f = Value::from(native);
        assert!(f.to_function().is_some());
        assert!(f.to_closure().is_none());
        assert!(Value::Nil.to_thread().is_none());
    }

    #[test]
    fn test_userdata() {
        trait Shape {}
        struct Square(u32);

        let value = Value::from(UserData::with_lineage(Square(4), [TypeTag::of::<dyn Shape>()]));
        assert!(value.to_userdata().is_some());
        assert!(value.to_userdata_class(&TypeTag::of::<dyn Shape>()).is_some());
        assert!(value.to_userdata_class(&TypeTag::of::<String>()).is_none());
        assert_eq!(value.to_userdata_of::<Square>().map(|s| s.0), Some(4));
        assert!(value.to_userdata_of::<String>().is_none());
        assert!(Value::from("x").to_userdata().is_none());
    }
}
