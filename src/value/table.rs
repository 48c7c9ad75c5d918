//! Shared, mutable key/value tables.
//!
//! A [`Table`] is a reference-identity handle: cloning it yields another
//! holder of the same table, and every mutation is observed by all holders.
//! The storage here is the raw map plus the optional metatable reference;
//! metamethod dispatch on top of it belongs to the metatable engine.

use std::{
    collections::HashMap,
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, RwLock},
};

use crate::{
    value::{number::float_to_exact_integer, Value},
    ErrorKind, Result,
};

/// A value that is valid as a table key.
///
/// Construction rejects `nil` and NaN and normalises floats with an exact
/// integer value to integers, so `t[1]` and `t[1.0]` address the same slot.
/// Equality is the runtime's raw equality.
#[derive(Clone, Debug)]
pub struct TableKey(Value);

impl TableKey {
    /// Wraps `value` as a key.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidKey`] for `nil` and NaN.
    pub fn new(value: Value) -> Result<Self> {
        match value {
            Value::Nil => Err(ErrorKind::InvalidKey("nil").into()),
            Value::Float(f) if f.is_nan() => Err(ErrorKind::InvalidKey("NaN").into()),
            Value::Float(f) => Ok(TableKey(
                float_to_exact_integer(f).map_or(Value::Float(f), Value::Int),
            )),
            other => Ok(TableKey(other)),
        }
    }

    /// Returns the wrapped value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Unwraps the key.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl PartialEq for TableKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.raw_equals(&other.0)
    }
}

impl Eq for TableKey {}

impl Hash for TableKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.0 {
            Value::Nil => 0_u8.hash(state),
            Value::Boolean(b) => (1_u8, b).hash(state),
            Value::Int(i) => (2_u8, i).hash(state),
            Value::Float(f) => (3_u8, f.to_bits()).hash(state),
            Value::Str(s) => (4_u8, s.as_ref()).hash(state),
            Value::Table(t) => (5_u8, t.id()).hash(state),
            Value::Function(f) => (6_u8, f.id()).hash(state),
            Value::UserData(u) => (7_u8, u.id()).hash(state),
            Value::Thread(t) => (8_u8, t.id()).hash(state),
        }
    }
}

#[derive(Default)]
struct TableData {
    entries: HashMap<TableKey, Value>,
    metatable: Option<Table>,
}

/// Handle to a shared table.
///
/// # Examples
///
/// ```rust
/// use luavalue::{Table, Value};
///
/// let table = Table::new();
/// let alias = table.clone();
/// alias.set(Value::from("answer"), Value::from(42))?;
///
/// assert_eq!(table.get(&Value::from("answer")), Value::from(42));
/// assert!(table.ptr_eq(&alias));
/// # Ok::<(), luavalue::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct Table {
    inner: Arc<RwLock<TableData>>,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table holding `values` at keys `1..=n`.
    #[must_use]
    pub fn from_sequence(values: impl IntoIterator<Item = Value>) -> Self {
        let table = Table::new();
        {
            let mut data = write_lock!(table.inner);
            for (index, value) in (1_i64..).zip(values) {
                if !value.is_nil() {
                    data.entries.insert(TableKey(Value::Int(index)), value);
                }
            }
        }
        table
    }

    /// Reads `key` without consulting the metatable.
    ///
    /// Keys that can never be stored (`nil`, NaN) read as `nil`.
    #[must_use]
    pub fn get(&self, key: &Value) -> Value {
        match TableKey::new(key.clone()) {
            Ok(key) => read_lock!(self.inner)
                .entries
                .get(&key)
                .cloned()
                .unwrap_or_default(),
            Err(_) => Value::Nil,
        }
    }

    /// Reads the string key `name` without consulting the metatable.
    #[must_use]
    pub fn get_field(&self, name: &str) -> Value {
        self.get(&Value::from(name))
    }

    /// Reads the integer key `index` without consulting the metatable.
    #[must_use]
    pub fn get_index(&self, index: i64) -> Value {
        read_lock!(self.inner)
            .entries
            .get(&TableKey(Value::Int(index)))
            .cloned()
            .unwrap_or_default()
    }

    /// Writes `value` at `key` without consulting the metatable.
    ///
    /// Assigning `nil` removes the entry.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidKey`] when `key` is `nil` or NaN.
    pub fn set(&self, key: Value, value: Value) -> Result<()> {
        let key = TableKey::new(key)?;
        let mut data = write_lock!(self.inner);
        if value.is_nil() {
            data.entries.remove(&key);
        } else {
            data.entries.insert(key, value);
        }
        Ok(())
    }

    /// Returns a border of the table: an `n` with `t[n] ~= nil` and
    /// `t[n + 1] == nil`, or 0 when `t[1]` is `nil`.
    #[must_use]
    pub fn len(&self) -> usize {
        let data = read_lock!(self.inner);
        let mut border: i64 = 0;
        while data.entries.contains_key(&TableKey(Value::Int(border + 1))) {
            border += 1;
        }
        usize::try_from(border).unwrap_or(usize::MAX)
    }

    /// Returns `true` when the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        read_lock!(self.inner).entries.is_empty()
    }

    /// Returns a snapshot of all key/value pairs in unspecified order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(Value, Value)> {
        read_lock!(self.inner)
            .entries
            .iter()
            .map(|(k, v)| (k.value().clone(), v.clone()))
            .collect()
    }

    /// Returns the metatable, if one is set.
    #[must_use]
    pub fn metatable(&self) -> Option<Table> {
        read_lock!(self.inner).metatable.clone()
    }

    /// Replaces the metatable.
    pub fn set_metatable(&self, metatable: Option<Table>) {
        write_lock!(self.inner).metatable = metatable;
    }

    /// Looks up the metamethod `event` (for example `__call`) in the metatable.
    #[must_use]
    pub fn metamethod(&self, event: &str) -> Option<Value> {
        self.metatable()
            .map(|meta| meta.get_field(event))
            .filter(|handler| !handler.is_nil())
    }

    /// Returns `true` when both handles refer to the same table.
    #[must_use]
    pub fn ptr_eq(&self, other: &Table) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns the identity of this table, stable for its lifetime.
    #[must_use]
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table: {:#016x}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::metamethod;

    #[test]
    fn test_get_set_remove() -> Result<()> {
        let table = Table::new();
        table.set(Value::from("a"), Value::from(1))?;
        table.set(Value::from(2), Value::from("two"))?;

        assert_eq!(table.get_field("a"), Value::from(1));
        assert_eq!(table.get_index(2), Value::from("two"));
        assert_eq!(table.get(&Value::from("missing")), Value::Nil);

        table.set(Value::from("a"), Value::Nil)?;
        assert!(table.get_field("a").is_nil());
        assert_eq!(table.pairs().len(), 1);
        Ok(())
    }

    #[test]
    fn test_float_keys_normalise() -> Result<()> {
        let table = Table::new();
        table.set(Value::Float(1.0), Value::from("one"))?;
        assert_eq!(table.get(&Value::Int(1)), Value::from("one"));

        table.set(Value::Float(1.5), Value::from("half"))?;
        assert_eq!(table.get(&Value::Float(1.5)), Value::from("half"));
        assert!(table.get(&Value::Int(2)).is_nil());
        Ok(())
    }

    #[test]
    fn test_invalid_keys() {
        let table = Table::new();

        let err = table.set(Value::Nil, Value::from(1)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidKey("nil"));

        let err = table.set(Value::Float(f64::NAN), Value::from(1)).unwrap_err();
        assert_eq!(err.message(), "table index is NaN");

        assert!(table.get(&Value::Nil).is_nil());
        assert!(table.get(&Value::Float(f64::NAN)).is_nil());
    }

    #[test]
    fn test_sequence_and_len() -> Result<()> {
        let table = Table::from_sequence([Value::from(10), Value::from(20), Value::from(30)]);
        assert_eq!(table.len(), 3);

        table.set(Value::from(4), Value::from(40))?;
        assert_eq!(table.len(), 4);

        table.set(Value::from(1), Value::Nil)?;
        assert_eq!(table.len(), 0);
        assert!(!table.is_empty());
        assert!(Table::new().is_empty());
        Ok(())
    }

    #[test]
    fn test_shared_identity() -> Result<()> {
        let table = Table::new();
        let alias = table.clone();
        alias.set(Value::from("k"), Value::from(true))?;

        assert_eq!(table.get_field("k"), Value::Boolean(true));
        assert_eq!(table, alias);
        assert_ne!(table, Table::new());
        Ok(())
    }

    #[test]
    fn test_metatable() -> Result<()> {
        let table = Table::new();
        assert!(table.metatable().is_none());
        assert!(table.metamethod(metamethod::INDEX).is_none());

        let meta = Table::new();
        meta.set(Value::from(metamethod::INDEX), Value::from(Table::new()))?;
        table.set_metatable(Some(meta.clone()));

        assert!(table.metatable().is_some_and(|m| m.ptr_eq(&meta)));
        assert!(table.metamethod(metamethod::INDEX).is_some_and(|h| h.is_table()));
        assert!(table.metamethod(metamethod::CALL).is_none());
        Ok(())
    }

    #[test]
    fn test_key_equality_and_hash() {
        use std::collections::HashSet;

        let mut keys = HashSet::new();
        keys.insert(TableKey::new(Value::from("x")).unwrap());
        keys.insert(TableKey::new(Value::from(String::from("x"))).unwrap());
        keys.insert(TableKey::new(Value::Float(3.0)).unwrap());
        keys.insert(TableKey::new(Value::Int(3)).unwrap());
        assert_eq!(keys.len(), 2);
    }
}
