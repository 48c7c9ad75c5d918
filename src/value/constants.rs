//! Process-wide immutable values.
//!
//! `NIL` is a single-slot absent value, while [`NONE`] is the zero-length
//! [`Varargs`]. They are different: `NONE.narg()` is 0, and a `NIL` argument
//! still occupies a position.

use std::sync::{Arc, OnceLock};

use crate::{value::Value, Varargs};

/// The `nil` value.
pub const NIL: Value = Value::Nil;

/// The empty argument/result sequence.
pub const NONE: Varargs = Varargs::empty();

/// The boolean `true`.
pub const TRUE: Value = Value::Boolean(true);

/// The boolean `false`.
pub const FALSE: Value = Value::Boolean(false);

/// The integer `0`.
pub const ZERO: Value = Value::Int(0);

/// The integer `1`.
pub const ONE: Value = Value::Int(1);

/// The integer `-1`.
pub const MINUS_ONE: Value = Value::Int(-1);

/// Returns the shared empty string value.
#[must_use]
pub fn empty_string() -> Value {
    static EMPTY: OnceLock<Arc<str>> = OnceLock::new();
    Value::Str(Arc::clone(EMPTY.get_or_init(|| Arc::from(""))))
}

/// Metatable key names the value layer and its embedder consult.
pub mod metamethod {
    /// Read from a missing key.
    pub const INDEX: &str = "__index";
    /// Call of a non-function value.
    pub const CALL: &str = "__call";
}
