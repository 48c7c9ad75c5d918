//! Runtime values and the shared objects they refer to.
//!
//! This module defines [`Value`], the canonical in-memory representation of
//! everything a script can produce, together with the handle types behind its
//! reference variants and the numeral grammar behind the string/number
//! duality.
//!
//! # Architecture
//!
//! | Variant | Storage | Equality |
//! |---------|---------|----------|
//! | `Nil`, `Boolean` | inline | content |
//! | `Int`, `Float` | inline | mathematical value across both |
//! | `Str` | `Arc<str>` | content |
//! | `Table` | [`Table`] handle | identity |
//! | `Function` | [`Function`] handle | identity |
//! | `UserData` | [`UserData`] handle | identity |
//! | `Thread` | [`Thread`] handle | identity |
//!
//! Scalars are immutable and freely cloned. Cloning a handle shares the
//! object; a mutation through any holder is visible to all of them.
//!
//! # Key Components
//!
//! - [`Value`] - The value sum type and its predicates
//! - [`LuaType`] - The closed set of runtime types
//! - [`Number`] / [`parse_numeral`] / [`format_float`] - Numeral grammar and canonical formatting
//! - [`Table`] / [`TableKey`] - Shared maps with optional metatables
//! - [`Function`] / [`NativeFunction`] / [`Closure`] / [`Prototype`] - Callables
//! - [`UserData`] / [`TypeTag`] - Host payloads with a type lineage
//! - [`Thread`] / [`ThreadStatus`] - Coroutine handles
//!
//! # Thread Safety
//!
//! Every handle is an `Arc` around a lock, so [`Value`] is `Send + Sync`. An
//! interpreter still runs on one native thread at a time; the locks only make
//! handing values to another thread sound.

mod constants;
mod function;
mod luavalue;
mod number;
mod table;
mod thread;
mod types;
mod userdata;

pub use constants::{empty_string, metamethod, FALSE, MINUS_ONE, NIL, NONE, ONE, TRUE, ZERO};
pub use function::{Closure, Function, NativeFn, NativeFunction, Prototype, Upvalue};
pub use luavalue::Value;
pub use number::{float_to_exact_integer, format_float, parse_numeral, Number};
pub use table::{Table, TableKey};
pub use thread::{Thread, ThreadStatus};
pub use types::LuaType;
pub use userdata::{TypeTag, UserData};
