// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # luavalue
//!
//! The value layer of an embeddable Lua-family scripting runtime: the in-memory
//! representation of every value a script can produce, the rules for converting
//! those values to and from host shapes, the protocol for passing a variable
//! number of values across a call boundary, and the structured runtime error
//! raised when a value fails a required check.
//!
//! ## Features
//!
//! - **Closed value type** - [`Value`] with total, non-failing type predicates
//! - **Three accessor tiers** - `to_*` never fails, `opt_*` takes a default, `check_*` is strict
//! - **Numeral grammar** - strings that parse as numerals are numbers, and numbers are strings
//! - **Multi-value protocol** - [`Varargs`] with deferred tail calls resolved exactly once
//! - **Structured errors** - [`Error`] with blame level, source position and traceback
//!
//! ## Quick Start
//!
//! ```rust
//! use luavalue::prelude::*;
//!
//! // A host function checking its arguments the way library code does.
//! let repeat = NativeFunction::new("repeat", |args: &Varargs| {
//!     let text = args.check_text(1)?;
//!     let count = args.opt_int(2, 1)?;
//!     args.arg_check(count >= 0, 2, "count must be non-negative")?;
//!     Ok(Varargs::from(Value::from(text.repeat(count as usize))))
//! });
//! let repeat = Value::from(repeat);
//!
//! let out = repeat.call(&Varargs::of([Value::from("ab"), Value::from("3")]))?;
//! assert_eq!(out.arg1(), Value::from("ababab"));
//!
//! let err = repeat.call(&Varargs::of([Value::from(Table::new())])).unwrap_err();
//! assert_eq!(err.message(), "bad argument #1: string expected, got table");
//! # Ok::<(), luavalue::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`value`] - The value type, shared objects and the numeral grammar
//! - [`varargs`] - Argument and result sequences, deferred tail calls
//! - [`callstack`] - The frame registry that positions and tracebacks are read from
//! - [`Error`] and [`Result`] - The single structured runtime error
//! - [`ErrorConfig`] - What raised errors capture
//! - [`prelude`] - Convenient re-exports
//!
//! The coercion accessors are methods on [`Value`] (and, positionally, on
//! [`Varargs`]).
//!
//! ## Error Handling
//!
//! Raising is returning `Err`. Library code propagates with `?` until a
//! protected call such as [`Value::pcall`] or the host inspects the error.
//! An [`Error`] records the blame level it was raised with, the `source:line`
//! of the frame that level resolved to on the [`callstack`], and a traceback
//! snapshot.
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`] facade: frame entry and tail-call hops
//! at `trace`, raised errors and configuration changes at `debug`, and failed
//! deferred calls read through an infallible accessor at `warn`.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// The registered call stack used for error positions and tracebacks.
///
/// The eval loop pushes a [`callstack::CallFrame`] for the main chunk with
/// [`callstack::enter`] and keeps lines current with [`callstack::set_line`];
/// functions called through [`Function::invoke`] register themselves.
///
/// # Examples
///
/// ```rust
/// use luavalue::{callstack::{self, CallFrame}, error};
///
/// let _main = callstack::enter(CallFrame::main_chunk("init.lua", 12));
/// let err = error("missing config");
/// assert_eq!(err.position(), "init.lua:12");
/// assert_eq!(err.message(), "init.lua:12: missing config");
/// ```
pub mod callstack;

pub(crate) mod coerce;
pub(crate) mod config;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust
/// use luavalue::prelude::*;
///
/// let args = Varargs::pair(Value::from(1), NIL);
/// assert_eq!(args.narg(), 2);
/// assert!(args.is_none_or_nil(2));
/// ```
pub mod prelude;

/// Runtime values, shared objects and the numeral grammar.
pub mod value;

/// Argument and result sequences.
pub mod varargs;

/// `luavalue` Result type
///
/// Every fallible operation in the crate returns this alias.
///
/// # Examples
///
/// ```rust
/// use luavalue::{Result, Value};
///
/// fn width(v: &Value) -> Result<i32> {
///     v.check_int()
/// }
///
/// assert_eq!(width(&Value::from("80")).ok(), Some(80));
/// ```
pub type Result<T> = std::result::Result<T, Error>;

pub use error::{arg_error_at, error, Error, ErrorCategory, ErrorKind};

/// Configuration of what raised errors capture from the call stack.
pub use config::{ErrorConfig, DEFAULT_TRACEBACK_FRAMES};

pub use value::{
    empty_string, Closure, Function, LuaType, NativeFunction, Number, Prototype, Table,
    TableKey, Thread, ThreadStatus, TypeTag, Upvalue, UserData, Value, FALSE, MINUS_ONE, NIL,
    NONE, ONE, TRUE, ZERO,
};

pub use varargs::Varargs;
