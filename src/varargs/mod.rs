//! The multi-value call/return protocol.
//!
//! A [`Varargs`] is the ordered, 1-indexed, immutable sequence of values that
//! flows into every call as its arguments and out of it as its results. A
//! single [`Value`] is a one-element sequence, and [`crate::NONE`] is the
//! empty one.
//!
//! # Deferred Tail Calls
//!
//! A function body may end with [`Varargs::tailcall`] instead of computing
//! its results. The returned sequence is *deferred*: [`Varargs::is_tailcall`]
//! reports `true` and nothing has run yet. [`Varargs::eval`] resolves it
//! exactly once, following chains of tail calls in a loop so the native stack
//! does not grow; the outcome, including a raised error, is cached and every
//! copy of the sequence observes it.
//!
//! The infallible accessors ([`Varargs::arg`], [`Varargs::narg`], ...) resolve
//! a deferred sequence on first use. If resolution fails they treat the
//! sequence as empty and log a warning; the error stays available through
//! `eval`.
//!
//! # Examples
//!
//! ```rust
//! use luavalue::{Value, Varargs, NONE};
//!
//! let args = Varargs::of([Value::from(1), Value::from("two"), Value::Nil]);
//! assert_eq!(args.narg(), 3);
//! assert_eq!(args.arg(2), Value::from("two"));
//! assert!(args.arg(9).is_nil());
//! assert_eq!(args.sub_args(2).narg(), 2);
//! assert_eq!(NONE.narg(), 0);
//! ```

mod access;
mod tailcall;

use std::{borrow::Cow, fmt, sync::Arc};

use crate::{value::Value, Result};

use self::tailcall::TailCall;

/// An immutable sequence of values, possibly a deferred tail call.
#[derive(Clone, Default)]
pub struct Varargs {
    repr: Repr,
}

#[derive(Clone, Default)]
enum Repr {
    #[default]
    Empty,
    One(Value),
    Many(Arc<[Value]>),
    TailCall(Arc<TailCall>),
}

impl Varargs {
    /// Returns the empty sequence.
    #[must_use]
    pub const fn empty() -> Self {
        Varargs { repr: Repr::Empty }
    }

    /// Builds a sequence from `values`.
    #[must_use]
    pub fn of(values: impl IntoIterator<Item = Value>) -> Self {
        Self::from_vec(values.into_iter().collect())
    }

    /// Builds the two-element sequence `first, second`.
    #[must_use]
    pub fn pair(first: Value, second: Value) -> Self {
        Varargs {
            repr: Repr::Many(Arc::from(vec![first, second])),
        }
    }

    /// Builds the sequence `first` followed by every value of `rest`.
    #[must_use]
    pub fn prepend(first: Value, rest: Varargs) -> Self {
        Self::from_parts(std::slice::from_ref(&first), rest)
    }

    /// Builds the sequence `prefix` followed by every value of `rest`.
    #[must_use]
    pub fn from_parts(prefix: &[Value], rest: Varargs) -> Self {
        let rest = rest.resolved();
        if prefix.is_empty() {
            return rest.into_owned();
        }

        let tail = rest.values();
        let mut values = Vec::with_capacity(prefix.len() + tail.len());
        values.extend_from_slice(prefix);
        values.extend_from_slice(tail);
        Self::from_vec(values)
    }

    /// Builds a deferred call of `func` with `args`.
    ///
    /// Nothing runs until the sequence is evaluated. `func` may be any
    /// callable value, including a table with a `__call` metamethod.
    #[must_use]
    pub fn tailcall(func: impl Into<Value>, args: Varargs) -> Self {
        Varargs {
            repr: Repr::TailCall(Arc::new(TailCall::new(func.into(), args))),
        }
    }

    fn from_vec(mut values: Vec<Value>) -> Self {
        let repr = match values.len() {
            0 => Repr::Empty,
            1 => Repr::One(values.remove(0)),
            _ => Repr::Many(Arc::from(values)),
        };
        Varargs { repr }
    }

    /// Returns the value at the 1-based position `i`, or `nil` when `i` is
    /// out of range.
    #[must_use]
    pub fn arg(&self, i: usize) -> Value {
        i.checked_sub(1)
            .and_then(|index| self.resolved().values().get(index).cloned())
            .unwrap_or_default()
    }

    /// Returns the first value, or `nil` when empty.
    #[must_use]
    pub fn arg1(&self) -> Value {
        self.arg(1)
    }

    /// Returns the number of values.
    #[must_use]
    pub fn narg(&self) -> usize {
        self.resolved().values().len()
    }

    /// Returns the suffix starting at the 1-based position `start`.
    ///
    /// A `start` past the end yields the empty sequence; `start` 0 is treated
    /// as 1.
    #[must_use]
    pub fn sub_args(&self, start: usize) -> Varargs {
        let start = start.max(1);
        let resolved = self.resolved();
        let values = resolved.values();
        match values.len() {
            n if start > n => Varargs::empty(),
            _ if start == 1 => resolved.into_owned(),
            _ => Self::from_vec(values[start - 1..].to_vec()),
        }
    }

    /// Returns `true` while this is a deferred tail call that has not been
    /// resolved.
    #[must_use]
    pub fn is_tailcall(&self) -> bool {
        match &self.repr {
            Repr::TailCall(call) => !call.is_resolved(),
            _ => false,
        }
    }

    /// Resolves a deferred tail call and returns the concrete results.
    ///
    /// A concrete sequence is returned unchanged. Resolution happens once;
    /// later calls, from any copy, return the cached outcome.
    ///
    /// # Errors
    ///
    /// Whatever the deferred call, or a call it chains into, raised.
    pub fn eval(&self) -> Result<Varargs> {
        match &self.repr {
            Repr::TailCall(call) => TailCall::resolve(call),
            _ => Ok(self.clone()),
        }
    }

    /// Iterates over the values.
    pub fn iter(&self) -> impl Iterator<Item = Value> {
        self.to_vec().into_iter()
    }

    /// Copies the values into a vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.resolved().values().to_vec()
    }

    fn resolved(&self) -> Cow<'_, Varargs> {
        match &self.repr {
            Repr::TailCall(call) => match TailCall::resolve(call) {
                Ok(results) => Cow::Owned(results),
                Err(err) => {
                    log::warn!("deferred call failed, reading it as empty: {err}");
                    Cow::Owned(Varargs::empty())
                }
            },
            _ => Cow::Borrowed(self),
        }
    }

    /// The values of a concrete sequence; empty for an unresolved tail call.
    fn values(&self) -> &[Value] {
        match &self.repr {
            Repr::Empty | Repr::TailCall(_) => &[],
            Repr::One(value) => std::slice::from_ref(value),
            Repr::Many(values) => values,
        }
    }
}

impl PartialEq for Varargs {
    fn eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (Repr::TailCall(a), Repr::TailCall(b)) if Arc::ptr_eq(a, b) => true,
            _ => self.resolved().values() == other.resolved().values(),
        }
    }
}

impl fmt::Display for Varargs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Repr::TailCall(call) = &self.repr {
            if !call.is_resolved() {
                return write!(f, "tailcall({})", call.function());
            }
        }

        write!(f, "{{")?;
        for (i, value) in self.resolved().values().iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for Varargs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::TailCall(call) if !call.is_resolved() => f
                .debug_struct("Varargs")
                .field("tailcall", call.function())
                .finish_non_exhaustive(),
            _ => f.debug_list().entries(self.resolved().values()).finish(),
        }
    }
}

impl From<Value> for Varargs {
    fn from(value: Value) -> Self {
        Varargs {
            repr: Repr::One(value),
        }
    }
}

impl From<Vec<Value>> for Varargs {
    fn from(values: Vec<Value>) -> Self {
        Self::from_vec(values)
    }
}

impl From<&[Value]> for Varargs {
    fn from(values: &[Value]) -> Self {
        Self::from_vec(values.to_vec())
    }
}

impl FromIterator<Value> for Varargs {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::of(iter)
    }
}
