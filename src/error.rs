use std::{borrow::Cow, fmt};

use strum::{Display, EnumIter};
use thiserror::Error;

use crate::callstack::{self, CallFrame};

macro_rules! runtime_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::runtime($msg.to_string())
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::runtime(format!($fmt, $($arg)*))
    };
}

macro_rules! type_error {
    ($expected:expr, $value:expr) => {
        crate::Error::from(crate::ErrorKind::Type {
            expected: ::std::borrow::Cow::from($expected),
            actual: $value.type_name(),
        })
    };
}

/// The failure detail carried by every [`Error`].
///
/// All failures in the value layer share the single [`Error`] structure and
/// differ only by their kind, which in turn determines the message shape.
///
/// # Error Categories
///
/// ## Type Errors
/// - [`ErrorKind::Type`] - A strict accessor found the wrong runtime type
/// - [`ErrorKind::MalformedNumber`] - A string did not parse as a numeral
/// - [`ErrorKind::NoIntegerRepresentation`] - A numeral string denoted a fractional value
///
/// ## Argument Errors
/// - [`ErrorKind::Argument`] - A positional argument failed a check
///
/// ## Runtime Errors
/// - [`ErrorKind::Runtime`] - A plain message raised by library code
/// - [`ErrorKind::InvalidKey`] - A table was indexed with `nil` or NaN
/// - [`ErrorKind::NotCallable`] - A call was attempted on a non-function value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// A plain runtime error with a caller-supplied message.
    #[error("{0}")]
    Runtime(String),

    /// A value had the wrong runtime type for a strict accessor.
    #[error("{expected} expected, got {actual}")]
    Type {
        /// The type name the accessor required
        expected: Cow<'static, str>,
        /// The type name that was found, or `no value` for a missing argument
        actual: &'static str,
    },

    /// A string value was required to be numeric but does not parse under the
    /// numeral grammar.
    #[error("number expected, got string '{0}'")]
    MalformedNumber(String),

    /// A numeral string was required to denote an integer but has a fractional part.
    #[error("number has no integer representation")]
    NoIntegerRepresentation,

    /// A positional argument failed validation.
    ///
    /// Rendered as `bad argument #i: <detail>`, or `bad argument: <detail>` when
    /// the position is unknown.
    #[error("bad argument{}: {detail}", argument_position(.index))]
    Argument {
        /// 1-based position of the offending argument, if known
        index: Option<usize>,
        /// What was wrong with the argument
        detail: Box<ErrorKind>,
    },

    /// A table was indexed with a key that can never be stored.
    #[error("table index is {0}")]
    InvalidKey(&'static str),

    /// A call was attempted on a value that is neither a function nor carries a
    /// `__call` metamethod.
    #[error("attempt to call a {0} value")]
    NotCallable(&'static str),
}

fn argument_position(index: &Option<usize>) -> String {
    index.map(|i| format!(" #{i}")).unwrap_or_default()
}

/// Coarse classification of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ErrorCategory {
    /// Plain runtime failure.
    Runtime,
    /// A strict accessor found the wrong runtime type.
    Type,
    /// A positional argument failed a check.
    Argument,
    /// A numeral string could not be converted; surfaces as a type error.
    Conversion,
}

impl ErrorKind {
    /// Returns the category this kind belongs to.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorKind::Runtime(_) | ErrorKind::InvalidKey(_) | ErrorKind::NotCallable(_) => {
                ErrorCategory::Runtime
            }
            ErrorKind::Type { .. } => ErrorCategory::Type,
            ErrorKind::MalformedNumber(_) | ErrorKind::NoIntegerRepresentation => {
                ErrorCategory::Conversion
            }
            ErrorKind::Argument { .. } => ErrorCategory::Argument,
        }
    }
}

/// The structured runtime error raised by every failed check in this crate.
///
/// An `Error` is immutable once raised: it records the blame `level`, the
/// source position that level resolved to, a snapshot of the call stack
/// taken at raise time and the fully rendered message. Raising is returning
/// `Err`; the error unwinds with `?` until a protected call boundary inspects
/// it or it reaches the host.
///
/// The rendered message is `position: detail` when a position is known and
/// position prefixes are enabled in the active [`crate::ErrorConfig`], and
/// just `detail` otherwise.
///
/// # Examples
///
/// ```rust
/// use luavalue::{arg_error_at, ErrorCategory};
///
/// let err = arg_error_at(2, "table expected");
/// assert_eq!(err.category(), ErrorCategory::Argument);
/// assert_eq!(err.argument_index(), Some(2));
/// assert!(err.message().contains("bad argument #2"));
/// assert!(err.message().contains("table expected"));
/// ```
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    level: u32,
    position: String,
    traceback: String,
    message: String,
}

impl Error {
    /// Raises `kind` blaming the stack frame `level` levels up.
    ///
    /// Level 1 blames the caller of the running native function, level 2 its
    /// caller and so on. Level 0 records no position at all.
    #[must_use]
    pub fn with_level(kind: ErrorKind, level: u32) -> Self {
        let capture = callstack::capture(level);
        let message = render(&kind, &capture.position, capture.position_prefix);
        log::debug!("raised runtime error: {message}");

        Error {
            kind,
            level,
            position: capture.position,
            traceback: capture.traceback,
            message,
        }
    }

    /// Raises a plain runtime error at level 1.
    #[must_use]
    pub fn runtime(message: impl Into<String>) -> Self {
        Error::with_level(ErrorKind::Runtime(message.into()), 1)
    }

    /// Returns the structured failure detail.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the coarse classification of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Returns `true` for type errors, including conversion failures and
    /// argument errors that wrap either.
    #[must_use]
    pub fn is_type_error(&self) -> bool {
        let kind = match &self.kind {
            ErrorKind::Argument { detail, .. } => detail.as_ref(),
            other => other,
        };
        matches!(
            kind.category(),
            ErrorCategory::Type | ErrorCategory::Conversion
        )
    }

    /// Returns the 1-based argument position for argument errors.
    #[must_use]
    pub fn argument_index(&self) -> Option<usize> {
        match self.kind {
            ErrorKind::Argument { index, .. } => index,
            _ => None,
        }
    }

    /// Returns the blame level the error was raised with.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Returns the `source:line` position the blame level resolved to, or an
    /// empty string when unknown.
    #[must_use]
    pub fn position(&self) -> &str {
        &self.position
    }

    /// Returns the formatted call-stack snapshot, or an empty string when
    /// traceback capture is disabled.
    #[must_use]
    pub fn traceback(&self) -> &str {
        &self.traceback
    }

    /// Returns the rendered message including the position prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Appends a frame the eval loop unwound through to the traceback.
    ///
    /// The eval loop calls this for every frame that was not on the
    /// registered call stack when the error was raised.
    #[must_use]
    pub fn with_traceback_frame(mut self, frame: &CallFrame) -> Self {
        if self.traceback.is_empty() {
            self.traceback.push_str(callstack::TRACEBACK_HEADER);
        }
        self.traceback.push_str("\n\t");
        self.traceback.push_str(&frame.describe());
        self
    }

    /// Re-raises this error as an argument error at position `index`.
    ///
    /// When the argument was missing entirely, a type mismatch against `nil` is
    /// reported as `got no value`. Level, position and traceback are preserved.
    pub(crate) fn at_argument(self, index: usize, missing: bool) -> Self {
        let Error {
            kind,
            level,
            position,
            traceback,
            message,
        } = self;

        let detail = match kind {
            ErrorKind::Type { expected, .. } if missing => ErrorKind::Type {
                expected,
                actual: "no value",
            },
            ErrorKind::Argument { detail, .. } => *detail,
            other => other,
        };
        let kind = ErrorKind::Argument {
            index: Some(index),
            detail: Box::new(detail),
        };

        let prefixed = !position.is_empty() && message.starts_with(&position);
        let message = render(&kind, &position, prefixed);

        Error {
            kind,
            level,
            position,
            traceback,
            message,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::with_level(kind, 1)
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.level == other.level && self.position == other.position
    }
}

fn render(kind: &ErrorKind, position: &str, prefix: bool) -> String {
    if prefix && !position.is_empty() {
        format!("{position}: {kind}")
    } else {
        kind.to_string()
    }
}

/// Raises a plain runtime error with `message` at level 1.
///
/// This is the host-side equivalent of the language's `error(message)`.
#[must_use]
pub fn error(message: impl fmt::Display) -> Error {
    Error::runtime(message.to_string())
}

/// Raises an argument error for the 1-based argument `index`.
///
/// The message is formatted as `bad argument #index: msg`.
#[must_use]
pub fn arg_error_at(index: usize, msg: impl Into<String>) -> Error {
    Error::from(ErrorKind::Argument {
        index: Some(index),
        detail: Box::new(ErrorKind::Runtime(msg.into())),
    })
}
