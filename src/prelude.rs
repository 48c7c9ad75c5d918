//! # luavalue Prelude
//!
//! The types and constants nearly every host function or library module
//! needs. Import with `use luavalue::prelude::*;`.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The structured runtime error
pub use crate::Error;

/// The result type used throughout luavalue
pub use crate::Result;

/// Failure details and their classification
pub use crate::{ErrorCategory, ErrorKind};

/// Raising helpers
pub use crate::{arg_error_at, error};

/// Error capture configuration
pub use crate::ErrorConfig;

// ================================================================================================
// Values
// ================================================================================================

/// The value type and its runtime type discriminant
pub use crate::{LuaType, Value};

/// Shared objects
pub use crate::{Function, NativeFunction, Table, Thread, UserData};

/// Host type identity for class-filtered userdata accessors
pub use crate::TypeTag;

/// Constants
pub use crate::{FALSE, NIL, NONE, TRUE};

// ================================================================================================
// Calls
// ================================================================================================

/// Argument and result sequences
pub use crate::Varargs;

/// Frame registration for the eval loop
pub use crate::callstack::{self, CallFrame};
