//! Host functions and closures.
//!
//! A [`Function`] is either a [`NativeFunction`] implemented by the host or a
//! [`Closure`] over compiled script code. The compiled code itself is opaque
//! here: the compiler hands it over as a [`Prototype`] implementation whose
//! [`Prototype::execute`] runs the eval loop.
//!
//! Calling a function registers a frame on the [`crate::callstack`] for the
//! duration of the call. A body may return [`Varargs::tailcall`] instead of
//! concrete results; [`Function::invoke`] hands such a deferred call back to
//! the caller after popping its own frame, and [`Function::call`] resolves it.

use std::{
    fmt,
    sync::{Arc, RwLock},
};

use crate::{
    callstack::{self, CallFrame},
    value::{Table, Value},
    Result, Varargs,
};

/// Signature of a host function body.
pub type NativeFn = dyn Fn(&Varargs) -> Result<Varargs> + Send + Sync;

/// A function implemented by the host.
///
/// # Examples
///
/// ```rust
/// use luavalue::{Function, NativeFunction, Value, Varargs};
///
/// let add = Function::from(NativeFunction::new("add", |args: &Varargs| {
///     Ok(Varargs::from(Value::from(args.check_long(1)? + args.check_long(2)?)))
/// }));
///
/// let sum = add.call(&Varargs::of([Value::from(2), Value::from(3)]))?;
/// assert_eq!(sum.arg1(), Value::from(5));
/// # Ok::<(), luavalue::Error>(())
/// ```
#[derive(Clone)]
pub struct NativeFunction {
    name: Arc<str>,
    body: Arc<NativeFn>,
}

impl NativeFunction {
    /// Wraps `body` under `name`; the name appears in tracebacks.
    pub fn new<F>(name: &str, body: F) -> Self
    where
        F: Fn(&Varargs) -> Result<Varargs> + Send + Sync + 'static,
    {
        NativeFunction {
            name: Arc::from(name),
            body: Arc::new(body),
        }
    }

    /// Returns the registered name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Compiled code of a script function.
///
/// Implemented by the compiler/eval loop. `execute` runs with the closure's
/// frame already registered on the call stack; it should keep the frame's
/// line current with [`callstack::set_line`] and may end in a tail call by
/// returning [`Varargs::tailcall`].
pub trait Prototype: Send + Sync + fmt::Debug {
    /// Chunk name the function was compiled from.
    fn source(&self) -> &str;

    /// Line the function definition starts on.
    fn line_defined(&self) -> u32;

    /// Name the function was declared with, when known.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Runs the code with `args`.
    ///
    /// # Errors
    ///
    /// Whatever the executed code raises.
    fn execute(&self, closure: &Closure, args: &Varargs) -> Result<Varargs>;
}

/// A captured variable shared between closures.
#[derive(Clone, Debug, Default)]
pub struct Upvalue(Arc<RwLock<Value>>);

impl Upvalue {
    /// Creates a cell holding `value`.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Upvalue(Arc::new(RwLock::new(value)))
    }

    /// Reads the captured value.
    #[must_use]
    pub fn get(&self) -> Value {
        read_lock!(self.0).clone()
    }

    /// Replaces the captured value; every sharing closure observes it.
    pub fn set(&self, value: Value) {
        *write_lock!(self.0) = value;
    }
}

/// Compiled code plus its captured environment.
#[derive(Debug)]
pub struct Closure {
    prototype: Arc<dyn Prototype>,
    upvalues: Vec<Upvalue>,
    env: Option<Table>,
}

impl Closure {
    /// Binds `prototype` to `upvalues` and the global environment `env`.
    #[must_use]
    pub fn new(prototype: Arc<dyn Prototype>, upvalues: Vec<Upvalue>, env: Option<Table>) -> Self {
        Closure {
            prototype,
            upvalues,
            env,
        }
    }

    /// Returns the compiled code.
    #[must_use]
    pub fn prototype(&self) -> &Arc<dyn Prototype> {
        &self.prototype
    }

    /// Returns the captured variable at `index`.
    #[must_use]
    pub fn upvalue(&self, index: usize) -> Option<&Upvalue> {
        self.upvalues.get(index)
    }

    /// Returns all captured variables.
    #[must_use]
    pub fn upvalues(&self) -> &[Upvalue] {
        &self.upvalues
    }

    /// Returns the global environment table, if one is bound.
    #[must_use]
    pub fn env(&self) -> Option<&Table> {
        self.env.as_ref()
    }

    fn frame(&self) -> CallFrame {
        CallFrame::script(
            self.prototype.source(),
            self.prototype.line_defined(),
            self.prototype.name(),
        )
    }
}

/// A callable value: host function or script closure.
///
/// Cloning shares the function; equality is identity.
#[derive(Clone)]
pub enum Function {
    /// Implemented by the host.
    Native(Arc<NativeFunction>),
    /// Compiled script code with captured state.
    Closure(Arc<Closure>),
}

impl Function {
    /// Returns `true` for script closures.
    #[must_use]
    pub fn is_closure(&self) -> bool {
        matches!(self, Function::Closure(_))
    }

    /// Returns the closure, if this is one.
    #[must_use]
    pub fn as_closure(&self) -> Option<&Arc<Closure>> {
        match self {
            Function::Closure(closure) => Some(closure),
            Function::Native(_) => None,
        }
    }

    /// Returns the declared name, if known.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Function::Native(native) => Some(native.name()),
            Function::Closure(closure) => closure.prototype.name(),
        }
    }

    /// Calls the function, possibly returning a deferred tail call.
    ///
    /// The function's frame is registered for the duration of the body only;
    /// a returned tail call runs after the frame is gone.
    ///
    /// # Errors
    ///
    /// Whatever the body raises.
    pub fn invoke(&self, args: &Varargs) -> Result<Varargs> {
        match self {
            Function::Native(native) => {
                let _frame = callstack::enter(CallFrame::native(native.name()));
                (native.body)(args)
            }
            Function::Closure(closure) => {
                let _frame = callstack::enter(closure.frame());
                closure.prototype.execute(closure, args)
            }
        }
    }

    /// Calls the function and resolves any tail call it returns.
    ///
    /// # Errors
    ///
    /// Whatever the body or a chained tail call raises.
    pub fn call(&self, args: &Varargs) -> Result<Varargs> {
        self.invoke(args)?.eval()
    }

    /// Returns `true` when both handles refer to the same function.
    #[must_use]
    pub fn ptr_eq(&self, other: &Function) -> bool {
        self.id() == other.id()
    }

    /// Returns the identity of this function, stable for its lifetime.
    #[must_use]
    pub fn id(&self) -> usize {
        match self {
            Function::Native(native) => Arc::as_ptr(native) as usize,
            Function::Closure(closure) => Arc::as_ptr(closure) as usize,
        }
    }
}

impl From<NativeFunction> for Function {
    fn from(native: NativeFunction) -> Self {
        Function::Native(Arc::new(native))
    }
}

impl From<Closure> for Function {
    fn from(closure: Closure) -> Self {
        Function::Closure(Arc::new(closure))
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "function<{name}>: {:#016x}", self.id()),
            None => write!(f, "function: {:#016x}", self.id()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callstack::FrameKind;

    #[derive(Debug)]
    struct Echo;

    impl Prototype for Echo {
        fn source(&self) -> &str {
            "echo.lua"
        }

        fn line_defined(&self) -> u32 {
            3
        }

        fn name(&self) -> Option<&str> {
            Some("echo")
        }

        fn execute(&self, closure: &Closure, args: &Varargs) -> Result<Varargs> {
            let frames = callstack::snapshot();
            assert_eq!(frames.last().map(CallFrame::kind), Some(FrameKind::Script));
            callstack::set_line(5);

            let tag = closure.upvalue(0).map(Upvalue::get).unwrap_or_default();
            Ok(Varargs::prepend(tag, args.clone()))
        }
    }

    #[test]
    fn test_native_call_registers_frame() -> Result<()> {
        let probe = Function::from(NativeFunction::new("probe", |_: &Varargs| {
            let frames = callstack::snapshot();
            Ok(Varargs::from(Value::from(frames.len() as i64)))
        }));

        assert_eq!(probe.call(&Varargs::empty())?.arg1(), Value::from(1));
        assert_eq!(callstack::depth(), 0);
        assert_eq!(probe.name(), Some("probe"));
        assert!(!probe.is_closure());
        Ok(())
    }

    #[test]
    fn test_closure_reads_upvalues() -> Result<()> {
        let cell = Upvalue::new(Value::from("first"));
        let echo = Function::from(Closure::new(Arc::new(Echo), vec![cell.clone()], None));

        let out = echo.call(&Varargs::of([Value::from(1), Value::from(2)]))?;
        assert_eq!(out.narg(), 3);
        assert_eq!(out.arg1(), Value::from("first"));

        cell.set(Value::from("second"));
        assert_eq!(echo.call(&Varargs::empty())?.arg1(), Value::from("second"));
        assert!(echo.is_closure());
        assert_eq!(echo.name(), Some("echo"));
        Ok(())
    }

    #[test]
    fn test_error_blames_caller() {
        let failing = Function::from(NativeFunction::new("fail", |_: &Varargs| {
            Err(crate::error("broken"))
        }));

        let _main = callstack::enter(CallFrame::main_chunk("main.lua", 8));
        let err = failing.call(&Varargs::empty()).unwrap_err();
        assert_eq!(err.message(), "main.lua:8: broken");
        assert!(err.traceback().contains("[C]: in function 'fail'"));
    }

    #[test]
    fn test_identity() {
        let f = Function::from(NativeFunction::new("f", |_: &Varargs| Ok(Varargs::empty())));
        let g = Function::from(NativeFunction::new("f", |_: &Varargs| Ok(Varargs::empty())));
        assert_eq!(f, f.clone());
        assert_ne!(f, g);
        assert!(format!("{f:?}").starts_with("function<f>: 0x"));
    }
}
