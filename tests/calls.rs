//! Integration tests for calls across the value layer: script closures,
//! deferred tail calls, protected calls and the positions and tracebacks
//! raised errors report.

use std::sync::Arc;

use luavalue::{prelude::*, Closure, ErrorKind, Prototype, Upvalue};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `function countdown(n) if n == 0 then return "done" end return countdown(n - 1) end`
///
/// The function reaches itself through its first upvalue.
#[derive(Debug)]
struct Countdown;

impl Prototype for Countdown {
    fn source(&self) -> &str {
        "countdown.lua"
    }

    fn line_defined(&self) -> u32 {
        1
    }

    fn name(&self) -> Option<&str> {
        Some("countdown")
    }

    fn execute(&self, closure: &Closure, args: &Varargs) -> Result<Varargs> {
        let n = args.check_long(1)?;
        if n == 0 {
            return Ok(Varargs::from(Value::from("done")));
        }
        callstack::set_line(3);
        let me = closure.upvalue(0).map(Upvalue::get).unwrap_or_default();
        Ok(Varargs::tailcall(me, Varargs::from(Value::from(n - 1))))
    }
}

fn countdown() -> Value {
    let me = Upvalue::new(NIL);
    let function = Function::from(Closure::new(Arc::new(Countdown), vec![me.clone()], None));
    me.set(Value::from(function.clone()));
    Value::from(function)
}

/// `function check(t) return t.size + helper(t) end`, failing inside `helper`
/// on line 7.
#[derive(Debug)]
struct CallsHelper {
    helper: Function,
}

impl Prototype for CallsHelper {
    fn source(&self) -> &str {
        "lib/check.lua"
    }

    fn line_defined(&self) -> u32 {
        5
    }

    fn name(&self) -> Option<&str> {
        Some("check")
    }

    fn execute(&self, _closure: &Closure, args: &Varargs) -> Result<Varargs> {
        callstack::set_line(7);
        self.helper.call(args)
    }
}

fn table_only_helper() -> Function {
    Function::from(NativeFunction::new("helper", |args: &Varargs| {
        let t = args.check_table(1)?;
        Ok(Varargs::from(t.get_field("size")))
    }))
}

#[test]
fn test_deep_tail_calls_run_in_constant_stack() -> Result<()> {
    init_logging();
    let f = countdown();

    let out = f.call(&Varargs::from(Value::from(200_000)))?;
    assert_eq!(out.arg1(), Value::from("done"));
    assert_eq!(callstack::depth(), 0);
    Ok(())
}

#[test]
fn test_deferred_call_resolves_on_first_access() -> Result<()> {
    let f = countdown();
    let pending = f.invoke(&Varargs::from(Value::from(3)))?;

    assert!(pending.is_tailcall());
    assert_eq!(pending.narg(), 1);
    assert_eq!(pending.arg1(), Value::from("done"));
    assert_eq!(pending.eval()?, Varargs::from(Value::from("done")));
    Ok(())
}

#[test]
fn test_tail_call_argument_error_is_positional() {
    let f = countdown();
    let err = f.call(&Varargs::from(Value::from("ten"))).unwrap_err();

    assert_eq!(err.argument_index(), Some(1));
    assert!(err.message().contains("bad argument #1"));
    assert!(err.is_type_error());
}

#[test]
fn test_error_blames_calling_script_line() {
    callstack::configure(ErrorConfig::full());
    let check = Value::from(Function::from(Closure::new(
        Arc::new(CallsHelper { helper: table_only_helper() }),
        Vec::new(),
        None,
    )));
    let _main = callstack::enter(CallFrame::main_chunk("main.lua", 2));

    let err = check.call(&Varargs::from(Value::from(5))).unwrap_err();
    assert_eq!(err.position(), "lib/check.lua:7");
    assert_eq!(err.message(), "lib/check.lua:7: bad argument #1: table expected, got number");
    assert_eq!(err.level(), 1);

    let traceback: Vec<&str> = err.traceback().lines().collect();
    assert_eq!(
        traceback,
        [
            "stack traceback:",
            "\t[C]: in function 'helper'",
            "\tlib/check.lua:7: in function 'check'",
            "\tmain.lua:2: in main chunk",
        ]
    );
    assert_eq!(callstack::depth(), 1);
}

#[test]
fn test_missing_argument_reports_no_value() {
    callstack::configure(ErrorConfig::minimal());
    let helper = table_only_helper();

    let err = helper.call(&NONE).unwrap_err();
    assert_eq!(err.message(), "bad argument #1: table expected, got no value");
    assert!(err.traceback().is_empty());
}

#[test]
fn test_error_levels() {
    callstack::configure(ErrorConfig::default());
    let _main = callstack::enter(CallFrame::main_chunk("main.lua", 1));
    let _outer = callstack::enter(CallFrame::script("lib.lua", 20, Some("outer")));
    let _native = callstack::enter(CallFrame::native("raise"));

    let blame = |level| Error::with_level(ErrorKind::Runtime("boom".into()), level);
    assert_eq!(blame(0).message(), "boom");
    assert_eq!(blame(1).position(), "lib.lua:20");
    assert_eq!(blame(2).message(), "main.lua:1: boom");
    assert_eq!(blame(3).position(), "");
}

#[test]
fn test_traceback_limit_and_unwound_frames() {
    callstack::configure(ErrorConfig::default().with_max_traceback_frames(Some(2)));
    let frames: Vec<_> = (1..=5)
        .map(|line| callstack::enter(CallFrame::script("deep.lua", line, None)))
        .collect();

    let err = error("deep failure");
    let lines: Vec<&str> = err.traceback().lines().collect();
    assert_eq!(lines[1], "\tdeep.lua:5: in ?");
    assert_eq!(lines[2], "\tdeep.lua:4: in ?");
    assert_eq!(lines[3], "\t...\t(skipping 3 levels)");

    let err = err.with_traceback_frame(&CallFrame::main_chunk("boot.lua", 9));
    assert!(err.traceback().ends_with("\n\tboot.lua:9: in main chunk"));

    frames.into_iter().rev().for_each(drop);
}

#[test]
fn test_pcall() {
    callstack::configure(ErrorConfig::minimal());
    let divide = Value::from(NativeFunction::new("divide", |args: &Varargs| {
        let a = args.check_long(1)?;
        let b = args.check_long(2)?;
        if b == 0 {
            return Err(error("division by zero"));
        }
        Ok(Varargs::pair(Value::from(a / b), Value::from(a % b)))
    }));

    let ok = divide.pcall(&Varargs::pair(Value::from(7), Value::from(2)));
    assert_eq!(ok.to_vec(), vec![TRUE, Value::from(3), Value::from(1)]);

    let failed = divide.pcall(&Varargs::pair(Value::from(7), Value::from(0)));
    assert_eq!(failed, Varargs::pair(FALSE, Value::from("division by zero")));

    let not_callable = Value::from(Table::new()).pcall(&NONE);
    assert_eq!(not_callable.arg1(), FALSE);
    assert!(not_callable.arg(2).to_text().contains("attempt to call"));
}
