//! Resolution of deferred tail calls.

use std::sync::{Arc, OnceLock};

use super::{Repr, Varargs};
use crate::{value::Value, Result};

/// A call that has been requested but not yet run.
pub(crate) struct TailCall {
    func: Value,
    args: Varargs,
    outcome: OnceLock<Result<Varargs>>,
}

impl TailCall {
    pub(crate) fn new(func: Value, args: Varargs) -> Self {
        TailCall {
            func,
            args,
            outcome: OnceLock::new(),
        }
    }

    pub(crate) fn function(&self) -> &Value {
        &self.func
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.outcome.get().is_some()
    }

    /// Runs `call` and every tail call it chains into, returning the final
    /// results.
    ///
    /// The first resolution of `call` runs the chain; concurrent resolutions
    /// of the same call block until it finishes and then share its outcome.
    pub(crate) fn resolve(call: &Arc<TailCall>) -> Result<Varargs> {
        call.outcome.get_or_init(|| Self::run_chain(call)).clone()
    }

    /// Follows the chain in a loop, so its length does not consume native
    /// stack. Every later link that is still referenced from elsewhere
    /// records the final outcome; unreferenced links are dropped as soon as
    /// they ran. The head is recorded by the caller.
    fn run_chain(head: &Arc<TailCall>) -> Result<Varargs> {
        let mut observed: Vec<Arc<TailCall>> = Vec::new();
        let mut current = Arc::clone(head);
        let mut hops: usize = 0;

        let outcome = loop {
            if let Some(outcome) = current.outcome.get() {
                break outcome.clone();
            }

            log::trace!("tail call into {}", current.func);
            hops += 1;
            let step = current.func.invoke(&current.args);

            // A link held only by this loop can never be read again.
            if !Arc::ptr_eq(&current, head) && Arc::strong_count(&current) > 1 {
                observed.push(Arc::clone(&current));
            }

            match step {
                Ok(Varargs {
                    repr: Repr::TailCall(next),
                }) => current = next,
                other => break other,
            }
        };

        log::trace!(
            "tail call chain resolved after {hops} calls, {} observed",
            observed.len()
        );

        for link in observed {
            // Another resolution of the same link may have finished first.
            let _ = link.outcome.set(outcome.clone());
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{value::NativeFunction, ErrorKind, Function, TRUE};

    fn counting(counter: Arc<AtomicUsize>) -> Value {
        Value::from(NativeFunction::new("count", move |args: &Varargs| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(args.clone())
        }))
    }

    #[test]
    fn test_resolves_once() -> Result<()> {
        let counter = Arc::new(AtomicUsize::new(0));
        let deferred = Varargs::tailcall(counting(counter.clone()), Varargs::from(Value::from(5)));

        assert!(deferred.is_tailcall());
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        let first = deferred.eval()?;
        let copy = deferred.clone();
        let second = copy.eval()?;

        assert_eq!(first.arg1(), Value::from(5));
        assert_eq!(first, second);
        assert!(!deferred.is_tailcall());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[test]
    fn test_accessors_force_resolution() {
        let counter = Arc::new(AtomicUsize::new(0));
        let deferred = Varargs::tailcall(
            counting(counter.clone()),
            Varargs::pair(Value::from(1), Value::from(2)),
        );

        assert_eq!(deferred.narg(), 2);
        assert_eq!(deferred.arg(2), Value::from(2));
        assert!(!deferred.is_tailcall());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_error_is_cached() {
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = counter.clone();
        let failing = Value::from(NativeFunction::new("fail", move |_: &Varargs| {
            seen.fetch_add(1, Ordering::SeqCst);
            Err(crate::error("deferred failure"))
        }));

        let deferred = Varargs::tailcall(failing, Varargs::empty());
        assert_eq!(deferred.narg(), 0);

        let err = deferred.eval().unwrap_err();
        assert_eq!(err.message(), "deferred failure");
        assert!(deferred.eval().is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_resolution_runs_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = counter.clone();
        let slow = Value::from(NativeFunction::new("slow", move |args: &Varargs| {
            seen.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(args.clone())
        }));
        let deferred = Varargs::tailcall(slow, Varargs::from(Value::from(3)));

        std::thread::scope(|scope| {
            let workers: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| deferred.eval()))
                .collect();
            for worker in workers {
                let results = worker.join().unwrap().unwrap();
                assert_eq!(results.arg1(), Value::from(3));
            }
        });
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_positional_access_reports_deferred_error() {
        let failing = Value::from(NativeFunction::new("fail", |_: &Varargs| {
            Err(crate::error("real failure"))
        }));
        let deferred = Varargs::tailcall(failing, Varargs::empty());

        let err = deferred.check_text(1).unwrap_err();
        assert_eq!(err.message(), "real failure");
        assert_eq!(err.argument_index(), None);

        assert_eq!(deferred.opt_int(1, 5).unwrap_err().message(), "real failure");
        assert_eq!(deferred.check_value(1).unwrap_err().message(), "real failure");
        assert_eq!(deferred.opt_value(1, TRUE), TRUE);
    }

    #[test]
    fn test_chain_runs_in_a_loop() -> Result<()> {
        fn countdown() -> Function {
            Function::from(NativeFunction::new("countdown", |args: &Varargs| {
                let n = args.check_long(1)?;
                if n == 0 {
                    return Ok(Varargs::from(Value::from("done")));
                }
                Ok(Varargs::tailcall(countdown(), Varargs::from(Value::from(n - 1))))
            }))
        }

        let result = countdown().call(&Varargs::from(Value::from(100_000)))?;
        assert_eq!(result.arg1(), Value::from("done"));
        Ok(())
    }

    #[test]
    fn test_not_callable_target() {
        let deferred = Varargs::tailcall(Value::from(3), Varargs::empty());
        let err = deferred.eval().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NotCallable("number"));
    }
}
