//! Coroutine handles.
//!
//! A [`Thread`] records the body function of a coroutine and its scheduling
//! status. Suspending and resuming belong to the scheduler; it reports each
//! transition through [`Thread::transition`], which rejects moves the
//! language forbids.

use std::{
    fmt,
    sync::{Arc, RwLock},
};

use strum::{Display, EnumIter, IntoStaticStr};

use crate::{value::Function, Result};

/// Scheduling status of a coroutine, as reported by `coroutine.status`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ThreadStatus {
    /// Created or yielded; may be resumed.
    Suspended,
    /// Currently executing.
    Running,
    /// Active but not running; it resumed another coroutine.
    Normal,
    /// Finished or failed; can never run again.
    Dead,
}

impl ThreadStatus {
    fn can_become(self, next: ThreadStatus) -> bool {
        use ThreadStatus::{Dead, Normal, Running, Suspended};

        matches!(
            (self, next),
            (Suspended, Running)
                | (Running, Suspended | Normal | Dead)
                | (Normal, Running)
        )
    }
}

struct ThreadState {
    status: ThreadStatus,
    body: Function,
}

/// Handle to a coroutine.
#[derive(Clone)]
pub struct Thread {
    inner: Arc<RwLock<ThreadState>>,
}

impl Thread {
    /// Creates a suspended coroutine that will run `body`.
    #[must_use]
    pub fn new(body: Function) -> Self {
        Thread {
            inner: Arc::new(RwLock::new(ThreadState {
                status: ThreadStatus::Suspended,
                body,
            })),
        }
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> ThreadStatus {
        read_lock!(self.inner).status
    }

    /// Returns the body function.
    #[must_use]
    pub fn body(&self) -> Function {
        read_lock!(self.inner).body.clone()
    }

    /// Returns `true` once the coroutine has finished or failed.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.status() == ThreadStatus::Dead
    }

    /// Moves the coroutine to `next`.
    ///
    /// # Errors
    ///
    /// Returns a runtime error when the move is not allowed, for example
    /// resuming a dead or running coroutine.
    pub fn transition(&self, next: ThreadStatus) -> Result<()> {
        let mut state = write_lock!(self.inner);
        let current = state.status;
        if !current.can_become(next) {
            return Err(match next {
                ThreadStatus::Running => {
                    runtime_error!("cannot resume {} coroutine", current)
                }
                _ => runtime_error!("cannot move {} coroutine to {}", current, next),
            });
        }

        log::trace!("coroutine {:#x}: {current} -> {next}", self.id());
        state.status = next;
        Ok(())
    }

    /// Returns `true` when both handles refer to the same coroutine.
    #[must_use]
    pub fn ptr_eq(&self, other: &Thread) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns the identity of this coroutine, stable for its lifetime.
    #[must_use]
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

impl PartialEq for Thread {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Thread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "thread: {:#016x} ({})", self.id(), self.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{value::NativeFunction, Varargs};

    fn body() -> Function {
        Function::from(NativeFunction::new("body", |_: &Varargs| Ok(Varargs::empty())))
    }

    #[test]
    fn test_lifecycle() -> Result<()> {
        let co = Thread::new(body());
        assert_eq!(co.status(), ThreadStatus::Suspended);

        co.transition(ThreadStatus::Running)?;
        co.transition(ThreadStatus::Normal)?;
        co.transition(ThreadStatus::Running)?;
        co.transition(ThreadStatus::Suspended)?;
        co.transition(ThreadStatus::Running)?;
        co.transition(ThreadStatus::Dead)?;
        assert!(co.is_dead());
        Ok(())
    }

    #[test]
    fn test_rejected_transitions() {
        let co = Thread::new(body());

        let err = co.transition(ThreadStatus::Dead).unwrap_err();
        assert_eq!(err.message(), "cannot move suspended coroutine to dead");

        co.transition(ThreadStatus::Running).unwrap();
        co.transition(ThreadStatus::Dead).unwrap();
        let err = co.transition(ThreadStatus::Running).unwrap_err();
        assert_eq!(err.message(), "cannot resume dead coroutine");
        assert!(co.is_dead());
    }

    #[test]
    fn test_identity() {
        let f = body();
        let co = Thread::new(f.clone());
        let alias = co.clone();
        assert_eq!(co, alias);
        assert_ne!(co, Thread::new(f.clone()));
        assert_eq!(co.body(), f);
        assert_eq!(ThreadStatus::Normal.to_string(), "normal");
    }
}
