//! Registered call stack used for error positions and tracebacks.
//!
//! The eval loop registers every frame it enters with [`enter`] and keeps the
//! current line up to date with [`set_line`]. Native functions invoked through
//! [`crate::Function::invoke`] are registered automatically. When an
//! [`crate::Error`] is raised, its blame level is resolved against this stack
//! to find the reported source position, and a traceback snapshot is taken
//! according to the active [`ErrorConfig`].
//!
//! The registry is per native thread; an interpreter instance runs on one
//! thread at a time, so no locking is involved.
//!
//! # Blame Levels
//!
//! | Level | Blamed frame |
//! |-------|--------------|
//! | 0 | none, no position is reported |
//! | 1 | the caller of the running native function, or the innermost frame when it is not native |
//! | n | `n - 1` frames above the level 1 frame |

use std::{cell::RefCell, fmt};

use crate::ErrorConfig;

pub(crate) const TRACEBACK_HEADER: &str = "stack traceback:";

/// What kind of code a [`CallFrame`] executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// A host function; it has no source position.
    Native,
    /// The top level chunk of a script.
    Main,
    /// A function defined in a script.
    Script,
}

/// One registered activation on the call stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallFrame {
    kind: FrameKind,
    source: String,
    line: Option<u32>,
    function: Option<String>,
}

impl CallFrame {
    /// Creates a frame for a host function called `name`.
    #[must_use]
    pub fn native(name: impl Into<String>) -> Self {
        CallFrame {
            kind: FrameKind::Native,
            source: "[C]".to_string(),
            line: None,
            function: Some(name.into()),
        }
    }

    /// Creates a frame for the main chunk of `source`, currently at `line`.
    #[must_use]
    pub fn main_chunk(source: impl Into<String>, line: u32) -> Self {
        CallFrame {
            kind: FrameKind::Main,
            source: source.into(),
            line: Some(line),
            function: None,
        }
    }

    /// Creates a frame for a script function, currently at `line`.
    #[must_use]
    pub fn script(source: impl Into<String>, line: u32, function: Option<&str>) -> Self {
        CallFrame {
            kind: FrameKind::Script,
            source: source.into(),
            line: Some(line),
            function: function.map(str::to_string),
        }
    }

    /// Returns the frame kind.
    #[must_use]
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    /// Returns the chunk name, `[C]` for native frames.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the current line, `None` for native frames.
    #[must_use]
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// Returns the function name, if known.
    #[must_use]
    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    /// Returns `source:line`, or `None` for frames without a position.
    #[must_use]
    pub fn position(&self) -> Option<String> {
        match (self.kind, self.line) {
            (FrameKind::Native, _) | (_, None) => None,
            (_, Some(line)) => Some(format!("{}:{line}", self.source)),
        }
    }

    /// Formats this frame as a traceback line (without the leading tab).
    #[must_use]
    pub fn describe(&self) -> String {
        let location = self.position().unwrap_or_else(|| self.source.clone());
        match (self.kind, self.function.as_deref()) {
            (FrameKind::Main, _) => format!("{location}: in main chunk"),
            (_, Some(name)) => format!("{location}: in function '{name}'"),
            (_, None) => format!("{location}: in ?"),
        }
    }
}

impl fmt::Display for CallFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

#[derive(Default)]
struct CallStackState {
    frames: Vec<CallFrame>,
    config: ErrorConfig,
}

thread_local! {
    static STATE: RefCell<CallStackState> = RefCell::new(CallStackState::default());
}

/// Pops its frame off the registered call stack when dropped.
///
/// Returned by [`enter`]. Dropping happens on normal return as well as while
/// an error propagates with `?`, so the stack always reflects live frames.
/// Guards must be dropped innermost first; debug builds assert it.
#[must_use = "the frame is popped as soon as the guard is dropped"]
pub struct FrameGuard {
    depth: usize,
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        STATE.with(|state| {
            let mut state = state.borrow_mut();
            debug_assert!(
                std::thread::panicking() || state.frames.len() == self.depth + 1,
                "call frame guards dropped out of order: guard at depth {} with {} frames",
                self.depth,
                state.frames.len()
            );
            if let Some(frame) = state.frames.get(self.depth) {
                log::trace!("leave {frame}");
            }
            state.frames.truncate(self.depth);
        });
    }
}

/// Pushes `frame` onto the registered call stack.
pub fn enter(frame: CallFrame) -> FrameGuard {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        log::trace!("enter {frame}");
        let depth = state.frames.len();
        state.frames.push(frame);
        FrameGuard { depth }
    })
}

/// Updates the current line of the innermost script frame.
pub fn set_line(line: u32) {
    STATE.with(|state| {
        if let Some(frame) = state.borrow_mut().frames.last_mut() {
            if frame.kind != FrameKind::Native {
                frame.line = Some(line);
            }
        }
    });
}

/// Returns the number of registered frames.
#[must_use]
pub fn depth() -> usize {
    STATE.with(|state| state.borrow().frames.len())
}

/// Returns a copy of the registered frames, innermost last.
#[must_use]
pub fn snapshot() -> Vec<CallFrame> {
    STATE.with(|state| state.borrow().frames.clone())
}

/// Installs the error configuration for the current thread.
pub fn configure(config: ErrorConfig) {
    log::debug!("error configuration set to {config:?}");
    STATE.with(|state| state.borrow_mut().config = config);
}

/// Returns the error configuration active on the current thread.
#[must_use]
pub fn config() -> ErrorConfig {
    STATE.with(|state| state.borrow().config.clone())
}

pub(crate) struct Capture {
    pub position: String,
    pub traceback: String,
    pub position_prefix: bool,
}

/// Resolves `level` to a position and snapshots the traceback.
pub(crate) fn capture(level: u32) -> Capture {
    STATE.with(|state| {
        let state = state.borrow();
        let frames = &state.frames;

        let position = blamed_frame(frames, level)
            .and_then(CallFrame::position)
            .unwrap_or_default();

        let traceback = if state.config.capture_traceback {
            format_traceback(frames, state.config.max_traceback_frames)
        } else {
            String::new()
        };

        Capture {
            position,
            traceback,
            position_prefix: state.config.position_prefix,
        }
    })
}

fn blamed_frame(frames: &[CallFrame], level: u32) -> Option<&CallFrame> {
    if level == 0 {
        return None;
    }

    let skip_native = usize::from(frames.last()?.kind == FrameKind::Native);
    let distance = skip_native + (level as usize - 1);
    frames.iter().rev().nth(distance)
}

fn format_traceback(frames: &[CallFrame], limit: Option<usize>) -> String {
    let mut out = String::from(TRACEBACK_HEADER);
    let shown = limit.unwrap_or(frames.len()).min(frames.len());

    for frame in frames.iter().rev().take(shown) {
        out.push_str("\n\t");
        out.push_str(&frame.describe());
    }

    let skipped = frames.len() - shown;
    if skipped > 0 {
        out.push_str(&format!("\n\t...\t(skipping {skipped} levels)"));
    }
    out
}
