//! Error reporting configuration.
//!
//! [`ErrorConfig`] controls what a raised [`crate::Error`] captures from the
//! registered call stack: whether a traceback snapshot is taken, how many
//! frames it may hold, and whether the blamed source position is prefixed to
//! the rendered message.
//!
//! # Configuration Presets
//!
//! - [`ErrorConfig::default()`] - Position prefix plus a bounded traceback
//! - [`ErrorConfig::full()`] - Position prefix plus an unbounded traceback
//! - [`ErrorConfig::minimal()`] - Bare messages, no traceback capture
//!
//! The active configuration is per native thread and is installed with
//! [`crate::callstack::configure`].
//!
//! # Example
//!
//! ```rust
//! use luavalue::{callstack, ErrorConfig};
//!
//! callstack::configure(ErrorConfig::default().with_max_traceback_frames(Some(8)));
//! assert_eq!(callstack::config().max_traceback_frames, Some(8));
//! ```

/// Number of traceback frames kept by the default configuration.
pub const DEFAULT_TRACEBACK_FRAMES: usize = 22;

/// Controls what raised errors capture from the call stack.
///
/// # Default Configuration
///
/// - Traceback capture enabled, bounded to [`DEFAULT_TRACEBACK_FRAMES`] frames
/// - Source position prefixed to messages
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorConfig {
    /// Whether a traceback snapshot is captured when an error is raised.
    pub capture_traceback: bool,

    /// Maximum number of frames listed in a traceback, `None` for no limit.
    ///
    /// When the stack is deeper, the innermost frames are listed followed by a
    /// marker line with the number of skipped levels.
    pub max_traceback_frames: Option<usize>,

    /// Whether the blamed `source:line` position prefixes the rendered message.
    pub position_prefix: bool,
}

impl Default for ErrorConfig {
    fn default() -> Self {
        ErrorConfig {
            capture_traceback: true,
            max_traceback_frames: Some(DEFAULT_TRACEBACK_FRAMES),
            position_prefix: true,
        }
    }
}

impl ErrorConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset that captures every frame of the call stack.
    #[must_use]
    pub fn full() -> Self {
        ErrorConfig {
            max_traceback_frames: None,
            ..Self::default()
        }
    }

    /// Preset for hosts that only want the bare failure detail.
    ///
    /// No traceback is captured and messages carry no position prefix. The
    /// blamed position is still recorded on the error.
    #[must_use]
    pub fn minimal() -> Self {
        ErrorConfig {
            capture_traceback: false,
            max_traceback_frames: Some(0),
            position_prefix: false,
        }
    }

    /// Enables or disables traceback capture.
    #[must_use]
    pub fn with_capture_traceback(mut self, enabled: bool) -> Self {
        self.capture_traceback = enabled;
        self
    }

    /// Sets the traceback frame limit.
    #[must_use]
    pub fn with_max_traceback_frames(mut self, limit: Option<usize>) -> Self {
        self.max_traceback_frames = limit;
        self
    }

    /// Enables or disables the position prefix on messages.
    #[must_use]
    pub fn with_position_prefix(mut self, enabled: bool) -> Self {
        self.position_prefix = enabled;
        self
    }
}
