//! Seams between the pipeline and the host operating system.
//!
//! Sessions talk to the host exclusively through the traits in this module:
//!
//! - [`HookFacility`] installs, removes and chains native hooks.
//! - [`KeyboardHost`] answers the key-state and decode queries the keyboard
//!   pipeline needs.
//! - [`MessagePump`] runs the thread message loop that hook callbacks are
//!   delivered through.
//!
//! `hookstream-windows` implements all three over Win32. [`crate::mock`]
//! implements them in-process for tests.

use std::fmt;
use std::rc::Weak;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::Point;
use crate::keymap::Key;
use crate::pipeline::{ModifierBuffer, RawSignal};

// ── Hook kinds and errors ─────────────────────────────────────────────────────

/// The two global hook kinds a session can own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    Keyboard,
    Mouse,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::Keyboard => write!(f, "keyboard"),
            HookKind::Mouse => write!(f, "mouse"),
        }
    }
}

/// Errors reported by sessions and hook facilities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HookError {
    /// The host refused to install the hook (privileges, session type, ...).
    #[error("failed to install {kind} hook: {reason}")]
    Install { kind: HookKind, reason: String },

    /// This thread already owns a hook of the same kind.
    #[error("a {0} hook is already installed on this thread")]
    AlreadyInstalled(HookKind),

    #[error("failed to uninstall hook: {0}")]
    Uninstall(String),

    /// The session (or app) has been disposed.
    #[error("session has been disposed")]
    Disposed,

    /// The listener registry was modified from inside one of its listeners.
    #[error("listener registry is in use by a running dispatch")]
    RegistryBusy,

    /// `run` was called while the message loop is already running.
    #[error("message loop is already running")]
    LoopRunning,
}

// ── Hook facility ─────────────────────────────────────────────────────────────

/// The session side of a native hook callback.
pub trait SignalSink {
    /// Handles one raw signal and returns the native callback result:
    /// [`crate::pipeline::SWALLOW`] or whatever forwarding returned.
    fn on_signal(&self, code: i32, signal: &RawSignal) -> isize;
}

/// Installs and chains native global hooks.
///
/// Every method must be called on the thread that will run the message loop;
/// callbacks for a hook are delivered only to the thread that installed it.
pub trait HookFacility {
    /// Native hook handle.
    type Handle: Copy + fmt::Debug;

    /// Installs a hook of `kind` that delivers every raw signal to `sink`.
    ///
    /// The facility must forward signals itself once `sink` can no longer be
    /// upgraded.
    fn install(&self, kind: HookKind, sink: Weak<dyn SignalSink>) -> Result<Self::Handle, HookError>;

    /// Removes a hook installed by [`Self::install`].
    fn uninstall(&self, handle: Self::Handle) -> Result<(), HookError>;

    /// Passes a signal to the next hook in the chain, unchanged.
    fn forward(&self, handle: Option<Self::Handle>, code: i32, signal: &RawSignal) -> isize;
}

// ── Keyboard queries ──────────────────────────────────────────────────────────

/// Key-state and character-decoding queries.
#[cfg_attr(test, mockall::automock)]
pub trait KeyboardHost {
    /// Decodes `key` at the current layout into `out`.
    ///
    /// Returns the number of UTF-16 units written, `0` if the key produces
    /// nothing, or a negative value if a dead key is now pending. Stateful:
    /// each call consumes and updates the host's dead-key composition.
    fn decode_characters(
        &self,
        key: Key,
        scan_code: u32,
        modifiers: &ModifierBuffer,
        out: &mut [u16],
    ) -> i32;

    /// Host key-state word for `key`; the low bit is the toggle state.
    fn query_key_toggle_state(&self, key: Key) -> i16;

    /// Whether `key` is physically pressed right now.
    fn query_key_pressed(&self, key: Key) -> bool;
}

// ── Message pump ──────────────────────────────────────────────────────────────

/// One message retrieved from the thread's message queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadMessage {
    pub message: u32,
    pub wparam: usize,
    pub lparam: isize,
    pub time: u32,
    pub pt: Point,
}

/// A `Send` handle that stops a message loop from another thread.
#[derive(Clone)]
pub struct QuitHandle {
    post: Arc<dyn Fn() + Send + Sync>,
}

impl QuitHandle {
    pub fn new(post: impl Fn() + Send + Sync + 'static) -> Self {
        Self { post: Arc::new(post) }
    }

    /// Asks the owning message loop to exit.
    pub fn quit(&self) {
        (self.post)();
    }
}

impl fmt::Debug for QuitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuitHandle").finish_non_exhaustive()
    }
}

/// The calling thread's message loop.
pub trait MessagePump {
    /// Retrieves and dispatches messages until the quit message arrives,
    /// passing each to `on_message` after dispatch.
    fn run(&self, on_message: &mut dyn FnMut(&ThreadMessage));

    /// Dispatches every message already queued, stopping short of a quit
    /// message so that [`Self::run`] still sees it.
    fn pump_pending(&self, on_message: &mut dyn FnMut(&ThreadMessage));

    /// Posts the quit message to this thread.
    fn post_quit(&self);

    /// A handle that posts the quit message to this thread from anywhere.
    fn quit_handle(&self) -> QuitHandle;
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_install_error_names_kind_and_reason() {
        let err = HookError::Install {
            kind: HookKind::Mouse,
            reason: "access denied".to_string(),
        };
        assert_eq!(err.to_string(), "failed to install mouse hook: access denied");
        assert_eq!(
            HookError::AlreadyInstalled(HookKind::Keyboard).to_string(),
            "a keyboard hook is already installed on this thread"
        );
    }

    #[test]
    fn test_quit_handle_is_send_and_shares_callback() {
        // Arrange
        let posted = Arc::new(AtomicUsize::new(0));
        let handle = {
            let posted = Arc::clone(&posted);
            QuitHandle::new(move || {
                posted.fetch_add(1, Ordering::SeqCst);
            })
        };
        let clone = handle.clone();

        // Act
        std::thread::spawn(move || clone.quit())
            .join()
            .expect("quit thread panicked");
        handle.quit();

        // Assert
        assert_eq!(posted.load(Ordering::SeqCst), 2);
    }
}
