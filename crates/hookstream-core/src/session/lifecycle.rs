//! The Paused / Active / Disposed state machine shared by every session.

use std::cell::Cell;

use crate::facility::HookError;

/// Observable session state. A session is installed for its whole life, so
/// there is no "uninstalled" state to observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Paused,
    Active,
    /// Terminal.
    Disposed,
}

/// Session state with the transition rules enforced.
#[derive(Debug)]
pub struct Lifecycle {
    state: Cell<SessionState>,
}

impl Lifecycle {
    /// A freshly installed session starts paused.
    pub fn new() -> Self {
        Self {
            state: Cell::new(SessionState::Paused),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    /// Paused → Active. Returns `Ok(true)` if the state changed.
    pub fn start(&self) -> Result<bool, HookError> {
        self.transition(SessionState::Active)
    }

    /// Active → Paused. Returns `Ok(true)` if the state changed.
    pub fn pause(&self) -> Result<bool, HookError> {
        self.transition(SessionState::Paused)
    }

    /// Moves to Disposed. Returns `true` only on the first call.
    pub fn dispose(&self) -> bool {
        self.state.replace(SessionState::Disposed) != SessionState::Disposed
    }

    pub fn is_active(&self) -> bool {
        self.state.get() == SessionState::Active
    }

    pub fn is_disposed(&self) -> bool {
        self.state.get() == SessionState::Disposed
    }

    fn transition(&self, target: SessionState) -> Result<bool, HookError> {
        match self.state.get() {
            SessionState::Disposed => Err(HookError::Disposed),
            current if current == target => Ok(false),
            _ => {
                self.state.set(target);
                Ok(true)
            }
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
