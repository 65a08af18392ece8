//! Hook sessions: the owners of native hooks and their listener registries.
//!
//! - [`KeyboardSession`] / [`MouseSession`] – one global hook each, driven by
//!   whatever message loop the calling thread already runs.
//! - [`HookApp`] – a session plus its own message loop, for programs that
//!   have none.

pub mod app;
pub mod keyboard;
pub mod lifecycle;
mod link;
pub mod mouse;

pub use app::HookApp;
pub use keyboard::KeyboardSession;
pub use lifecycle::{Lifecycle, SessionState};
pub use mouse::MouseSession;

use crate::facility::HookError;

/// What [`HookApp`] needs from a session.
pub trait EventSource {
    /// Starts delivering events. Fails after disposal.
    fn start(&self) -> Result<(), HookError>;

    /// Stops delivering events. Fails after disposal.
    fn pause(&self) -> Result<(), HookError>;

    /// Releases the native hook. Idempotent and infallible.
    fn dispose(&self);

    fn is_active(&self) -> bool;

    fn is_disposed(&self) -> bool;
}
