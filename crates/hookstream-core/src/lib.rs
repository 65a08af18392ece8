//! # hookstream-core
//!
//! Platform-independent pipeline for global keyboard and mouse hooks:
//! raw signal → classification → character resolution → dispatch →
//! cancellation.
//!
//! This crate makes no OS calls. Everything it needs from the host goes
//! through the traits in [`facility`]; `hookstream-windows` implements them
//! over Win32 and [`mock`] implements them in-process for tests.
//!
//! # Architecture overview
//!
//! - **`keymap`** – virtual key codes ([`Key`]) with stable names.
//! - **`domain`** – plain data: the held-key set, keyboard snapshots, key
//!   combinations and the events listeners receive.
//! - **`pipeline`** – the per-signal hot path. The keyboard classifier infers
//!   Down / Hold / Up from the held-key set because the hook never reports
//!   auto-repeat; the resolver asks the host which characters a press types;
//!   the dispatcher runs listeners in order and reports whether any of them
//!   cancelled the event.
//! - **`session`** – [`KeyboardSession`] and [`MouseSession`] own one native
//!   hook each and translate the dispatch outcome into the callback result:
//!   a cancelled event is swallowed, anything else is passed down the hook
//!   chain. [`HookApp`] adds a message loop for programs without one.
//!
//! Sessions are thread-affine (`!Send`, `!Sync`). Callbacks arrive on the
//! installing thread, and only while it runs a message loop.

pub mod domain;
pub mod facility;
pub mod keymap;
pub mod mock;
pub mod pipeline;
pub mod session;

pub use domain::{
    HeldKeySet, KeyCombination, KeyTransition, KeyboardEvent, KeyboardState, ModifierState,
    MouseButton, MouseEvent, MouseEventKind, ParseComboError, Point, Requirement,
};
pub use facility::{
    HookError, HookFacility, HookKind, KeyboardHost, MessagePump, QuitHandle, SignalSink,
    ThreadMessage,
};
pub use keymap::{Key, ParseKeyError};
pub use pipeline::{ListenerId, RawSignal, SignalData, HC_ACTION, SWALLOW};
pub use session::{EventSource, HookApp, KeyboardSession, MouseSession, SessionState};
