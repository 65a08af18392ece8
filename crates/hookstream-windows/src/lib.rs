//! Win32 backend for hookstream.
//!
//! [`WindowsHost`] implements every host seam the core sessions need:
//!
//! - [`HookFacility`](hookstream_core::HookFacility) over `WH_KEYBOARD_LL` /
//!   `WH_MOUSE_LL` (see [`hook`])
//! - [`KeyboardHost`](hookstream_core::KeyboardHost) over `ToUnicode`,
//!   `GetKeyState` and `GetAsyncKeyState` (see [`keyboard`])
//! - [`MessagePump`](hookstream_core::MessagePump) over the thread message
//!   queue (see [`pump`])
//!
//! Low-level hooks are delivered on the thread that installed them, and only
//! while that thread pumps messages. Sessions built on a `WindowsHost` must
//! therefore be created and driven on one thread; the core session types are
//! `!Send` to enforce this.
//!
//! # Safety
//!
//! This crate uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

pub mod hook;
pub mod keyboard;
pub mod pump;

/// The Win32 host. Stateless: per-thread hook routes live in thread-local
/// storage inside [`hook`], so copies of this value are interchangeable.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsHost;

impl WindowsHost {
    pub fn new() -> Self {
        Self
    }
}
