//! Raw records delivered by the hook facility.
//!
//! A [`RawSignal`] lives for exactly one callback invocation. It carries the
//! decoded fields the classifiers need plus the untouched native arguments so
//! the facility can pass the original call down the hook chain.

use crate::domain::Point;
use crate::keymap::Key;

/// The only hook code that carries an event to process. Any other code must
/// be passed down the chain untouched.
pub const HC_ACTION: i32 = 0;

/// Callback return value that swallows the event.
pub const SWALLOW: isize = 1;

/// Message ids reported by the keyboard and mouse hooks.
pub mod message {
    pub const WM_KEYDOWN: u32 = 0x0100;
    pub const WM_KEYUP: u32 = 0x0101;
    pub const WM_SYSKEYDOWN: u32 = 0x0104;
    pub const WM_SYSKEYUP: u32 = 0x0105;

    pub const WM_MOUSEMOVE: u32 = 0x0200;
    pub const WM_LBUTTONDOWN: u32 = 0x0201;
    pub const WM_LBUTTONUP: u32 = 0x0202;
    pub const WM_RBUTTONDOWN: u32 = 0x0204;
    pub const WM_RBUTTONUP: u32 = 0x0205;
    pub const WM_MBUTTONDOWN: u32 = 0x0207;
    pub const WM_MBUTTONUP: u32 = 0x0208;
    pub const WM_MOUSEWHEEL: u32 = 0x020A;
    pub const WM_XBUTTONDOWN: u32 = 0x020B;
    pub const WM_XBUTTONUP: u32 = 0x020C;
    pub const WM_MOUSEHWHEEL: u32 = 0x020E;

    pub const WM_QUIT: u32 = 0x0012;
}

/// The native callback arguments, kept verbatim for forwarding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NativeArgs {
    pub wparam: usize,
    pub lparam: isize,
}

/// Source-specific payload of a raw signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalData {
    Keyboard {
        key: Key,
        scan_code: u32,
        flags: u32,
        time_ms: u32,
    },
    Mouse {
        point: Point,
        /// High word holds the wheel delta or extended-button index.
        mouse_data: u32,
        flags: u32,
        time_ms: u32,
    },
}

/// One untyped record from the hook facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSignal {
    /// Message id (`WM_KEYDOWN`, `WM_MOUSEMOVE`, ...).
    pub message: u32,
    pub data: SignalData,
    pub native: NativeArgs,
}

impl RawSignal {
    /// Builds a keyboard signal with no flags and a zero timestamp.
    pub fn keyboard(message: u32, key: Key, scan_code: u32) -> Self {
        Self {
            message,
            data: SignalData::Keyboard {
                key,
                scan_code,
                flags: 0,
                time_ms: 0,
            },
            native: NativeArgs {
                wparam: message as usize,
                lparam: 0,
            },
        }
    }

    /// Builds a mouse signal with no flags and a zero timestamp.
    pub fn mouse(message: u32, point: Point, mouse_data: u32) -> Self {
        Self {
            message,
            data: SignalData::Mouse {
                point,
                mouse_data,
                flags: 0,
                time_ms: 0,
            },
            native: NativeArgs {
                wparam: message as usize,
                lparam: 0,
            },
        }
    }
}
