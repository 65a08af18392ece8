//! Layout-aware key decoding and key-state queries.

use hookstream_core::pipeline::ModifierBuffer;
use hookstream_core::{Key, KeyboardHost};
use windows::Win32::UI::Input::KeyboardAndMouse::{GetAsyncKeyState, GetKeyState, ToUnicode};

use crate::WindowsHost;

/// `ToUnicode` flag: leave the kernel keyboard state (including any pending
/// dead key) untouched so the focused application still composes correctly.
const KEEP_KEYBOARD_STATE: u32 = 0x4;

impl KeyboardHost for WindowsHost {
    fn decode_characters(
        &self,
        key: Key,
        scan_code: u32,
        modifiers: &ModifierBuffer,
        out: &mut [u16],
    ) -> i32 {
        // SAFETY: the modifier buffer is exactly 256 bytes and `out` is a
        // valid, writable UTF-16 buffer for the duration of the call.
        unsafe {
            ToUnicode(
                u32::from(key.code()),
                scan_code,
                Some(modifiers.as_bytes()),
                out,
                KEEP_KEYBOARD_STATE,
            )
        }
    }

    fn query_key_toggle_state(&self, key: Key) -> i16 {
        // SAFETY: GetKeyState only reads the calling thread's key state.
        unsafe { GetKeyState(i32::from(key.code())) }
    }

    fn query_key_pressed(&self, key: Key) -> bool {
        // SAFETY: GetAsyncKeyState reads the physical key state; the high bit
        // (negative value) means the key is down right now.
        unsafe { GetAsyncKeyState(i32::from(key.code())) < 0 }
    }
}
