//! Character resolution for key presses.
//!
//! The host's decode primitive wants a full 256-entry virtual keyboard image,
//! but only four entries ever matter here: Shift, Ctrl and Alt (from the
//! held-key snapshot) and CapsLock (a toggle, queried from the host at resolve
//! time). [`CharacterResolver`] owns one such image and rewrites those four
//! entries on every call instead of building a fresh array.
//!
//! # Hazard
//!
//! The decode primitive is stateful: a dead key leaves composition state
//! behind that the next decode consumes. Resolution must therefore happen
//! synchronously, inside the callback that received the signal, and in the
//! order signals arrive.

use tracing::trace;

use crate::domain::KeyboardState;
use crate::facility::KeyboardHost;
use crate::keymap::Key;

/// Maximum number of UTF-16 units a single keystroke decodes to.
pub const CHAR_CAPACITY: usize = 8;

/// A virtual keyboard image in the host's format: one byte per key code,
/// high bit = down, low bit = toggled.
#[derive(Clone, PartialEq, Eq)]
pub struct ModifierBuffer {
    bytes: [u8; 256],
}

impl ModifierBuffer {
    pub const DOWN: u8 = 0x80;
    pub const TOGGLED: u8 = 0x01;

    pub fn new() -> Self {
        Self { bytes: [0; 256] }
    }

    pub fn get(&self, key: Key) -> u8 {
        self.bytes[usize::from(key.code())]
    }

    pub fn set(&mut self, key: Key, value: u8) {
        self.bytes[usize::from(key.code())] = value;
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.get(key) & Self::DOWN != 0
    }

    pub fn is_toggled(&self, key: Key) -> bool {
        self.get(key) & Self::TOGGLED != 0
    }

    /// The raw image, for passing to the host.
    pub fn as_bytes(&self) -> &[u8; 256] {
        &self.bytes
    }

    /// Writes the modifier entries for `state` and the CapsLock toggle.
    fn load(&mut self, state: &KeyboardState, caps_lock: bool) {
        let down = |held: bool| if held { Self::DOWN } else { 0 };
        self.set(Key::SHIFT, down(state.shift()));
        self.set(Key::CONTROL, down(state.ctrl()));
        self.set(Key::MENU, down(state.alt()));
        self.set(Key::CAPITAL, if caps_lock { Self::TOGGLED } else { 0 });
    }
}

impl Default for ModifierBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ModifierBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set: Vec<_> = (0..=u8::MAX)
            .map(Key)
            .filter(|&k| self.get(k) != 0)
            .map(|k| (k, self.get(k)))
            .collect();
        f.debug_struct("ModifierBuffer").field("set", &set).finish()
    }
}

/// Turns a key press into the text it types, using the host's current layout.
///
/// One resolver belongs to one keyboard session and is only used from that
/// session's callback.
#[derive(Debug, Default)]
pub struct CharacterResolver {
    buffer: ModifierBuffer,
    chars: [u16; CHAR_CAPACITY],
}

impl CharacterResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `key` under the modifiers in `state`.
    ///
    /// A non-positive decode result (dead key pending, or nothing printable)
    /// yields an empty string. A positive result `n` yields the first `n`
    /// decoded units.
    pub fn resolve<H>(&mut self, host: &H, key: Key, scan_code: u32, state: &KeyboardState) -> String
    where
        H: KeyboardHost + ?Sized,
    {
        let caps_lock = host.query_key_toggle_state(Key::CAPITAL) & 1 != 0;
        self.buffer.load(state, caps_lock);

        let n = host.decode_characters(key, scan_code, &self.buffer, &mut self.chars);
        if n <= 0 {
            trace!(%key, n, "no characters decoded");
            return String::new();
        }
        let len = (n as usize).min(CHAR_CAPACITY);
        String::from_utf16_lossy(&self.chars[..len])
    }

    /// The image passed to the host on the last call.
    pub fn buffer(&self) -> &ModifierBuffer {
        &self.buffer
    }
}
