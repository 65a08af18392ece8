//! Virtual key codes as delivered by the keyboard hook.
//!
//! A [`Key`] is the host's *virtual* key code: it names a logical key rather
//! than a physical position, so `Key::A` is 0x41 on every layout. The hook
//! reports codes in the range 0x01–0xFE; a `u8` newtype covers all of them and
//! keeps the held-key set compact.
//!
//! Modifiers come in three flavours. The low-level hook always reports the
//! side-specific code (`LSHIFT`, `RCONTROL`, ...), while synthetic input and
//! some drivers report the generic one (`SHIFT`, `CONTROL`, `MENU`). Every
//! modifier query in this crate accepts all three.

mod names;

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub use names::key_name;

/// Error returned when a key name cannot be resolved.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseKeyError {
    #[error("empty key name")]
    Empty,
    #[error("unknown key name: {0:?}")]
    Unknown(String),
}

/// A virtual key code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(pub u8);

impl Key {
    pub const LBUTTON: Key = Key(0x01);
    pub const RBUTTON: Key = Key(0x02);
    pub const CANCEL: Key = Key(0x03);
    pub const MBUTTON: Key = Key(0x04);
    pub const XBUTTON1: Key = Key(0x05);
    pub const XBUTTON2: Key = Key(0x06);
    pub const BACK: Key = Key(0x08);
    pub const TAB: Key = Key(0x09);
    pub const CLEAR: Key = Key(0x0C);
    pub const RETURN: Key = Key(0x0D);
    pub const SHIFT: Key = Key(0x10);
    pub const CONTROL: Key = Key(0x11);
    pub const MENU: Key = Key(0x12);
    pub const PAUSE: Key = Key(0x13);
    pub const CAPITAL: Key = Key(0x14);
    pub const ESCAPE: Key = Key(0x1B);
    pub const SPACE: Key = Key(0x20);
    pub const PRIOR: Key = Key(0x21);
    pub const NEXT: Key = Key(0x22);
    pub const END: Key = Key(0x23);
    pub const HOME: Key = Key(0x24);
    pub const LEFT: Key = Key(0x25);
    pub const UP: Key = Key(0x26);
    pub const RIGHT: Key = Key(0x27);
    pub const DOWN: Key = Key(0x28);
    pub const SNAPSHOT: Key = Key(0x2C);
    pub const INSERT: Key = Key(0x2D);
    pub const DELETE: Key = Key(0x2E);

    pub const D0: Key = Key(0x30);
    pub const D1: Key = Key(0x31);
    pub const D2: Key = Key(0x32);
    pub const D3: Key = Key(0x33);
    pub const D4: Key = Key(0x34);
    pub const D5: Key = Key(0x35);
    pub const D6: Key = Key(0x36);
    pub const D7: Key = Key(0x37);
    pub const D8: Key = Key(0x38);
    pub const D9: Key = Key(0x39);

    pub const A: Key = Key(0x41);
    pub const B: Key = Key(0x42);
    pub const C: Key = Key(0x43);
    pub const D: Key = Key(0x44);
    pub const E: Key = Key(0x45);
    pub const F: Key = Key(0x46);
    pub const G: Key = Key(0x47);
    pub const H: Key = Key(0x48);
    pub const I: Key = Key(0x49);
    pub const J: Key = Key(0x4A);
    pub const K: Key = Key(0x4B);
    pub const L: Key = Key(0x4C);
    pub const M: Key = Key(0x4D);
    pub const N: Key = Key(0x4E);
    pub const O: Key = Key(0x4F);
    pub const P: Key = Key(0x50);
    pub const Q: Key = Key(0x51);
    pub const R: Key = Key(0x52);
    pub const S: Key = Key(0x53);
    pub const T: Key = Key(0x54);
    pub const U: Key = Key(0x55);
    pub const V: Key = Key(0x56);
    pub const W: Key = Key(0x57);
    pub const X: Key = Key(0x58);
    pub const Y: Key = Key(0x59);
    pub const Z: Key = Key(0x5A);

    pub const LWIN: Key = Key(0x5B);
    pub const RWIN: Key = Key(0x5C);
    pub const APPS: Key = Key(0x5D);

    pub const NUMPAD0: Key = Key(0x60);
    pub const NUMPAD1: Key = Key(0x61);
    pub const NUMPAD2: Key = Key(0x62);
    pub const NUMPAD3: Key = Key(0x63);
    pub const NUMPAD4: Key = Key(0x64);
    pub const NUMPAD5: Key = Key(0x65);
    pub const NUMPAD6: Key = Key(0x66);
    pub const NUMPAD7: Key = Key(0x67);
    pub const NUMPAD8: Key = Key(0x68);
    pub const NUMPAD9: Key = Key(0x69);
    pub const MULTIPLY: Key = Key(0x6A);
    pub const ADD: Key = Key(0x6B);
    pub const SEPARATOR: Key = Key(0x6C);
    pub const SUBTRACT: Key = Key(0x6D);
    pub const DECIMAL: Key = Key(0x6E);
    pub const DIVIDE: Key = Key(0x6F);

    pub const F1: Key = Key(0x70);
    pub const F2: Key = Key(0x71);
    pub const F3: Key = Key(0x72);
    pub const F4: Key = Key(0x73);
    pub const F5: Key = Key(0x74);
    pub const F6: Key = Key(0x75);
    pub const F7: Key = Key(0x76);
    pub const F8: Key = Key(0x77);
    pub const F9: Key = Key(0x78);
    pub const F10: Key = Key(0x79);
    pub const F11: Key = Key(0x7A);
    pub const F12: Key = Key(0x7B);

    pub const NUMLOCK: Key = Key(0x90);
    pub const SCROLL: Key = Key(0x91);

    pub const LSHIFT: Key = Key(0xA0);
    pub const RSHIFT: Key = Key(0xA1);
    pub const LCONTROL: Key = Key(0xA2);
    pub const RCONTROL: Key = Key(0xA3);
    pub const LMENU: Key = Key(0xA4);
    pub const RMENU: Key = Key(0xA5);

    pub const VOLUME_MUTE: Key = Key(0xAD);
    pub const VOLUME_DOWN: Key = Key(0xAE);
    pub const VOLUME_UP: Key = Key(0xAF);
    pub const MEDIA_NEXT_TRACK: Key = Key(0xB0);
    pub const MEDIA_PREV_TRACK: Key = Key(0xB1);
    pub const MEDIA_STOP: Key = Key(0xB2);
    pub const MEDIA_PLAY_PAUSE: Key = Key(0xB3);

    pub const OEM_1: Key = Key(0xBA);
    pub const OEM_PLUS: Key = Key(0xBB);
    pub const OEM_COMMA: Key = Key(0xBC);
    pub const OEM_MINUS: Key = Key(0xBD);
    pub const OEM_PERIOD: Key = Key(0xBE);
    pub const OEM_2: Key = Key(0xBF);
    pub const OEM_3: Key = Key(0xC0);
    pub const OEM_4: Key = Key(0xDB);
    pub const OEM_5: Key = Key(0xDC);
    pub const OEM_6: Key = Key(0xDD);
    pub const OEM_7: Key = Key(0xDE);
    pub const OEM_102: Key = Key(0xE2);

    /// Generic and side-specific Shift codes.
    pub const SHIFT_KEYS: [Key; 3] = [Key::SHIFT, Key::LSHIFT, Key::RSHIFT];
    /// Generic and side-specific Control codes.
    pub const CONTROL_KEYS: [Key; 3] = [Key::CONTROL, Key::LCONTROL, Key::RCONTROL];
    /// Generic and side-specific Alt codes.
    pub const ALT_KEYS: [Key; 3] = [Key::MENU, Key::LMENU, Key::RMENU];
    /// Windows keys. There is no generic code for these.
    pub const WIN_KEYS: [Key; 2] = [Key::LWIN, Key::RWIN];

    /// Returns the raw virtual key code.
    pub const fn code(self) -> u8 {
        self.0
    }

    /// Returns the display name of this key, if it has one.
    pub fn name(self) -> Option<&'static str> {
        key_name(self.0)
    }

    /// `true` for any Shift, Control, Alt or Windows key.
    pub fn is_modifier(self) -> bool {
        Key::SHIFT_KEYS.contains(&self)
            || Key::CONTROL_KEYS.contains(&self)
            || Key::ALT_KEYS.contains(&self)
            || Key::WIN_KEYS.contains(&self)
    }

    /// Resolves a key from its display name or a common alias.
    ///
    /// Matching is case-insensitive. `0x41`-style hex literals are accepted
    /// for keys without a name.
    pub fn from_name(name: &str) -> Result<Key, ParseKeyError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ParseKeyError::Empty);
        }

        let alias = match name.to_ascii_lowercase().as_str() {
            "ctrl" | "control" | "ctl" => Some(Key::CONTROL),
            "alt" | "menu" => Some(Key::MENU),
            "win" | "meta" | "super" | "cmd" => Some(Key::LWIN),
            "esc" => Some(Key::ESCAPE),
            "return" => Some(Key::RETURN),
            "del" => Some(Key::DELETE),
            "ins" => Some(Key::INSERT),
            "pgup" | "prior" => Some(Key::PRIOR),
            "pgdn" | "next" => Some(Key::NEXT),
            "capital" | "caps" => Some(Key::CAPITAL),
            "plus" => Some(Key::OEM_PLUS),
            "back" => Some(Key::BACK),
            _ => None,
        };
        if let Some(key) = alias {
            return Ok(key);
        }

        if let Some(hex) = name.strip_prefix("0x").or_else(|| name.strip_prefix("0X")) {
            return u8::from_str_radix(hex, 16)
                .map(Key)
                .map_err(|_| ParseKeyError::Unknown(name.to_string()));
        }

        names::find_by_name(name)
            .map(Key)
            .ok_or_else(|| ParseKeyError::Unknown(name.to_string()))
    }
}

impl From<u8> for Key {
    fn from(code: u8) -> Self {
        Key(code)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:02X}", self.0),
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({self})")
    }
}

impl FromStr for Key {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::from_name(s)
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl Visitor<'_> for KeyVisitor {
            type Value = Key;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a key name or a virtual key code")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Key, E> {
                Key::from_name(v).map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Key, E> {
                u8::try_from(v)
                    .map(Key)
                    .map_err(|_| E::custom(format!("virtual key code out of range: {v}")))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Key, E> {
                u8::try_from(v)
                    .map(Key)
                    .map_err(|_| E::custom(format!("virtual key code out of range: {v}")))
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}
