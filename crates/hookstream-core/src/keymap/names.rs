//! Display names for virtual key codes.
//!
//! `KEY_NAMES` is a compile-time array of 256 entries indexed by virtual key
//! code, so naming a key on the hot path is a single O(1) lookup. Codes the
//! host leaves unassigned or reserved store `None`.
//!
//! Reference: https://learn.microsoft.com/windows/win32/inputdev/virtual-key-codes

/// Returns the display name for a virtual key code, if it has one.
pub fn key_name(code: u8) -> Option<&'static str> {
    KEY_NAMES[code as usize]
}

/// Reverse lookup, case-insensitive.
///
/// Linear scan is fine here: names are only parsed from configuration, never
/// inside the hook callback.
pub(crate) fn find_by_name(name: &str) -> Option<u8> {
    KEY_NAMES
        .iter()
        .position(|entry| entry.is_some_and(|n| n.eq_ignore_ascii_case(name)))
        .map(|idx| idx as u8)
}

const LETTERS: [&str; 26] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R",
    "S", "T", "U", "V", "W", "X", "Y", "Z",
];

const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

const NUMPAD: [&str; 10] = [
    "Numpad0", "Numpad1", "Numpad2", "Numpad3", "Numpad4", "Numpad5", "Numpad6", "Numpad7",
    "Numpad8", "Numpad9",
];

const FUNCTION: [&str; 24] = [
    "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10", "F11", "F12", "F13", "F14",
    "F15", "F16", "F17", "F18", "F19", "F20", "F21", "F22", "F23", "F24",
];

const KEY_NAMES: [Option<&str>; 256] = {
    let mut t: [Option<&str>; 256] = [None; 256];

    // ── Mouse buttons (reported through key-state queries, never by the hook) ─
    t[0x01] = Some("LButton");
    t[0x02] = Some("RButton");
    t[0x03] = Some("Cancel");
    t[0x04] = Some("MButton");
    t[0x05] = Some("XButton1");
    t[0x06] = Some("XButton2");

    // ── Control keys ─────────────────────────────────────────────────────────
    t[0x08] = Some("Backspace"); // VK_BACK
    t[0x09] = Some("Tab");
    t[0x0C] = Some("Clear");
    t[0x0D] = Some("Enter"); // VK_RETURN
    t[0x10] = Some("Shift");
    t[0x11] = Some("Control");
    t[0x12] = Some("Menu"); // Alt
    t[0x13] = Some("Pause");
    t[0x14] = Some("CapsLock"); // VK_CAPITAL
    t[0x1B] = Some("Escape");
    t[0x20] = Some("Space");

    // ── Navigation ───────────────────────────────────────────────────────────
    t[0x21] = Some("PageUp"); // VK_PRIOR
    t[0x22] = Some("PageDown"); // VK_NEXT
    t[0x23] = Some("End");
    t[0x24] = Some("Home");
    t[0x25] = Some("Left");
    t[0x26] = Some("Up");
    t[0x27] = Some("Right");
    t[0x28] = Some("Down");
    t[0x2C] = Some("PrintScreen"); // VK_SNAPSHOT
    t[0x2D] = Some("Insert");
    t[0x2E] = Some("Delete");

    // ── Digits (0x30–0x39) and letters (0x41–0x5A) ───────────────────────────
    let mut i = 0;
    while i < DIGITS.len() {
        t[0x30 + i] = Some(DIGITS[i]);
        i += 1;
    }
    let mut i = 0;
    while i < LETTERS.len() {
        t[0x41 + i] = Some(LETTERS[i]);
        i += 1;
    }

    // ── Windows keys ─────────────────────────────────────────────────────────
    t[0x5B] = Some("LWin");
    t[0x5C] = Some("RWin");
    t[0x5D] = Some("Apps");

    // ── Numpad ───────────────────────────────────────────────────────────────
    let mut i = 0;
    while i < NUMPAD.len() {
        t[0x60 + i] = Some(NUMPAD[i]);
        i += 1;
    }
    t[0x6A] = Some("NumpadMultiply");
    t[0x6B] = Some("NumpadAdd");
    t[0x6C] = Some("NumpadSeparator");
    t[0x6D] = Some("NumpadSubtract");
    t[0x6E] = Some("NumpadDecimal");
    t[0x6F] = Some("NumpadDivide");

    // ── Function keys (0x70–0x87) ────────────────────────────────────────────
    let mut i = 0;
    while i < FUNCTION.len() {
        t[0x70 + i] = Some(FUNCTION[i]);
        i += 1;
    }

    // ── Locks ────────────────────────────────────────────────────────────────
    t[0x90] = Some("NumLock");
    t[0x91] = Some("ScrollLock");

    // ── Side-specific modifiers ──────────────────────────────────────────────
    t[0xA0] = Some("LShift");
    t[0xA1] = Some("RShift");
    t[0xA2] = Some("LCtrl");
    t[0xA3] = Some("RCtrl");
    t[0xA4] = Some("LAlt"); // VK_LMENU
    t[0xA5] = Some("RAlt"); // VK_RMENU

    // ── Media ────────────────────────────────────────────────────────────────
    t[0xAD] = Some("VolumeMute");
    t[0xAE] = Some("VolumeDown");
    t[0xAF] = Some("VolumeUp");
    t[0xB0] = Some("MediaNext");
    t[0xB1] = Some("MediaPrev");
    t[0xB2] = Some("MediaStop");
    t[0xB3] = Some("MediaPlayPause");

    // ── Punctuation (US layout labels) ───────────────────────────────────────
    t[0xBA] = Some("Semicolon"); // VK_OEM_1
    t[0xBB] = Some("Equal"); // VK_OEM_PLUS
    t[0xBC] = Some("Comma");
    t[0xBD] = Some("Minus");
    t[0xBE] = Some("Period");
    t[0xBF] = Some("Slash"); // VK_OEM_2
    t[0xC0] = Some("Backquote"); // VK_OEM_3
    t[0xDB] = Some("BracketLeft"); // VK_OEM_4
    t[0xDC] = Some("Backslash"); // VK_OEM_5
    t[0xDD] = Some("BracketRight"); // VK_OEM_6
    t[0xDE] = Some("Quote"); // VK_OEM_7
    t[0xE2] = Some("IntlBackslash"); // VK_OEM_102

    t
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_26_letters_are_named() {
        for code in 0x41u8..=0x5A {
            let name = key_name(code).expect("letters must be named");
            assert_eq!(name.as_bytes(), [code]);
        }
    }

    #[test]
    fn test_function_keys_span_f1_to_f24() {
        assert_eq!(key_name(0x70), Some("F1"));
        assert_eq!(key_name(0x87), Some("F24"));
        assert_eq!(key_name(0x88), None);
    }

    #[test]
    fn test_names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for name in KEY_NAMES.iter().flatten() {
            assert!(seen.insert(name.to_ascii_lowercase()), "duplicate key name {name}");
        }
    }

    #[test]
    fn test_find_by_name_ignores_case() {
        assert_eq!(find_by_name("lshift"), Some(0xA0));
        assert_eq!(find_by_name("NUMPAD5"), Some(0x65));
        assert_eq!(find_by_name("nope"), None);
    }

    #[test]
    fn test_lookup_never_panics_for_any_u8() {
        for code in 0u8..=255 {
            let _ = key_name(code);
        }
    }
}
