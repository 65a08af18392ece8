//! Raw signal → structured event classification.
//!
//! # Keyboard
//!
//! The hook reports only "down" and "up". A key that is already in the
//! session's [`HeldKeySet`] and goes down again is auto-repeating, so the
//! classifier turns it into [`KeyTransition::Hold`]. An "up" always yields
//! [`KeyTransition::Up`] and removes the key, whether or not it was held.
//!
//! # Mouse
//!
//! A pure mapping from message id to kind, button and delta. Messages outside
//! the documented set become [`MouseEventKind::Special`] so vendor-specific
//! traffic is delivered instead of dropped.

use crate::domain::{HeldKeySet, KeyTransition, MouseButton, MouseEventKind};
use crate::keymap::Key;
use crate::pipeline::signal::message::*;

/// Family of a keyboard message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    Down,
    Up,
}

/// Classifies a keyboard message id. `None` for ids outside the hook's set.
pub fn key_direction(message: u32) -> Option<KeyDirection> {
    match message {
        WM_KEYDOWN | WM_SYSKEYDOWN => Some(KeyDirection::Down),
        WM_KEYUP | WM_SYSKEYUP => Some(KeyDirection::Up),
        _ => None,
    }
}

/// Derives the transition for `key` and updates `held` to match.
pub fn classify_key(direction: KeyDirection, key: Key, held: &mut HeldKeySet) -> KeyTransition {
    match direction {
        KeyDirection::Down => {
            if held.mark_down(key) {
                KeyTransition::Down
            } else {
                KeyTransition::Hold
            }
        }
        KeyDirection::Up => {
            held.mark_up(key);
            KeyTransition::Up
        }
    }
}

/// Result of classifying a mouse message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseClassification {
    pub kind: MouseEventKind,
    pub button: MouseButton,
    pub delta: i32,
}

impl MouseClassification {
    fn new(kind: MouseEventKind, button: MouseButton, delta: i32) -> Self {
        Self { kind, button, delta }
    }
}

/// Extracts the signed high word of the hook's `mouse_data` field.
pub fn high_word(mouse_data: u32) -> i16 {
    (mouse_data >> 16) as u16 as i16
}

/// Maps a mouse message and its `mouse_data` to kind, button and delta.
pub fn classify_mouse(message: u32, mouse_data: u32) -> MouseClassification {
    use MouseEventKind::*;

    match message {
        WM_MOUSEMOVE => MouseClassification::new(Move, MouseButton::None, 0),
        WM_LBUTTONDOWN => MouseClassification::new(ButtonDown, MouseButton::Left, 0),
        WM_LBUTTONUP => MouseClassification::new(ButtonUp, MouseButton::Left, 0),
        WM_RBUTTONDOWN => MouseClassification::new(ButtonDown, MouseButton::Right, 0),
        WM_RBUTTONUP => MouseClassification::new(ButtonUp, MouseButton::Right, 0),
        WM_MBUTTONDOWN => MouseClassification::new(ButtonDown, MouseButton::Middle, 0),
        WM_MBUTTONUP => MouseClassification::new(ButtonUp, MouseButton::Middle, 0),
        WM_MOUSEWHEEL => {
            MouseClassification::new(Scroll, MouseButton::Middle, i32::from(high_word(mouse_data)))
        }
        WM_MOUSEHWHEEL => MouseClassification::new(
            ScrollHorizontal,
            MouseButton::Middle,
            i32::from(high_word(mouse_data)),
        ),
        WM_XBUTTONDOWN | WM_XBUTTONUP => {
            let index = (mouse_data >> 16) as u16;
            let kind = if message == WM_XBUTTONDOWN { ButtonDown } else { ButtonUp };
            match MouseButton::from_extended_index(index) {
                Some(button) => MouseClassification::new(kind, button, i32::from(index)),
                None => MouseClassification::new(Special, MouseButton::None, 0),
            }
        }
        _ => MouseClassification::new(Special, MouseButton::None, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Keyboard ─────────────────────────────────────────────────────────────

    #[test]
    fn test_key_direction_covers_system_variants() {
        assert_eq!(key_direction(WM_KEYDOWN), Some(KeyDirection::Down));
        assert_eq!(key_direction(WM_SYSKEYDOWN), Some(KeyDirection::Down));
        assert_eq!(key_direction(WM_KEYUP), Some(KeyDirection::Up));
        assert_eq!(key_direction(WM_SYSKEYUP), Some(KeyDirection::Up));
        assert_eq!(key_direction(WM_MOUSEMOVE), None);
    }

    #[test]
    fn test_repeated_downs_yield_down_then_holds_then_up() {
        // Arrange
        let mut held = HeldKeySet::new();

        // Act
        let first = classify_key(KeyDirection::Down, Key::A, &mut held);
        let repeats: Vec<_> = (0..5)
            .map(|_| classify_key(KeyDirection::Down, Key::A, &mut held))
            .collect();
        let release = classify_key(KeyDirection::Up, Key::A, &mut held);

        // Assert
        assert_eq!(first, KeyTransition::Down);
        assert!(repeats.iter().all(|&t| t == KeyTransition::Hold));
        assert_eq!(release, KeyTransition::Up);
        assert!(!held.contains(Key::A));
    }

    #[test]
    fn test_up_for_unknown_key_still_yields_up() {
        let mut held = HeldKeySet::new();
        held.mark_down(Key::B);

        let transition = classify_key(KeyDirection::Up, Key::A, &mut held);

        assert_eq!(transition, KeyTransition::Up);
        assert!(held.contains(Key::B));
    }

    #[test]
    fn test_down_after_up_is_a_fresh_press() {
        let mut held = HeldKeySet::new();
        classify_key(KeyDirection::Down, Key::A, &mut held);
        classify_key(KeyDirection::Up, Key::A, &mut held);

        assert_eq!(classify_key(KeyDirection::Down, Key::A, &mut held), KeyTransition::Down);
    }

    #[test]
    fn test_keys_are_tracked_independently() {
        let mut held = HeldKeySet::new();
        assert_eq!(classify_key(KeyDirection::Down, Key::LSHIFT, &mut held), KeyTransition::Down);
        assert_eq!(classify_key(KeyDirection::Down, Key::A, &mut held), KeyTransition::Down);
        assert_eq!(classify_key(KeyDirection::Down, Key::LSHIFT, &mut held), KeyTransition::Hold);
        assert_eq!(held.snapshot().keys(), vec![Key::A, Key::LSHIFT]);
    }

    // ── Mouse ────────────────────────────────────────────────────────────────

    #[test]
    fn test_wheel_delta_is_sign_extended_high_word() {
        let up = classify_mouse(WM_MOUSEWHEEL, 0x0078_0000);
        let down = classify_mouse(WM_MOUSEWHEEL, 0xFF88_0000);

        assert_eq!(up.kind, MouseEventKind::Scroll);
        assert_eq!(up.delta, 120);
        assert_eq!(down.delta, -120);
    }

    #[test]
    fn test_horizontal_wheel_uses_same_extraction() {
        let result = classify_mouse(WM_MOUSEHWHEEL, 0xFF88_1234);
        assert_eq!(result.kind, MouseEventKind::ScrollHorizontal);
        assert_eq!(result.button, MouseButton::Middle);
        assert_eq!(result.delta, -120);
    }

    #[test]
    fn test_standard_buttons_map_to_down_and_up() {
        let cases = [
            (WM_LBUTTONDOWN, MouseEventKind::ButtonDown, MouseButton::Left),
            (WM_LBUTTONUP, MouseEventKind::ButtonUp, MouseButton::Left),
            (WM_RBUTTONDOWN, MouseEventKind::ButtonDown, MouseButton::Right),
            (WM_RBUTTONUP, MouseEventKind::ButtonUp, MouseButton::Right),
            (WM_MBUTTONDOWN, MouseEventKind::ButtonDown, MouseButton::Middle),
            (WM_MBUTTONUP, MouseEventKind::ButtonUp, MouseButton::Middle),
        ];
        for (message, kind, button) in cases {
            let result = classify_mouse(message, 0);
            assert_eq!((result.kind, result.button, result.delta), (kind, button, 0));
        }
    }

    #[test]
    fn test_extended_buttons_are_distinct_from_standard_buttons() {
        // Arrange
        let standard = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

        // Act
        let back = classify_mouse(WM_XBUTTONDOWN, 0x0001_0000);
        let forward = classify_mouse(WM_XBUTTONUP, 0x0002_0000);

        // Assert
        assert_eq!(back.kind, MouseEventKind::ButtonDown);
        assert_eq!(back.button, MouseButton::Back);
        assert_eq!(back.delta, 1);
        assert_eq!(forward.kind, MouseEventKind::ButtonUp);
        assert_eq!(forward.button, MouseButton::Forward);
        assert_eq!(forward.delta, 2);
        assert_ne!(back.button, forward.button);
        assert!(!standard.contains(&back.button));
        assert!(!standard.contains(&forward.button));
    }

    #[test]
    fn test_extended_button_without_index_is_special() {
        // Arrange
        let standard = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

        // Act
        let result = classify_mouse(WM_XBUTTONDOWN, 0x0000_0000);

        // Assert
        assert_eq!(result.kind, MouseEventKind::Special);
        assert_eq!(result.button, MouseButton::None);
        assert!(!standard.contains(&result.button));
    }

    #[test]
    fn test_move_has_no_button() {
        let result = classify_mouse(WM_MOUSEMOVE, 0);
        assert_eq!(result.kind, MouseEventKind::Move);
        assert_eq!(result.button, MouseButton::None);
    }

    #[test]
    fn test_unknown_message_is_special() {
        let result = classify_mouse(0x020D, 0xFFFF_FFFF);
        assert_eq!(result.kind, MouseEventKind::Special);
        assert_eq!(result.button, MouseButton::None);
        assert_eq!(result.delta, 0);
    }
}
