//! Structured events handed to listeners.
//!
//! Both event types are snapshots. The only thing a listener may change is
//! the cancellation flag ([`KeyboardEvent::set_handled`],
//! [`MouseEvent::set_handled`]); every other field is fixed at construction.
//! Setting the flag stops the underlying input from reaching any other hook
//! and the foreground application.

use serde::Serialize;

use crate::domain::state::KeyboardState;
use crate::keymap::Key;

/// How a key changed state.
///
/// Not reported by the host: the hook only distinguishes "down" from "up",
/// so `Hold` is inferred from the session's held-key set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KeyTransition {
    /// First press of a key that was not held.
    Down,
    /// Auto-repeat of a key that is already held.
    Hold,
    /// Release.
    Up,
}

/// A classified keyboard event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyboardEvent {
    transition: KeyTransition,
    key: Key,
    scan_code: u32,
    state: KeyboardState,
    characters: String,
    handled: bool,
}

impl KeyboardEvent {
    pub fn new(
        transition: KeyTransition,
        key: Key,
        scan_code: u32,
        state: KeyboardState,
        characters: String,
    ) -> Self {
        Self {
            transition,
            key,
            scan_code,
            state,
            characters,
            handled: false,
        }
    }

    pub fn transition(&self) -> KeyTransition {
        self.transition
    }

    /// The key whose state changed.
    pub fn key(&self) -> Key {
        self.key
    }

    /// Hardware scan code reported with the key.
    pub fn scan_code(&self) -> u32 {
        self.scan_code
    }

    /// Every key held at the time of this event, including [`Self::key`]
    /// unless this is a release.
    pub fn state(&self) -> &KeyboardState {
        &self.state
    }

    /// The characters this keystroke types into the focused window.
    ///
    /// Usually zero or one character. A dead key yields nothing on its own
    /// press and may yield two on the next press it cannot combine with.
    /// Always empty on release.
    pub fn characters(&self) -> &str {
        &self.characters
    }

    /// Whether this keystroke produces character input.
    pub fn is_char_input(&self) -> bool {
        !self.characters.is_empty()
    }

    pub fn handled(&self) -> bool {
        self.handled
    }

    /// Marks the event as handled (or not). A handled event is swallowed.
    pub fn set_handled(&mut self, handled: bool) {
        self.handled = handled;
    }
}

/// Screen coordinates of the pointer, in physical pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// What caused a mouse event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum MouseEventKind {
    /// A message outside the documented set; inspect [`MouseEvent::message`].
    #[default]
    Special,
    Move,
    ButtonDown,
    ButtonUp,
    /// Vertical wheel.
    Scroll,
    /// Horizontal wheel (tilt).
    ScrollHorizontal,
}

/// The button or wheel involved in a mouse event.
///
/// Ids are stable: `None` = 0, `Left` = 1, `Right` = 2, `Middle` = 3, and
/// extended buttons continue from 4 (`Back`, `Forward`, then `Extended`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum MouseButton {
    #[default]
    None,
    Left,
    Right,
    Middle,
    /// First extended button (XBUTTON1).
    Back,
    /// Second extended button (XBUTTON2).
    Forward,
    /// Any further extended button, by id.
    Extended(u32),
}

impl MouseButton {
    /// Offset between an extended-button index and its id.
    pub const EXTENDED_OFFSET: u32 = 3;

    /// Maps the 1-based extended-button index reported by the host. Index 0
    /// names no button and yields `None`.
    pub fn from_extended_index(index: u16) -> Option<Self> {
        match index {
            0 => None,
            index => Some(MouseButton::from_id(u32::from(index) + Self::EXTENDED_OFFSET)),
        }
    }

    pub fn from_id(id: u32) -> Self {
        match id {
            0 => MouseButton::None,
            1 => MouseButton::Left,
            2 => MouseButton::Right,
            3 => MouseButton::Middle,
            4 => MouseButton::Back,
            5 => MouseButton::Forward,
            other => MouseButton::Extended(other),
        }
    }

    pub fn id(self) -> u32 {
        match self {
            MouseButton::None => 0,
            MouseButton::Left => 1,
            MouseButton::Right => 2,
            MouseButton::Middle => 3,
            MouseButton::Back => 4,
            MouseButton::Forward => 5,
            MouseButton::Extended(id) => id,
        }
    }
}

/// A classified mouse event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MouseEvent {
    location: Point,
    kind: MouseEventKind,
    button: MouseButton,
    delta: i32,
    message: u32,
    handled: bool,
}

impl MouseEvent {
    pub fn new(
        location: Point,
        kind: MouseEventKind,
        button: MouseButton,
        delta: i32,
        message: u32,
    ) -> Self {
        Self {
            location,
            kind,
            button,
            delta,
            message,
            handled: false,
        }
    }

    pub fn location(&self) -> Point {
        self.location
    }

    pub fn kind(&self) -> MouseEventKind {
        self.kind
    }

    pub fn button(&self) -> MouseButton {
        self.button
    }

    /// Wheel rotation for scroll events (one notch is 120), the extended
    /// button index for extended-button events, otherwise 0.
    pub fn delta(&self) -> i32 {
        self.delta
    }

    /// The raw message id this event was classified from.
    pub fn message(&self) -> u32 {
        self.message
    }

    pub fn handled(&self) -> bool {
        self.handled
    }

    pub fn set_handled(&mut self, handled: bool) {
        self.handled = handled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keyboard_event_is_not_handled() {
        let event = KeyboardEvent::new(
            KeyTransition::Down,
            Key::A,
            0x1E,
            KeyboardState::new([Key::A]),
            "a".to_string(),
        );
        assert!(!event.handled());
        assert!(event.is_char_input());
    }

    #[test]
    fn test_set_handled_toggles_cancellation_flag() {
        let mut event = MouseEvent::new(
            Point::new(10, 20),
            MouseEventKind::Move,
            MouseButton::None,
            0,
            0x0200,
        );
        event.set_handled(true);
        assert!(event.handled());
        event.set_handled(false);
        assert!(!event.handled());
    }

    #[test]
    fn test_extended_indices_map_past_standard_buttons() {
        assert_eq!(MouseButton::from_extended_index(1), Some(MouseButton::Back));
        assert_eq!(MouseButton::from_extended_index(2), Some(MouseButton::Forward));
        assert_eq!(MouseButton::from_extended_index(3), Some(MouseButton::Extended(6)));
        assert_eq!(MouseButton::Back.id(), 4);
        assert_eq!(MouseButton::Forward.id(), 5);
    }

    #[test]
    fn test_extended_index_never_names_a_standard_button() {
        assert_eq!(MouseButton::from_extended_index(0), None);
        for index in 1..=u16::MAX {
            let id = MouseButton::from_extended_index(index).map(MouseButton::id);
            assert!(id > Some(MouseButton::Middle.id()), "index {index} gave {id:?}");
        }
    }

    #[test]
    fn test_button_ids_are_stable() {
        for id in 0..10 {
            assert_eq!(MouseButton::from_id(id).id(), id);
        }
    }

    #[test]
    fn test_keyboard_event_serializes_state_as_key_names() {
        let event = KeyboardEvent::new(
            KeyTransition::Hold,
            Key::B,
            0x30,
            KeyboardState::new([Key::LSHIFT, Key::B]),
            "B".to_string(),
        );

        let json = serde_json::to_value(&event).expect("serialize");

        assert_eq!(json["transition"], "Hold");
        assert_eq!(json["key"], "B");
        assert_eq!(json["state"], serde_json::json!(["B", "LShift"]));
        assert_eq!(json["characters"], "B");
    }
}
