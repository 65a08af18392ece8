//! Key combinations ("keystroke filters").
//!
//! A [`KeyCombination`] names one main key plus a tri-state requirement for
//! each modifier family. Matching is a set test against a [`KeyboardState`]:
//! the main key must be held, and every modifier whose requirement is not
//! [`Requirement::Ignore`] must be in exactly the required state. The order in
//! which keys went down plays no part.
//!
//! # Text form
//!
//! `Ctrl+Shift+A` – modifiers separated by `+`, main key last. A `!` prefix
//! requires the modifier to be *released*: `Ctrl+!Alt+Delete` matches
//! Ctrl+Delete only when no Alt key is held. Modifiers left out are ignored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::domain::state::KeyboardState;
use crate::keymap::{Key, ParseKeyError};

/// What a combination demands of one modifier family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Requirement {
    /// The modifier must be held.
    Pressed,
    /// The modifier must not be held.
    Released,
    /// The modifier's state does not matter.
    #[default]
    Ignore,
}

impl Requirement {
    /// Checks an observed modifier state against this requirement.
    pub fn accepts(self, held: bool) -> bool {
        match self {
            Requirement::Pressed => held,
            Requirement::Released => !held,
            Requirement::Ignore => true,
        }
    }
}

impl From<Option<bool>> for Requirement {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Requirement::Pressed,
            Some(false) => Requirement::Released,
            None => Requirement::Ignore,
        }
    }
}

/// Error type for parsing the text form of a combination.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseComboError {
    #[error("empty key combination")]
    Empty,
    #[error("empty segment in key combination {0:?}")]
    EmptySegment(String),
    #[error("unknown modifier {0:?}")]
    UnknownModifier(String),
    #[error("modifier {0:?} given more than once")]
    DuplicateModifier(String),
    #[error("invalid main key: {0}")]
    Key(#[from] ParseKeyError),
}

/// A main key plus modifier requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombination {
    pub key: Key,
    pub ctrl: Requirement,
    pub shift: Requirement,
    pub alt: Requirement,
    pub win: Requirement,
}

impl KeyCombination {
    /// A combination on `key` that ignores every modifier.
    pub fn new(key: Key) -> Self {
        Self {
            key,
            ctrl: Requirement::Ignore,
            shift: Requirement::Ignore,
            alt: Requirement::Ignore,
            win: Requirement::Ignore,
        }
    }

    pub fn with_ctrl(mut self, req: impl Into<Requirement>) -> Self {
        self.ctrl = req.into();
        self
    }

    pub fn with_shift(mut self, req: impl Into<Requirement>) -> Self {
        self.shift = req.into();
        self
    }

    pub fn with_alt(mut self, req: impl Into<Requirement>) -> Self {
        self.alt = req.into();
        self
    }

    pub fn with_win(mut self, req: impl Into<Requirement>) -> Self {
        self.win = req.into();
        self
    }

    /// Returns `true` if `state` satisfies this combination.
    pub fn matches(&self, state: &KeyboardState) -> bool {
        if !state.contains(self.key) {
            return false;
        }
        let mods = state.modifiers();
        self.shift.accepts(mods.shift)
            && self.ctrl.accepts(mods.ctrl)
            && self.alt.accepts(mods.alt)
            && self.win.accepts(mods.win)
    }

    /// The keys a user has to press to produce this combination.
    ///
    /// Required modifiers come first as generic codes (left Windows key for
    /// Win), followed by the main key.
    pub fn key_list(&self) -> Vec<Key> {
        let mut keys = Vec::with_capacity(5);
        if self.shift == Requirement::Pressed {
            keys.push(Key::SHIFT);
        }
        if self.ctrl == Requirement::Pressed {
            keys.push(Key::CONTROL);
        }
        if self.alt == Requirement::Pressed {
            keys.push(Key::MENU);
        }
        if self.win == Requirement::Pressed {
            keys.push(Key::LWIN);
        }
        keys.push(self.key);
        keys
    }

    fn modifier_slot(&mut self, name: &str) -> Option<&mut Requirement> {
        match name.to_ascii_lowercase().as_str() {
            "ctrl" | "control" | "ctl" => Some(&mut self.ctrl),
            "shift" => Some(&mut self.shift),
            "alt" | "menu" => Some(&mut self.alt),
            "win" | "meta" | "super" | "cmd" => Some(&mut self.win),
            _ => None,
        }
    }
}

impl FromStr for KeyCombination {
    type Err = ParseComboError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseComboError::Empty);
        }

        let segments: Vec<&str> = s.split('+').map(str::trim).collect();
        if segments.iter().any(|seg| seg.is_empty()) {
            return Err(ParseComboError::EmptySegment(s.to_string()));
        }

        let (main, modifiers) = segments
            .split_last()
            .ok_or(ParseComboError::Empty)?;
        let mut combo = KeyCombination::new(Key::from_name(main)?);

        for &segment in modifiers {
            let (name, req) = match segment.strip_prefix('!') {
                Some(rest) => (rest.trim(), Requirement::Released),
                None => (segment, Requirement::Pressed),
            };
            let slot = combo
                .modifier_slot(name)
                .ok_or_else(|| ParseComboError::UnknownModifier(segment.to_string()))?;
            if *slot != Requirement::Ignore {
                return Err(ParseComboError::DuplicateModifier(name.to_string()));
            }
            *slot = req;
        }

        Ok(combo)
    }
}

impl fmt::Display for KeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            ("Ctrl", self.ctrl),
            ("Shift", self.shift),
            ("Alt", self.alt),
            ("Win", self.win),
        ];
        for (name, req) in parts {
            match req {
                Requirement::Pressed => write!(f, "{name}+")?,
                Requirement::Released => write!(f, "!{name}+")?,
                Requirement::Ignore => {}
            }
        }
        write!(f, "{}", self.key)
    }
}

impl Serialize for KeyCombination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyCombination {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
