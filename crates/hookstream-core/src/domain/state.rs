//! Momentary keyboard snapshots.

use serde::Serialize;

use crate::keymap::Key;

/// Which modifier families are held in a [`KeyboardState`].
///
/// Derived on demand from a snapshot; never cached across snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ModifierState {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub win: bool,
}

/// Every key held down at one instant, in ascending key-code order.
///
/// This is a value copy of the session's held-key set. Later changes to the
/// live set never show up in a snapshot that was already handed out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct KeyboardState {
    keys: Vec<Key>,
}

impl KeyboardState {
    /// Builds a snapshot from any collection of keys.
    ///
    /// Duplicates are removed and the keys sorted, so the result does not
    /// depend on the order the caller supplied them in.
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        let mut keys: Vec<Key> = keys.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();
        Self { keys }
    }

    /// Builds a snapshot from keys that are already sorted and unique.
    pub(crate) fn from_sorted(keys: Vec<Key>) -> Self {
        debug_assert!(keys.windows(2).all(|w| w[0] < w[1]));
        Self { keys }
    }

    pub fn contains(&self, key: Key) -> bool {
        self.keys.binary_search(&key).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = Key> + '_ {
        self.keys.iter().copied()
    }

    /// Returns a copy of the held keys.
    pub fn keys(&self) -> Vec<Key> {
        self.keys.clone()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn contains_any(&self, candidates: &[Key]) -> bool {
        candidates.iter().any(|&k| self.contains(k))
    }

    /// Whether any Shift key is held.
    pub fn shift(&self) -> bool {
        self.contains_any(&Key::SHIFT_KEYS)
    }

    /// Whether any Control key is held.
    pub fn ctrl(&self) -> bool {
        self.contains_any(&Key::CONTROL_KEYS)
    }

    /// Whether any Alt key is held.
    pub fn alt(&self) -> bool {
        self.contains_any(&Key::ALT_KEYS)
    }

    /// Whether either Windows key is held.
    pub fn win(&self) -> bool {
        self.contains_any(&Key::WIN_KEYS)
    }

    pub fn modifiers(&self) -> ModifierState {
        ModifierState {
            shift: self.shift(),
            ctrl: self.ctrl(),
            alt: self.alt(),
            win: self.win(),
        }
    }
}

impl<'a> IntoIterator for &'a KeyboardState {
    type Item = Key;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Key>>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter().copied()
    }
}

impl FromIterator<Key> for KeyboardState {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        KeyboardState::new(iter)
    }
}
