//! The live set of keys a session believes to be pressed.

use std::collections::BTreeSet;

use crate::domain::state::KeyboardState;
use crate::keymap::Key;

/// Keys currently held down, as observed by one hook session.
///
/// The keyboard hook only reports "down" and "up"; auto-repeat arrives as
/// another "down". Membership in this set is what turns a repeated "down"
/// into a hold.
///
/// There is no internal locking. A set belongs to exactly one session and is
/// only touched from that session's hook callback, on the thread that
/// installed the hook.
#[derive(Debug, Clone, Default)]
pub struct HeldKeySet {
    keys: BTreeSet<Key>,
}

impl HeldKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    /// Records `key` as pressed. Returns `false` if it already was.
    pub fn mark_down(&mut self, key: Key) -> bool {
        self.keys.insert(key)
    }

    /// Records `key` as released. Returns `false` if it was not held.
    ///
    /// Releasing an unknown key is not an error: downs can be missed while a
    /// session is paused or the machine sleeps.
    pub fn mark_up(&mut self, key: Key) -> bool {
        self.keys.remove(&key)
    }

    /// Copies the current contents into an immutable, ordered snapshot.
    pub fn snapshot(&self) -> KeyboardState {
        KeyboardState::from_sorted(self.keys.iter().copied().collect())
    }

    /// Drops every key for which `keep` returns `false`. Returns how many
    /// keys were removed.
    pub fn retain(&mut self, mut keep: impl FnMut(Key) -> bool) -> usize {
        let before = self.keys.len();
        self.keys.retain(|&k| keep(k));
        before - self.keys.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Key> + '_ {
        self.keys.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
