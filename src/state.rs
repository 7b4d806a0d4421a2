//! Held-key state shared across every watched device.
//!
//! One [`PressedKeySet`] is owned by the daemon's control loop and fed every
//! key event regardless of which device produced it, so a controller button
//! and a keyboard key can be held together to satisfy a combo.

use crate::event::{KeyEvent, Transition};
use crate::keycode::KeyId;
use std::collections::BTreeSet;

/// The set of keys currently held down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PressedKeySet {
    keys: BTreeSet<KeyId>,
}

impl PressedKeySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one transition.
    ///
    /// Press inserts (idempotent), release removes, repeat leaves the set
    /// untouched.
    pub fn apply(&mut self, event: &KeyEvent) -> &Self {
        match event.transition {
            Transition::Press => {
                self.keys.insert(event.key);
            }
            Transition::Release => {
                self.keys.remove(&event.key);
            }
            Transition::Repeat => {}
        }
        self
    }

    /// Check if a key is held.
    #[inline]
    pub fn contains(&self, key: KeyId) -> bool {
        self.keys.contains(&key)
    }

    /// Check that every key in `keys` is held.
    pub fn contains_all<'a, I>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = &'a KeyId>,
    {
        keys.into_iter().all(|k| self.keys.contains(k))
    }

    /// Number of held keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if nothing is held.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate held keys in code order.
    pub fn iter(&self) -> impl Iterator<Item = KeyId> + '_ {
        self.keys.iter().copied()
    }

    /// Forget every held key.
    pub fn clear(&mut self) {
        self.keys.clear();
    }
}
