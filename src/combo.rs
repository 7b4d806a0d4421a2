//! Hold+tap combo definitions and matching.

use crate::keycode::KeyId;
use crate::state::PressedKeySet;
use std::fmt;

/// Which configured combo fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComboKind {
    /// The keyboard combo.
    Keyboard,
    /// The joystick/controller combo.
    Joystick,
}

impl fmt::Display for ComboKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComboKind::Keyboard => f.write_str("keyboard"),
            ComboKind::Joystick => f.write_str("joystick"),
        }
    }
}

/// A set of keys to hold plus one key to tap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboSpec {
    hold: Vec<KeyId>,
    tap: KeyId,
}

impl ComboSpec {
    /// Create a combo. Duplicate hold keys are collapsed, order is kept.
    pub fn new(hold: impl IntoIterator<Item = KeyId>, tap: KeyId) -> Self {
        let mut keys: Vec<KeyId> = Vec::new();
        for key in hold {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        Self { hold: keys, tap }
    }

    /// Build a combo from key names. Returns `None` if any name is unknown.
    pub fn from_names<S: AsRef<str>>(hold: &[S], tap: &str) -> Option<Self> {
        let hold = hold
            .iter()
            .map(|name| KeyId::from_name(name.as_ref()))
            .collect::<Option<Vec<_>>>()?;
        let tap = KeyId::from_name(tap)?;
        Some(Self::new(hold, tap))
    }

    /// The keys that must be held.
    pub fn hold_keys(&self) -> &[KeyId] {
        &self.hold
    }

    /// The key that must be tapped.
    pub fn tap_key(&self) -> KeyId {
        self.tap
    }

    /// True iff every hold key and the tap key are currently pressed.
    pub fn matches(&self, pressed: &PressedKeySet) -> bool {
        pressed.contains_all(&self.hold) && pressed.contains(self.tap)
    }
}

impl fmt::Display for ComboSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.hold {
            write!(f, "{}+", key)?;
        }
        write!(f, "{}", self.tap)
    }
}

/// Evaluates the keyboard combo, then the joystick combo.
///
/// A disabled or unresolvable combo is `None` and never matches. When both
/// combos are satisfied by the same key set, the keyboard combo is reported.
#[derive(Debug, Clone, Default)]
pub struct ComboMatcher {
    keyboard: Option<ComboSpec>,
    joystick: Option<ComboSpec>,
}

impl ComboMatcher {
    /// Create a matcher from the two optional combos.
    pub fn new(keyboard: Option<ComboSpec>, joystick: Option<ComboSpec>) -> Self {
        Self { keyboard, joystick }
    }

    /// The keyboard combo, if enabled.
    pub fn keyboard(&self) -> Option<&ComboSpec> {
        self.keyboard.as_ref()
    }

    /// The joystick combo, if enabled.
    pub fn joystick(&self) -> Option<&ComboSpec> {
        self.joystick.as_ref()
    }

    /// Return the first satisfied combo, keyboard first.
    pub fn evaluate(&self, pressed: &PressedKeySet) -> Option<ComboKind> {
        if self.keyboard.as_ref().is_some_and(|c| c.matches(pressed)) {
            return Some(ComboKind::Keyboard);
        }
        if self.joystick.as_ref().is_some_and(|c| c.matches(pressed)) {
            return Some(ComboKind::Joystick);
        }
        None
    }
}
