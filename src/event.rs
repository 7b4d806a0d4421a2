//! Key events produced by the multiplexer.

use crate::keycode::KeyId;
use std::time::Instant;

/// The kind of key transition, mirroring the `EV_KEY` event value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Key went down (value 1).
    Press,
    /// Key went up (value 0).
    Release,
    /// Autorepeat while held (value 2).
    Repeat,
}

impl Transition {
    /// Map a raw `EV_KEY` value to a transition.
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(Transition::Release),
            1 => Some(Transition::Press),
            2 => Some(Transition::Repeat),
            _ => None,
        }
    }
}

/// A single key transition read from one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key or button.
    pub key: KeyId,
    /// What happened to it.
    pub transition: Transition,
    /// Index of the source device within the multiplexer.
    pub source: usize,
    /// When the event was read (monotonic).
    pub time: Instant,
}

impl KeyEvent {
    /// Create a new key event.
    pub fn new(key: KeyId, transition: Transition, source: usize, time: Instant) -> Self {
        Self {
            key,
            transition,
            source,
            time,
        }
    }

    /// Shorthand for a press event.
    pub fn press(key: KeyId, time: Instant) -> Self {
        Self::new(key, Transition::Press, 0, time)
    }

    /// Shorthand for a release event.
    pub fn release(key: KeyId, time: Instant) -> Self {
        Self::new(key, Transition::Release, 0, time)
    }

    /// Shorthand for a repeat event.
    pub fn repeat(key: KeyId, time: Instant) -> Self {
        Self::new(key, Transition::Repeat, 0, time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_from_value() {
        assert_eq!(Transition::from_value(0), Some(Transition::Release));
        assert_eq!(Transition::from_value(1), Some(Transition::Press));
        assert_eq!(Transition::from_value(2), Some(Transition::Repeat));
        assert_eq!(Transition::from_value(3), None);
        assert_eq!(Transition::from_value(-1), None);
    }
}
