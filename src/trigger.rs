//! Per-event activation pipeline: key state, cooldown, combo match.

use crate::combo::{ComboKind, ComboMatcher};
use crate::config::TriggerConfig;
use crate::cooldown::CooldownGate;
use crate::event::KeyEvent;
use crate::state::PressedKeySet;
use std::time::Duration;

/// Owns the held-key set and the cooldown gate for the control loop.
#[derive(Debug, Clone)]
pub struct ActivationTrigger {
    pressed: PressedKeySet,
    matcher: ComboMatcher,
    gate: CooldownGate,
}

impl ActivationTrigger {
    /// Create a trigger from a matcher and cooldown window.
    pub fn new(matcher: ComboMatcher, cooldown: Duration) -> Self {
        Self {
            pressed: PressedKeySet::new(),
            matcher,
            gate: CooldownGate::new(cooldown),
        }
    }

    /// Create a trigger from the `trigger` config section.
    pub fn from_config(config: &TriggerConfig) -> Self {
        Self::new(config.matcher(), config.cooldown())
    }

    /// Feed one event. Returns the combo that fired, if any.
    ///
    /// The key state is always updated. Within the cooldown window the event
    /// is dropped before any combo is evaluated.
    pub fn handle(&mut self, event: &KeyEvent) -> Option<ComboKind> {
        self.pressed.apply(event);

        if !self.gate.allow(event.time) {
            return None;
        }

        let fired = self.matcher.evaluate(&self.pressed)?;
        self.gate.record(event.time);
        Some(fired)
    }

    /// The currently held keys.
    pub fn pressed(&self) -> &PressedKeySet {
        &self.pressed
    }

    /// The cooldown gate.
    pub fn gate(&self) -> &CooldownGate {
        &self.gate
    }
}
