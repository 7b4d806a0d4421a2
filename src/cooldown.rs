//! Re-fire suppression after a successful trigger.

use std::time::{Duration, Instant};

/// Blocks firing until `cooldown` has elapsed since the last recorded fire.
///
/// Times are [`Instant`]s so the gate is immune to wall-clock jumps.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    cooldown: Duration,
    last_fire: Option<Instant>,
}

impl CooldownGate {
    /// Create a gate that has never fired.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_fire: None,
        }
    }

    /// The configured window.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// When the gate last fired.
    pub fn last_fire(&self) -> Option<Instant> {
        self.last_fire
    }

    /// Check whether a fire at `now` is allowed.
    pub fn allow(&self, now: Instant) -> bool {
        match self.last_fire {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.cooldown,
        }
    }

    /// Record a fire at `now`.
    pub fn record(&mut self, now: Instant) {
        self.last_fire = Some(now);
    }
}
