//! The trigger daemon's control loop.

use crate::combo::ComboKind;
use crate::config::Config;
use crate::device::InputSource;
use crate::error::Result;
use crate::event::KeyEvent;
use crate::multiplex::EventMultiplexer;
use crate::spawn::{ProcessSpawner, SpawnOutcome};
use crate::trigger::ActivationTrigger;
use std::sync::atomic::{AtomicBool, Ordering};

/// Watches input devices and launches the menu when a combo fires.
pub struct Daemon<S: InputSource> {
    mux: EventMultiplexer<S>,
    trigger: ActivationTrigger,
    spawner: ProcessSpawner,
}

impl<S: InputSource> Daemon<S> {
    /// Assemble a daemon from its parts.
    pub fn new(mux: EventMultiplexer<S>, trigger: ActivationTrigger, spawner: ProcessSpawner) -> Self {
        Self {
            mux,
            trigger,
            spawner,
        }
    }

    /// Build a daemon over `sources` using the trigger and daemon settings.
    pub fn from_config(sources: Vec<S>, config: &Config, spawner: ProcessSpawner) -> Self {
        Self::new(
            EventMultiplexer::new(sources, config.daemon.poll_timeout()),
            ActivationTrigger::from_config(&config.trigger),
            spawner,
        )
    }

    /// The activation pipeline, including held keys and the cooldown gate.
    pub fn trigger(&self) -> &ActivationTrigger {
        &self.trigger
    }

    /// The watched devices.
    pub fn multiplexer(&self) -> &EventMultiplexer<S> {
        &self.mux
    }

    /// Run until `running` is cleared.
    ///
    /// The flag is checked at least once per poll timeout. Only a failure of
    /// the readiness wait itself ends the loop with an error.
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        log::info!(
            "Watching {} device(s) for the activation combo",
            self.mux.active_count()
        );

        let mut events = Vec::new();
        while running.load(Ordering::SeqCst) {
            events.clear();
            self.mux.poll_events(&mut events)?;
            for event in &events {
                self.process_event(event);
            }
        }

        log::info!("Daemon stopped");
        Ok(())
    }

    /// Feed one event through the trigger, launching the menu on a fire.
    pub fn process_event(&mut self, event: &KeyEvent) -> Option<ComboKind> {
        let kind = self.trigger.handle(event)?;
        log::info!("{} combo fired", kind);

        match self.spawner.ensure_running() {
            Ok(SpawnOutcome::AlreadyRunning(pid)) => {
                log::info!("Menu already running (pid {}), nothing to do", pid)
            }
            Ok(SpawnOutcome::Spawned(_)) => {}
            Err(e) => log::error!("Failed to launch menu: {}", e),
        }
        Some(kind)
    }
}
