//! Menu-entry actions.
//!
//! External commands always run on a short-lived worker thread so a slow
//! command never stalls the UI loop. Failures are logged and swallowed.

use crate::spawn::spawn_detached;
use serde::{Deserialize, Serialize};
use std::process::{Command, Stdio};
use std::thread;

fn default_true() -> bool {
    true
}

/// What selecting a menu item does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Hide the overlay and return to whatever was running.
    Hide,
    /// Start a detached program. Hides the overlay afterwards unless `hide`
    /// is false.
    Launch {
        command: Vec<String>,
        #[serde(default = "default_true")]
        hide: bool,
    },
    /// Try each command in turn until one exits successfully. The overlay
    /// stays up; when `refresh` is set the surface is redrawn afterwards.
    Run {
        alternatives: Vec<Vec<String>>,
        #[serde(default)]
        refresh: bool,
    },
}

impl Action {
    /// Whether selecting this action closes the overlay.
    pub fn hides(&self) -> bool {
        match self {
            Action::Hide => true,
            Action::Launch { hide, .. } => *hide,
            Action::Run { .. } => false,
        }
    }

    /// Convenience constructor for a hiding launch.
    pub fn launch<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Action::Launch {
            command: command.into_iter().map(Into::into).collect(),
            hide: true,
        }
    }

    /// Convenience constructor for a single-command run.
    pub fn run<I, S>(command: I, refresh: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Action::Run {
            alternatives: vec![command.into_iter().map(Into::into).collect()],
            refresh,
        }
    }
}

/// Run `f` on a new named worker thread. Spawn failures are logged.
pub fn spawn_worker<F>(name: &str, f: F)
where
    F: FnOnce() + Send + 'static,
{
    if let Err(e) = thread::Builder::new().name(name.to_string()).spawn(f) {
        log::error!("Failed to start worker {}: {}", name, e);
    }
}

/// Launch a detached program, logging any failure.
pub fn launch(command: &[String]) {
    if let Err(e) = spawn_detached(command) {
        log::error!("Launch failed: {}", e);
    }
}

/// Run alternatives in order and return the index of the first that exits
/// successfully. Blocks until that command finishes; call from a worker.
pub fn run_alternatives(alternatives: &[Vec<String>]) -> Option<usize> {
    for (index, command) in alternatives.iter().enumerate() {
        let Some((program, args)) = command.split_first() else {
            continue;
        };

        match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) if status.success() => return Some(index),
            Ok(status) => log::debug!("{} exited with {}", program, status),
            Err(e) => log::debug!("{} failed: {}", program, e),
        }
    }
    log::warn!("No alternative succeeded: {:?}", alternatives);
    None
}
