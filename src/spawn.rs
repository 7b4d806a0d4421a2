//! Singleton launch of the menu process.
//!
//! A running menu is recognized purely by a substring of its command line,
//! the way `pgrep -f` matches. This is a heuristic: any process whose
//! arguments contain the token counts as the menu.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

#[cfg(unix)]
use std::os::unix::process::CommandExt;

/// Result of [`ProcessSpawner::ensure_running`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    /// A matching process was found; nothing was launched.
    AlreadyRunning(u32),
    /// A new menu process was launched.
    Spawned(u32),
}

/// Launches the menu unless a process carrying `token` is already alive.
#[derive(Debug, Clone)]
pub struct ProcessSpawner {
    token: String,
    command: Vec<String>,
    proc_root: PathBuf,
}

impl ProcessSpawner {
    /// Create a spawner that scans `/proc` for `token` and runs `command`.
    pub fn new(token: impl Into<String>, command: Vec<String>) -> Self {
        Self {
            token: token.into(),
            command,
            proc_root: PathBuf::from("/proc"),
        }
    }

    /// Scan a different process table root.
    pub fn with_proc_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.proc_root = root.into();
        self
    }

    /// The identifying token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The launch command.
    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// The `menu-overlay` executable next to the current executable.
    pub fn default_command() -> Vec<String> {
        let exe = std::env::current_exe()
            .map(|p| p.with_file_name("menu-overlay"))
            .unwrap_or_else(|_| PathBuf::from("menu-overlay"));
        vec![exe.to_string_lossy().into_owned()]
    }

    /// Find a live process carrying the token. Re-scanned on every call.
    pub fn find_running(&self) -> Option<u32> {
        find_process(&self.proc_root, &self.token, std::process::id())
    }

    /// Launch the menu if no matching process is alive.
    pub fn ensure_running(&self) -> Result<SpawnOutcome> {
        if let Some(pid) = self.find_running() {
            log::debug!("Menu already running (pid {})", pid);
            return Ok(SpawnOutcome::AlreadyRunning(pid));
        }

        let pid = spawn_detached(&self.command)?;
        log::info!("Launched menu (pid {})", pid);
        Ok(SpawnOutcome::Spawned(pid))
    }
}

/// Scan `proc_root/<pid>/cmdline` for `token`, skipping `exclude_pid`.
///
/// Arguments are joined with spaces before matching. Processes that vanish
/// or cannot be read mid-scan are skipped.
pub fn find_process(proc_root: &Path, token: &str, exclude_pid: u32) -> Option<u32> {
    let entries = match fs::read_dir(proc_root) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot scan {}: {}", proc_root.display(), e);
            return None;
        }
    };

    let mut pids: Vec<u32> = entries
        .flatten()
        .filter_map(|entry| entry.file_name().to_str()?.parse::<u32>().ok())
        .filter(|pid| *pid != exclude_pid)
        .collect();
    pids.sort_unstable();

    pids.into_iter().find(|pid| {
        let Ok(raw) = fs::read(proc_root.join(pid.to_string()).join("cmdline")) else {
            return false;
        };
        let cmdline: String = String::from_utf8_lossy(&raw)
            .trim_end_matches('\0')
            .replace('\0', " ");
        cmdline.contains(token)
    })
}

/// Start `command` in its own process group with all stdio discarded.
///
/// The child is not supervised; a background thread only reaps it so it
/// does not linger as a zombie after exit.
pub fn spawn_detached(command: &[String]) -> Result<u32> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| Error::Spawn("empty command".into()))?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd
        .spawn()
        .map_err(|e| Error::Spawn(format!("{}: {}", program, e)))?;
    let pid = child.id();

    let reaper = thread::Builder::new()
        .name("reaper".into())
        .spawn(move || {
            if let Ok(status) = child.wait() {
                log::debug!("Process {} exited: {}", pid, status);
            }
        });
    if let Err(e) = reaper {
        log::debug!("Could not start reaper for {}: {}", pid, e);
    }

    Ok(pid)
}
