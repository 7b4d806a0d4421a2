//! Input source abstraction and startup device discovery.

use crate::error::{Error, Result};
use crate::event::KeyEvent;
use std::fs;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

/// A pollable source of key events.
///
/// Implementations must be non-blocking: `read_events` returns
/// [`io::ErrorKind::WouldBlock`] when nothing is queued.
pub trait InputSource: AsRawFd {
    /// Filesystem path of the device node.
    fn path(&self) -> &Path;

    /// Human-readable device name.
    fn name(&self) -> &str;

    /// Perform one non-blocking read, appending any key events to `out`
    /// tagged with `source`.
    ///
    /// Returns the number of raw records consumed (key or not). Zero means
    /// nothing more is available right now.
    fn read_events(&mut self, source: usize, out: &mut Vec<KeyEvent>) -> io::Result<usize>;
}

/// Enumerates input device nodes at startup.
pub struct DeviceRegistry;

impl DeviceRegistry {
    /// Open every `event*` node under `dir` with `open`.
    ///
    /// Nodes that fail to open are skipped. Fails only when nothing could be
    /// opened at all.
    pub fn discover_with<S, F>(dir: &Path, mut open: F) -> Result<Vec<S>>
    where
        F: FnMut(&Path) -> io::Result<S>,
    {
        let entries = fs::read_dir(dir).map_err(|e| {
            Error::NoDevices(format!(
                "cannot access {}: {}. Make sure you're in the 'input' group.",
                dir.display(),
                e
            ))
        })?;

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .map(|n| n.to_string_lossy().starts_with("event"))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        let mut devices = Vec::new();
        for path in paths {
            match open(&path) {
                Ok(device) => devices.push(device),
                Err(e) => {
                    log::debug!("Skipping {}: {}", path.display(), e);
                }
            }
        }

        if devices.is_empty() {
            return Err(Error::NoDevices(format!(
                "no readable devices under {}. Make sure you're in the 'input' group: \
                 sudo usermod -aG input $USER",
                dir.display()
            )));
        }

        Ok(devices)
    }

    /// Open every evdev node under `dir`.
    #[cfg(target_os = "linux")]
    pub fn discover(dir: &Path) -> Result<Vec<crate::platform::InputDevice>> {
        Self::discover_with(dir, crate::platform::InputDevice::open)
    }
}
