//! Local activation channel for the menu process.
//!
//! The menu listens on a Unix stream socket. Any connection whose first
//! read contains the `toggle` marker flips the menu's visibility; the
//! callback is invoked on the accept thread, so it should only post work
//! to the UI loop.
//!
//! # Example
//!
//! ```no_run
//! use mos_overlay::channel::{ActivationChannel, send_toggle};
//!
//! let channel = ActivationChannel::bind("/tmp/mos_overlay.sock", || {
//!     println!("toggle requested");
//! })
//! .expect("Failed to bind activation socket");
//!
//! send_toggle("/tmp/mos_overlay.sock").unwrap();
//! channel.stop().unwrap();
//! ```

use crate::error::{Error, Result};
use std::fs;
use std::io::{Read, Write};
use std::os::unix::fs::PermissionsExt;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Substring that marks a toggle request.
pub const TOGGLE_MARKER: &str = "toggle";

const READ_BUFFER: usize = 1024;

/// How long a connected client gets to send its message.
const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Handle to the listening socket.
///
/// The accept thread stops and the socket file is removed when this handle
/// is stopped or dropped.
pub struct ActivationChannel {
    path: PathBuf,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl ActivationChannel {
    /// Bind `path` and start accepting toggle requests in the background.
    ///
    /// A stale socket file left by a previous run is replaced. The socket is
    /// made world-writable so any local user can signal it.
    pub fn bind<P, F>(path: P, on_toggle: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: Fn() + Send + 'static,
    {
        let path = path.as_ref().to_path_buf();
        if fs::symlink_metadata(&path).is_ok() {
            fs::remove_file(&path)
                .map_err(|e| Error::Socket(format!("{}: {}", path.display(), e)))?;
        }

        let listener = UnixListener::bind(&path)
            .map_err(|e| Error::Socket(format!("{}: {}", path.display(), e)))?;
        if let Err(e) = fs::set_permissions(&path, fs::Permissions::from_mode(0o666)) {
            log::warn!("Cannot set permissions on {}: {}", path.display(), e);
        }

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let thread_handle = thread::Builder::new()
            .name("toggle-accept".into())
            .spawn(move || accept_loop(listener, &running_clone, on_toggle))
            .map_err(|e| Error::ThreadError(e.to_string()))?;

        log::info!("Listening for toggles on {}", path.display());
        Ok(Self {
            path,
            running,
            thread_handle: Some(thread_handle),
        })
    }

    /// Socket path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the accept thread is still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop accepting, wait for the thread, and remove the socket file.
    pub fn stop(mut self) -> Result<()> {
        self.stop_inner()
    }

    fn stop_inner(&mut self) -> Result<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        // Wake the blocking accept.
        let _ = UnixStream::connect(&self.path);

        let joined = match self.thread_handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| Error::ThreadError("failed to join accept thread".into())),
            None => Ok(()),
        };

        if let Err(e) = fs::remove_file(&self.path) {
            log::debug!("Removing {}: {}", self.path.display(), e);
        }
        joined
    }
}

impl Drop for ActivationChannel {
    fn drop(&mut self) {
        let _ = self.stop_inner();
    }
}

fn accept_loop<F: Fn()>(listener: UnixListener, running: &AtomicBool, on_toggle: F) {
    for stream in listener.incoming() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        match stream {
            Ok(mut stream) => {
                // A silent client must not park the only accept thread.
                if let Err(e) = stream.set_read_timeout(Some(READ_TIMEOUT)) {
                    log::debug!("Cannot set read timeout: {}", e);
                    continue;
                }
                let mut buf = [0u8; READ_BUFFER];
                match stream.read(&mut buf) {
                    Ok(n) if String::from_utf8_lossy(&buf[..n]).contains(TOGGLE_MARKER) => {
                        log::debug!("Toggle requested");
                        on_toggle();
                    }
                    Ok(n) => log::debug!("Ignoring {} byte message", n),
                    Err(e) => log::debug!("Read failed: {}", e),
                }
            }
            Err(e) => log::debug!("Accept failed: {}", e),
        }
    }
}

/// Connect to `path` and send one toggle request.
pub fn send_toggle<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let mut stream = UnixStream::connect(path)
        .map_err(|e| Error::Socket(format!("{}: {}", path.display(), e)))?;
    stream.write_all(TOGGLE_MARKER.as_bytes())?;
    Ok(())
}
