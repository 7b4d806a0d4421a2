//! Error types for the overlay daemon and menu process.

use thiserror::Error;

/// Result type alias for mos-overlay operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while watching input or driving the menu.
#[derive(Debug, Error)]
pub enum Error {
    /// No input device could be opened.
    #[error("no input devices available: {0}")]
    NoDevices(String),

    /// Waiting on the device set failed.
    #[error("poll error: {0}")]
    Poll(String),

    /// The toggle socket could not be bound or reached.
    #[error("toggle socket error: {0}")]
    Socket(String),

    /// Launching a process failed.
    #[error("failed to spawn process: {0}")]
    Spawn(String),

    /// The UI loop is gone and can no longer accept deferred calls.
    #[error("ui loop closed")]
    UiClosed,

    /// Thread-related error.
    #[error("thread error: {0}")]
    ThreadError(String),

    /// Underlying I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
