//! Platform-specific implementations.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::*;

// evdev, /proc and the toggle socket are Linux-only
#[cfg(not(target_os = "linux"))]
compile_error!("mos-overlay only supports Linux");
