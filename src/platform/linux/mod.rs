//! Linux platform implementation.
//!
//! Input is read directly from `/dev/input/event*` through evdev, which
//! works the same under X11, Wayland and a bare KMS console.
//!
//! ## Permissions
//!
//! The daemon must run as root or as a user in the `input` group:
//! ```bash
//! sudo usermod -aG input $USER
//! # Then log out and back in
//! ```

mod evdev;

pub use self::evdev::InputDevice;
