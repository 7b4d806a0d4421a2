//! # mos-overlay
//!
//! Input-triggered overlay menu for a Linux gaming appliance.
//!
//! Two processes cooperate:
//!
//! - `overlay-daemon` reads every evdev node, tracks which keys and buttons
//!   are held, and when a configured combo fires (outside an 800ms cooldown)
//!   makes sure exactly one menu process is alive.
//! - `menu-overlay` owns the full-screen menu. It listens on a local Unix
//!   socket for `toggle` requests and flips between hidden and visible;
//!   Escape ends the process, hiding keeps it resident.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mos_overlay::{Config, Daemon, DeviceRegistry, ProcessSpawner};
//! use std::sync::atomic::AtomicBool;
//!
//! let config = Config::default();
//! let devices = DeviceRegistry::discover(&config.daemon.input_dir).expect("no devices");
//! let spawner = ProcessSpawner::new(
//!     config.daemon.process_token.clone(),
//!     ProcessSpawner::default_command(),
//! );
//!
//! let running = AtomicBool::new(true);
//! Daemon::from_config(devices, &config, spawner)
//!     .run(&running)
//!     .expect("poll failed");
//! ```
//!
//! ## Architecture
//!
//! The daemon is a single-threaded loop: [`multiplex`] waits on all device
//! descriptors, [`state`] keeps the held-key set, [`cooldown`] rate-limits,
//! and [`combo`] decides whether the held set matches. The menu side runs a
//! [`ui`] loop that other threads post closures to, so all menu state is
//! touched from one thread only.

pub mod action;
pub mod channel;
pub mod combo;
pub mod config;
pub mod cooldown;
pub mod daemon;
pub mod device;
pub mod error;
pub mod event;
pub mod keycode;
pub mod menu;
pub mod multiplex;
pub mod spawn;
pub mod state;
pub mod trigger;
pub mod ui;

mod platform;

// Re-exports
pub use action::Action;
pub use channel::{ActivationChannel, TOGGLE_MARKER, send_toggle};
pub use combo::{ComboKind, ComboMatcher, ComboSpec};
pub use config::Config;
pub use cooldown::CooldownGate;
pub use daemon::Daemon;
pub use device::{DeviceRegistry, InputSource};
pub use error::{Error, Result};
pub use event::{KeyEvent, Transition};
pub use keycode::KeyId;
pub use menu::{HeadlessSurface, Menu, MenuEntry, MenuItem, MenuRequest, Surface, Visibility};
pub use multiplex::EventMultiplexer;
pub use platform::InputDevice;
pub use spawn::{ProcessSpawner, SpawnOutcome};
pub use state::PressedKeySet;
pub use trigger::ActivationTrigger;
pub use ui::{UiHandle, UiLoop};
