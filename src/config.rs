//! Configuration record for the daemon and the menu process.
//!
//! Stored as JSON. Every section is `#[serde(default)]`, and a file that is
//! missing or fails to parse yields [`Config::default`] with a warning, so a
//! bad config never keeps the appliance from starting.

use crate::combo::{ComboMatcher, ComboSpec};
use crate::menu::MenuEntry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default toggle socket location.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/mos_overlay.sock";

/// Substring that identifies a running menu process.
pub const DEFAULT_PROCESS_TOKEN: &str = "menu-overlay";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Combo and cooldown settings.
    pub trigger: TriggerConfig,
    /// Daemon settings.
    pub daemon: DaemonConfig,
    /// Menu process settings.
    pub menu: MenuConfig,
}

/// Combo and cooldown settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Minimum time between two fires.
    pub cooldown_ms: u64,
    /// Keyboard combo.
    pub keyboard: KeyboardCombo,
    /// Controller combo.
    pub joystick: JoystickCombo,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 800,
            keyboard: KeyboardCombo::default(),
            joystick: JoystickCombo::default(),
        }
    }
}

impl TriggerConfig {
    /// The cooldown as a duration.
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Resolve both combos into a matcher. Disabled combos and combos with
    /// unknown key names are left out.
    pub fn matcher(&self) -> ComboMatcher {
        let keyboard = resolve_combo(
            "keyboard",
            self.keyboard.enabled,
            &self.keyboard.hold_keys,
            &self.keyboard.tap_key,
        );
        let joystick = resolve_combo(
            "joystick",
            self.joystick.enabled,
            &self.joystick.hold_buttons,
            &self.joystick.tap_button,
        );
        ComboMatcher::new(keyboard, joystick)
    }
}

fn resolve_combo(label: &str, enabled: bool, hold: &[String], tap: &str) -> Option<ComboSpec> {
    if !enabled {
        log::info!("{} combo disabled", label);
        return None;
    }
    let combo = ComboSpec::from_names(hold, tap);
    if combo.is_none() {
        log::warn!(
            "{} combo has an unknown key name (hold {:?}, tap {:?}); disabled",
            label,
            hold,
            tap
        );
    }
    combo
}

/// Keyboard combo settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardCombo {
    pub enabled: bool,
    pub hold_keys: Vec<String>,
    pub tap_key: String,
}

impl Default for KeyboardCombo {
    fn default() -> Self {
        Self {
            enabled: true,
            hold_keys: Vec::new(),
            tap_key: "KEY_M".to_string(),
        }
    }
}

/// Controller combo settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JoystickCombo {
    pub enabled: bool,
    pub hold_buttons: Vec<String>,
    pub tap_button: String,
}

impl Default for JoystickCombo {
    fn default() -> Self {
        Self {
            enabled: true,
            hold_buttons: Vec::new(),
            tap_button: "BTN_START".to_string(),
        }
    }
}

/// Daemon settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Upper bound on one multiplexer wait.
    pub poll_timeout_ms: u64,
    /// Substring searched for in process command lines.
    pub process_token: String,
    /// Command used to start the menu. `None` means the `menu-overlay`
    /// executable next to the daemon.
    pub menu_command: Option<Vec<String>>,
    /// Directory scanned for input devices.
    pub input_dir: PathBuf,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: 1000,
            process_token: DEFAULT_PROCESS_TOKEN.to_string(),
            menu_command: None,
            input_dir: PathBuf::from("/dev/input"),
        }
    }
}

impl DaemonConfig {
    /// The poll timeout as a duration.
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

/// Menu process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Toggle socket path.
    pub socket_path: PathBuf,
    /// Delay between going full-screen and resetting selection/scroll.
    pub settle_ms: u64,
    /// Delay before the first reveal after startup.
    pub reveal_delay_ms: u64,
    /// Wrap selection at the ends of the list.
    pub wrap_around: bool,
    /// Number of item rows visible at once.
    pub visible_rows: usize,
    /// Menu contents.
    pub entries: Vec<MenuEntry>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            settle_ms: 80,
            reveal_delay_ms: 2000,
            wrap_around: false,
            visible_rows: 8,
            entries: MenuEntry::defaults(),
        }
    }
}

impl MenuConfig {
    /// The settle delay as a duration.
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// The startup reveal delay as a duration.
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

impl Config {
    /// Default config file location (`$XDG_CONFIG_HOME/mos-overlay/config.json`).
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/etc"))
            .join("mos-overlay")
            .join("config.json")
    }

    /// Parse a JSON document, falling back to defaults if it is malformed.
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Malformed config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Load from `path`, falling back to defaults if it is missing or malformed.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => {
                log::debug!("Loaded config from {}", path.display());
                Self::from_json(&text)
            }
            Err(e) => {
                log::warn!(
                    "Cannot read config {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Load from an explicit path or the default location.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::load(p),
            None => Self::load(&Self::default_path()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combo::ComboKind;
    use crate::event::KeyEvent;
    use crate::keycode::KeyId;
    use crate::state::PressedKeySet;
    use std::time::Instant;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.trigger.cooldown_ms, 800);
        assert!(config.trigger.keyboard.enabled);
        assert!(config.trigger.keyboard.hold_keys.is_empty());
        assert_eq!(config.trigger.keyboard.tap_key, "KEY_M");
        assert!(config.trigger.joystick.enabled);
        assert_eq!(config.trigger.joystick.tap_button, "BTN_START");
        assert_eq!(config.daemon.poll_timeout(), Duration::from_secs(1));
        assert_eq!(config.menu.socket_path, PathBuf::from(DEFAULT_SOCKET_PATH));
        assert!(!config.menu.entries.is_empty());
    }

    #[test]
    fn test_malformed_falls_back() {
        let config = Config::from_json("{ this is not json");
        assert_eq!(config.trigger.cooldown(), Duration::from_millis(800));
        assert_eq!(config.trigger.keyboard.tap_key, "KEY_M");

        let config = Config::from_json(r#"{"trigger": {"cooldown_ms": "soon"}}"#);
        assert_eq!(config.trigger.cooldown_ms, 800);
    }

    #[test]
    fn test_partial_document() {
        let config = Config::from_json(
            r#"{"trigger": {"cooldown_ms": 500, "keyboard": {"hold_keys": ["KEY_LEFTCTRL"]}}}"#,
        );
        assert_eq!(config.trigger.cooldown_ms, 500);
        assert_eq!(config.trigger.keyboard.hold_keys, vec!["KEY_LEFTCTRL"]);
        assert_eq!(config.trigger.keyboard.tap_key, "KEY_M");
        assert_eq!(config.trigger.joystick.tap_button, "BTN_START");
        assert_eq!(config.daemon.process_token, DEFAULT_PROCESS_TOKEN);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.json"));
        assert_eq!(config.trigger.cooldown_ms, 800);
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"trigger": {"joystick": {"enabled": false}}, "menu": {"wrap_around": true}}"#,
        )
        .unwrap();

        let config = Config::load_or_default(Some(&path));
        assert!(!config.trigger.joystick.enabled);
        assert!(config.menu.wrap_around);
    }

    #[test]
    fn test_matcher_resolution() {
        let now = Instant::now();
        let mut trigger = TriggerConfig::default();
        trigger.keyboard.hold_keys = vec!["KEY_LEFTCTRL".into()];
        trigger.joystick.enabled = false;

        let matcher = trigger.matcher();
        assert!(matcher.joystick().is_none());

        let mut pressed = PressedKeySet::new();
        pressed.apply(&KeyEvent::press(KeyId(29), now));
        pressed.apply(&KeyEvent::press(KeyId(50), now));
        assert_eq!(matcher.evaluate(&pressed), Some(ComboKind::Keyboard));
    }

    #[test]
    fn test_unknown_key_disables_combo() {
        let mut trigger = TriggerConfig::default();
        trigger.keyboard.tap_key = "KEY_DOES_NOT_EXIST".into();
        let matcher = trigger.matcher();
        assert!(matcher.keyboard().is_none());
        assert!(matcher.joystick().is_some());
    }
}
