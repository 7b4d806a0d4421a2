//! The menu process's visibility state machine.
//!
//! ```text
//!            toggle / show                 toggle / hide / hiding action
//!   Hidden ------------------> Visible ---------------------------------> Hidden
//!                                 |
//!                                 | escape
//!                                 v
//!                            (terminated)
//! ```
//!
//! Hiding keeps the process resident so the next show is instant; escape
//! ends the process. The drawing itself is delegated to a [`Surface`].

use crate::action::{self, Action};
use crate::config::MenuConfig;
use crate::device::InputSource;
use crate::event::{KeyEvent, Transition};
use crate::keycode::KeyId;
use crate::multiplex::EventMultiplexer;
use crate::ui::UiHandle;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Whether the overlay is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

/// Requests the menu handles on the UI thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuRequest {
    Toggle,
    Show,
    Hide,
    Up,
    Down,
    Select,
    Escape,
}

impl MenuRequest {
    /// Map a pressed key or button to a request.
    pub fn from_key(key: KeyId) -> Option<Self> {
        match key.name()? {
            "KEY_UP" | "BTN_DPAD_UP" => Some(MenuRequest::Up),
            "KEY_DOWN" | "BTN_DPAD_DOWN" => Some(MenuRequest::Down),
            "KEY_ENTER" | "KEY_KPENTER" | "BTN_SOUTH" => Some(MenuRequest::Select),
            "KEY_ESC" => Some(MenuRequest::Escape),
            _ => None,
        }
    }
}

/// A selectable menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub action: Action,
    #[serde(default)]
    pub danger: bool,
}

/// One row of the menu: a section header or an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MenuEntry {
    Header { label: String },
    Item(MenuItem),
}

impl MenuEntry {
    fn header(label: &str) -> Self {
        MenuEntry::Header {
            label: label.to_string(),
        }
    }

    fn item(label: &str, description: &str, action: Action) -> Self {
        MenuEntry::Item(MenuItem {
            label: label.to_string(),
            description: description.to_string(),
            action,
            danger: false,
        })
    }

    fn danger(label: &str, description: &str, action: Action) -> Self {
        MenuEntry::Item(MenuItem {
            label: label.to_string(),
            description: description.to_string(),
            action,
            danger: true,
        })
    }

    /// The appliance's stock menu.
    pub fn defaults() -> Vec<MenuEntry> {
        vec![
            MenuEntry::header("Applications"),
            MenuEntry::item(
                "EmulationStation",
                "Back to the main frontend",
                Action::launch(["es-de"]),
            ),
            MenuEntry::item(
                "Steam",
                "Big Picture mode",
                Action::launch(["flatpak", "run", "com.valvesoftware.Steam"]),
            ),
            MenuEntry::item(
                "Waydroid",
                "Android container",
                Action::launch(["waydroid", "show-full-ui"]),
            ),
            MenuEntry::header("System"),
            MenuEntry::item("Back to game", "Hide this menu", Action::Hide),
            MenuEntry::item(
                "Volume up",
                "+5%",
                Action::run(["pactl", "set-sink-volume", "@DEFAULT_SINK@", "+5%"], true),
            ),
            MenuEntry::item(
                "Volume down",
                "-5%",
                Action::run(["pactl", "set-sink-volume", "@DEFAULT_SINK@", "-5%"], true),
            ),
            MenuEntry::item(
                "Brightness up",
                "+5%",
                Action::Run {
                    alternatives: vec![
                        vec!["brightnessctl".into(), "set".into(), "5%+".into()],
                        vec!["light".into(), "-A".into(), "5".into()],
                    ],
                    refresh: true,
                },
            ),
            MenuEntry::item(
                "Brightness down",
                "-5%",
                Action::Run {
                    alternatives: vec![
                        vec!["brightnessctl".into(), "set".into(), "5%-".into()],
                        vec!["light".into(), "-U".into(), "5".into()],
                    ],
                    refresh: true,
                },
            ),
            MenuEntry::header("Power"),
            MenuEntry::danger(
                "Reboot",
                "Restart the system",
                Action::Launch {
                    command: vec!["systemctl".into(), "reboot".into()],
                    hide: false,
                },
            ),
            MenuEntry::danger(
                "Power off",
                "Shut down the system",
                Action::Launch {
                    command: vec!["systemctl".into(), "poweroff".into()],
                    hide: false,
                },
            ),
        ]
    }
}

/// The drawing side of the overlay. Called only on the UI thread.
pub trait Surface {
    /// Map the window full-screen.
    fn show_fullscreen(&mut self);
    /// Unmap the window without destroying it.
    fn withdraw(&mut self);
    /// Highlight the item at `index` (item index, headers excluded).
    fn highlight(&mut self, index: usize);
    /// Scroll so item row `row` is at the top.
    fn scroll_to(&mut self, row: usize);
    /// Redraw item descriptions after an action changed system state.
    fn refresh(&mut self);
    /// Destroy the window.
    fn close(&mut self);
    /// Input collected since the last call.
    fn poll_input(&mut self) -> Vec<MenuRequest> {
        Vec::new()
    }
}

/// A surface that only logs, driven by raw key presses.
///
/// Used when no display toolkit is attached. Key presses from the optional
/// input devices are mapped with [`MenuRequest::from_key`]; the menu itself
/// drops navigation while hidden.
pub struct HeadlessSurface<S: InputSource> {
    input: Option<EventMultiplexer<S>>,
    events: Vec<KeyEvent>,
}

impl<S: InputSource> HeadlessSurface<S> {
    /// Create a surface reading from `input`. The multiplexer should use a
    /// zero timeout, since it is polled once per UI turn.
    pub fn new(input: Option<EventMultiplexer<S>>) -> Self {
        Self {
            input,
            events: Vec::new(),
        }
    }
}

impl<S: InputSource> Surface for HeadlessSurface<S> {
    fn show_fullscreen(&mut self) {
        log::info!("Overlay shown");
    }

    fn withdraw(&mut self) {
        log::info!("Overlay hidden");
    }

    fn highlight(&mut self, index: usize) {
        log::debug!("Highlight item {}", index);
    }

    fn scroll_to(&mut self, row: usize) {
        log::debug!("Scroll to row {}", row);
    }

    fn refresh(&mut self) {
        log::debug!("Refresh");
    }

    fn close(&mut self) {
        log::info!("Overlay closed");
    }

    fn poll_input(&mut self) -> Vec<MenuRequest> {
        let Some(input) = self.input.as_mut() else {
            return Vec::new();
        };

        self.events.clear();
        if let Err(e) = input.poll_events(&mut self.events) {
            log::warn!("Menu input unavailable: {}", e);
            self.input = None;
            return Vec::new();
        }

        self.events
            .iter()
            .filter(|event| event.transition == Transition::Press)
            .filter_map(|event| MenuRequest::from_key(event.key))
            .collect()
    }
}

/// Menu state owned by the UI thread.
pub struct Menu {
    surface: Box<dyn Surface>,
    items: Vec<MenuItem>,
    visibility: Visibility,
    selection: usize,
    scroll: usize,
    visible_rows: usize,
    wrap_around: bool,
    settle: Duration,
    ui: UiHandle<Menu>,
    terminated: bool,
}

impl Menu {
    /// Build the menu in the `Hidden` state.
    pub fn new(config: &MenuConfig, surface: Box<dyn Surface>, ui: UiHandle<Menu>) -> Self {
        let items = config
            .entries
            .iter()
            .filter_map(|entry| match entry {
                MenuEntry::Item(item) => Some(item.clone()),
                MenuEntry::Header { .. } => None,
            })
            .collect();

        Self {
            surface,
            items,
            visibility: Visibility::Hidden,
            selection: 0,
            scroll: 0,
            visible_rows: config.visible_rows.max(1),
            wrap_around: config.wrap_around,
            settle: config.settle(),
            ui,
            terminated: false,
        }
    }

    /// Current visibility.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Index of the selected item, headers excluded.
    pub fn selection(&self) -> usize {
        self.selection
    }

    /// First item row in view.
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// The selectable items.
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// True once escape has destroyed the overlay.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Dispatch a request.
    pub fn handle(&mut self, request: MenuRequest) {
        if self.terminated {
            return;
        }
        match request {
            MenuRequest::Toggle => self.toggle(),
            MenuRequest::Show => self.show(),
            MenuRequest::Hide => self.hide(),
            MenuRequest::Escape => self.escape(),
            _ if self.visibility == Visibility::Hidden => {
                log::debug!("Ignoring {:?} while hidden", request);
            }
            MenuRequest::Up => self.move_selection(-1),
            MenuRequest::Down => self.move_selection(1),
            MenuRequest::Select => self.select(),
        }
    }

    /// Flip between `Hidden` and `Visible`.
    pub fn toggle(&mut self) {
        match self.visibility {
            Visibility::Hidden => self.show(),
            Visibility::Visible => self.hide(),
        }
    }

    /// `Hidden -> Visible`: go full-screen, then after the settle delay reset
    /// selection and scroll.
    pub fn show(&mut self) {
        if self.terminated || self.visibility == Visibility::Visible {
            return;
        }
        self.surface.show_fullscreen();
        self.visibility = Visibility::Visible;

        if self
            .ui
            .call_later(self.settle, Menu::reset_position)
            .is_err()
        {
            self.reset_position();
        }
    }

    /// `Visible -> Hidden`. The process stays resident.
    pub fn hide(&mut self) {
        if self.visibility == Visibility::Hidden {
            return;
        }
        self.surface.withdraw();
        self.visibility = Visibility::Hidden;
    }

    /// `Visible -> terminated`. Unlike [`Menu::hide`], this ends the process.
    pub fn escape(&mut self) {
        if self.visibility != Visibility::Visible {
            log::debug!("Ignoring escape while hidden");
            return;
        }
        self.surface.close();
        self.terminated = true;
    }

    fn reset_position(&mut self) {
        self.selection = 0;
        self.surface.highlight(0);
        self.scroll = 0;
        self.surface.scroll_to(0);
    }

    /// Move the selection by `delta`, clamped (or wrapped) at the ends.
    pub fn move_selection(&mut self, delta: isize) {
        let count = self.items.len();
        if count == 0 {
            return;
        }

        let previous = self.selection;
        let target = previous as isize + delta;
        self.selection = if self.wrap_around {
            target.rem_euclid(count as isize) as usize
        } else {
            target.clamp(0, count as isize - 1) as usize
        };

        if self.selection == previous {
            return;
        }
        self.surface.highlight(self.selection);
        self.ensure_visible();
    }

    /// Centre the selection in the viewport when the list overflows.
    fn ensure_visible(&mut self) {
        let count = self.items.len();
        if count <= self.visible_rows {
            return;
        }
        let max_scroll = count - self.visible_rows;
        let top = self
            .selection
            .saturating_sub(self.visible_rows / 2)
            .min(max_scroll);
        if top != self.scroll {
            self.scroll = top;
            self.surface.scroll_to(top);
        }
    }

    /// Trigger the selected item's action.
    pub fn select(&mut self) {
        let Some(item) = self.items.get(self.selection).cloned() else {
            return;
        };
        log::info!("Selected {}", item.label);

        let hides = item.action.hides();
        match item.action {
            Action::Hide => {}
            Action::Launch { command, .. } => {
                action::spawn_worker("launch", move || action::launch(&command));
            }
            Action::Run {
                alternatives,
                refresh,
            } => {
                let ui = self.ui.clone();
                let label = item.label;
                action::spawn_worker("action", move || {
                    let ok = action::run_alternatives(&alternatives).is_some();
                    let _ = ui.call_soon(move |menu: &mut Menu| {
                        menu.action_finished(&label, ok, refresh)
                    });
                });
            }
        }

        if hides {
            self.hide();
        }
    }

    fn action_finished(&mut self, label: &str, ok: bool, refresh: bool) {
        log::debug!("{} finished (ok: {})", label, ok);
        if refresh && !self.terminated {
            self.surface.refresh();
        }
    }

    /// Pump surface input. Returns `false` once the menu has terminated.
    pub fn on_turn(&mut self) -> bool {
        for request in self.surface.poll_input() {
            self.handle(request);
        }
        !self.terminated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::UiLoop;
    use std::io::{self, Read, Write};
    use std::os::unix::io::{AsRawFd, RawFd};
    use std::os::unix::net::UnixStream;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Show,
        Withdraw,
        Highlight(usize),
        Scroll(usize),
        Refresh,
        Close,
    }

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<Call>>>,
        input: Arc<Mutex<Vec<MenuRequest>>>,
    }

    impl Recorder {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn clear(&self) {
            self.calls.lock().unwrap().clear();
        }

        fn push(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl Surface for Recorder {
        fn show_fullscreen(&mut self) {
            self.push(Call::Show);
        }
        fn withdraw(&mut self) {
            self.push(Call::Withdraw);
        }
        fn highlight(&mut self, index: usize) {
            self.push(Call::Highlight(index));
        }
        fn scroll_to(&mut self, row: usize) {
            self.push(Call::Scroll(row));
        }
        fn refresh(&mut self) {
            self.push(Call::Refresh);
        }
        fn close(&mut self) {
            self.push(Call::Close);
        }
        fn poll_input(&mut self) -> Vec<MenuRequest> {
            std::mem::take(&mut *self.input.lock().unwrap())
        }
    }

    fn item(label: &str, action: Action) -> MenuEntry {
        MenuEntry::Item(MenuItem {
            label: label.into(),
            description: String::new(),
            action,
            danger: false,
        })
    }

    fn config(items: usize) -> MenuConfig {
        let mut entries = vec![MenuEntry::header("Section")];
        for i in 0..items {
            entries.push(item(&format!("item {}", i), Action::run(["true"], false)));
        }
        MenuConfig {
            settle_ms: 0,
            visible_rows: 4,
            entries,
            ..MenuConfig::default()
        }
    }

    fn setup(config: &MenuConfig) -> (UiLoop<Menu>, Menu, Recorder) {
        let ui = UiLoop::new();
        let recorder = Recorder::default();
        let menu = Menu::new(config, Box::new(recorder.clone()), ui.handle());
        (ui, menu, recorder)
    }

    fn settle(ui: &mut UiLoop<Menu>, menu: &mut Menu) {
        ui.turn(menu, Duration::from_millis(10));
    }

    #[test]
    fn test_starts_hidden() {
        let (_ui, menu, recorder) = setup(&config(3));
        assert_eq!(menu.visibility(), Visibility::Hidden);
        assert_eq!(menu.items().len(), 3);
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn test_toggle_shows_and_resets() {
        let (mut ui, mut menu, recorder) = setup(&config(10));
        menu.toggle();
        settle(&mut ui, &mut menu);
        for _ in 0..7 {
            menu.handle(MenuRequest::Down);
        }
        assert_eq!(menu.selection(), 7);
        assert!(menu.scroll() > 0);

        menu.toggle();
        assert_eq!(menu.visibility(), Visibility::Hidden);
        assert!(!menu.is_terminated());

        recorder.clear();
        menu.toggle();
        assert_eq!(menu.visibility(), Visibility::Visible);
        assert_eq!(recorder.calls(), vec![Call::Show]);

        // Reset happens after the settle delay, on the UI loop.
        settle(&mut ui, &mut menu);
        assert_eq!(menu.selection(), 0);
        assert_eq!(menu.scroll(), 0);
        assert_eq!(
            recorder.calls(),
            vec![Call::Show, Call::Highlight(0), Call::Scroll(0)]
        );
    }

    #[test]
    fn test_settle_delay_defers_reset() {
        let mut cfg = config(3);
        cfg.settle_ms = 40;
        let (mut ui, mut menu, recorder) = setup(&cfg);

        let start = Instant::now();
        menu.show();
        ui.turn(&mut menu, Duration::ZERO);
        assert_eq!(recorder.calls(), vec![Call::Show]);

        while recorder.calls().len() < 3 && start.elapsed() < Duration::from_secs(2) {
            ui.turn(&mut menu, Duration::from_millis(20));
        }
        assert!(start.elapsed() >= Duration::from_millis(40));
        assert_eq!(
            recorder.calls(),
            vec![Call::Show, Call::Highlight(0), Call::Scroll(0)]
        );
    }

    #[test]
    fn test_repeated_toggles_stay_resident() {
        let (mut ui, mut menu, recorder) = setup(&config(2));
        for round in 0..5 {
            menu.handle(MenuRequest::Toggle);
            settle(&mut ui, &mut menu);
            assert_eq!(menu.visibility(), Visibility::Visible, "round {}", round);
            menu.handle(MenuRequest::Toggle);
            assert_eq!(menu.visibility(), Visibility::Hidden, "round {}", round);
        }
        assert!(!menu.is_terminated());
        assert!(!recorder.calls().contains(&Call::Close));
    }

    #[test]
    fn test_escape_terminates_but_hide_does_not() {
        let (mut ui, mut menu, recorder) = setup(&config(2));
        menu.show();
        settle(&mut ui, &mut menu);

        menu.handle(MenuRequest::Hide);
        assert!(!menu.is_terminated());
        assert_eq!(menu.visibility(), Visibility::Hidden);

        // Escape only applies while on screen.
        menu.handle(MenuRequest::Escape);
        assert!(!menu.is_terminated());

        menu.handle(MenuRequest::Show);
        menu.handle(MenuRequest::Escape);
        assert!(menu.is_terminated());
        assert_eq!(recorder.calls().last(), Some(&Call::Close));

        // Nothing revives a terminated menu.
        menu.handle(MenuRequest::Toggle);
        assert!(menu.is_terminated());
        assert!(!menu.on_turn());
    }

    #[test]
    fn test_selection_clamps() {
        let (mut ui, mut menu, recorder) = setup(&config(3));
        menu.show();
        settle(&mut ui, &mut menu);
        recorder.clear();

        menu.handle(MenuRequest::Up);
        assert_eq!(menu.selection(), 0);
        assert!(recorder.calls().is_empty());

        menu.handle(MenuRequest::Down);
        menu.handle(MenuRequest::Down);
        menu.handle(MenuRequest::Down);
        assert_eq!(menu.selection(), 2);
        assert_eq!(
            recorder.calls(),
            vec![Call::Highlight(1), Call::Highlight(2)]
        );
    }

    #[test]
    fn test_selection_wraps() {
        let mut cfg = config(3);
        cfg.wrap_around = true;
        let (mut ui, mut menu, _recorder) = setup(&cfg);
        menu.show();
        settle(&mut ui, &mut menu);

        menu.handle(MenuRequest::Up);
        assert_eq!(menu.selection(), 2);
        menu.handle(MenuRequest::Down);
        assert_eq!(menu.selection(), 0);
    }

    #[test]
    fn test_scroll_follows_selection() {
        let (mut ui, mut menu, _recorder) = setup(&config(10));
        menu.show();
        settle(&mut ui, &mut menu);

        for _ in 0..9 {
            menu.handle(MenuRequest::Down);
        }
        assert_eq!(menu.selection(), 9);
        assert_eq!(menu.scroll(), 6);

        for _ in 0..9 {
            menu.handle(MenuRequest::Up);
        }
        assert_eq!(menu.scroll(), 0);
    }

    #[test]
    fn test_input_ignored_while_hidden() {
        let (_ui, mut menu, recorder) = setup(&config(3));
        menu.handle(MenuRequest::Down);
        menu.handle(MenuRequest::Select);
        assert_eq!(menu.selection(), 0);
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn test_hide_action_hides() {
        let cfg = MenuConfig {
            settle_ms: 0,
            entries: vec![item("Back", Action::Hide)],
            ..MenuConfig::default()
        };
        let (mut ui, mut menu, _recorder) = setup(&cfg);
        menu.show();
        settle(&mut ui, &mut menu);

        menu.handle(MenuRequest::Select);
        assert_eq!(menu.visibility(), Visibility::Hidden);
        assert!(!menu.is_terminated());
    }

    #[test]
    fn test_launch_action_hides() {
        let cfg = MenuConfig {
            settle_ms: 0,
            entries: vec![item("App", Action::launch(["true"]))],
            ..MenuConfig::default()
        };
        let (mut ui, mut menu, _recorder) = setup(&cfg);
        menu.show();
        settle(&mut ui, &mut menu);

        menu.select();
        assert_eq!(menu.visibility(), Visibility::Hidden);
    }

    #[test]
    fn test_run_action_refreshes_on_ui_thread() {
        let cfg = MenuConfig {
            settle_ms: 0,
            entries: vec![item("Volume", Action::run(["true"], true))],
            ..MenuConfig::default()
        };
        let (mut ui, mut menu, recorder) = setup(&cfg);
        menu.show();
        settle(&mut ui, &mut menu);

        menu.select();
        assert_eq!(menu.visibility(), Visibility::Visible);

        let start = Instant::now();
        while !recorder.calls().contains(&Call::Refresh) && start.elapsed() < Duration::from_secs(5)
        {
            ui.turn(&mut menu, Duration::from_millis(20));
        }
        assert!(recorder.calls().contains(&Call::Refresh));
    }

    #[test]
    fn test_surface_input_is_pumped() {
        let (mut ui, mut menu, recorder) = setup(&config(3));
        menu.show();
        settle(&mut ui, &mut menu);

        recorder
            .input
            .lock()
            .unwrap()
            .extend([MenuRequest::Down, MenuRequest::Escape]);
        assert!(!menu.on_turn());
        assert_eq!(menu.selection(), 1);
        assert!(menu.is_terminated());
    }

    /// Two bytes per event: key code, then 0/1/2 for release/press/repeat.
    struct KeySource {
        path: PathBuf,
        stream: UnixStream,
    }

    impl AsRawFd for KeySource {
        fn as_raw_fd(&self) -> RawFd {
            self.stream.as_raw_fd()
        }
    }

    impl InputSource for KeySource {
        fn path(&self) -> &Path {
            &self.path
        }

        fn name(&self) -> &str {
            "keys"
        }

        fn read_events(&mut self, source: usize, out: &mut Vec<KeyEvent>) -> io::Result<usize> {
            let mut buf = [0u8; 2];
            self.stream.read_exact(&mut buf)?;
            let transition = Transition::from_value(buf[1] as i32)
                .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidData))?;
            out.push(KeyEvent::new(KeyId(buf[0] as u16), transition, source, Instant::now()));
            Ok(1)
        }
    }

    fn headless_with_keys(config: &MenuConfig) -> (UiLoop<Menu>, Menu, UnixStream) {
        let (ours, theirs) = UnixStream::pair().unwrap();
        ours.set_nonblocking(true).unwrap();
        let source = KeySource {
            path: PathBuf::from("/dev/input/event0"),
            stream: ours,
        };
        let surface = HeadlessSurface::new(Some(EventMultiplexer::new(vec![source], Duration::ZERO)));

        let ui = UiLoop::new();
        let menu = Menu::new(config, Box::new(surface), ui.handle());
        (ui, menu, theirs)
    }

    const ESC: u8 = 1;
    const DOWN: u8 = 108;

    #[test]
    fn test_headless_keys_drive_menu() {
        let (mut ui, mut menu, mut keys) = headless_with_keys(&config(3));

        // Hidden: presses are consumed but change nothing.
        keys.write_all(&[DOWN, 1, DOWN, 0, ESC, 1, ESC, 0]).unwrap();
        assert!(menu.on_turn());
        assert_eq!(menu.selection(), 0);
        assert!(!menu.is_terminated());

        menu.show();
        settle(&mut ui, &mut menu);

        // Releases and repeats are not requests.
        keys.write_all(&[DOWN, 1, DOWN, 2, DOWN, 0]).unwrap();
        assert!(menu.on_turn());
        assert_eq!(menu.selection(), 1);

        keys.write_all(&[ESC, 1]).unwrap();
        assert!(!menu.on_turn());
        assert!(menu.is_terminated());
    }

    #[test]
    fn test_headless_without_input() {
        let ui: UiLoop<Menu> = UiLoop::new();
        let surface: HeadlessSurface<KeySource> = HeadlessSurface::new(None);
        let mut menu = Menu::new(&config(3), Box::new(surface), ui.handle());
        menu.show();
        assert!(menu.on_turn());
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(MenuRequest::from_key(KeyId(103)), Some(MenuRequest::Up));
        assert_eq!(MenuRequest::from_key(KeyId(108)), Some(MenuRequest::Down));
        assert_eq!(MenuRequest::from_key(KeyId(28)), Some(MenuRequest::Select));
        assert_eq!(MenuRequest::from_key(KeyId(1)), Some(MenuRequest::Escape));
        assert_eq!(MenuRequest::from_key(KeyId(0x130)), Some(MenuRequest::Select));
        assert_eq!(MenuRequest::from_key(KeyId(50)), None);
    }

    #[test]
    fn test_entries_deserialize() {
        let entries: Vec<MenuEntry> = serde_json::from_str(
            r#"[
                {"type": "header", "label": "Apps"},
                {"type": "item", "label": "Steam", "action": {"kind": "launch", "command": ["steam"]}}
            ]"#,
        )
        .unwrap();
        assert_eq!(entries.len(), 2);
        assert!(matches!(&entries[1], MenuEntry::Item(item) if item.label == "Steam" && item.action.hides()));
    }
}
