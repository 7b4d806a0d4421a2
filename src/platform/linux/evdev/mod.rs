//! evdev-backed input devices.

use crate::device::InputSource;
use crate::event::{KeyEvent, Transition};
use crate::keycode::KeyId;
use evdev::{Device, EventType as EvdevEventType, InputEventKind};
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// An opened `/dev/input/event*` node.
pub struct InputDevice {
    path: PathBuf,
    name: String,
    device: Device,
}

impl InputDevice {
    /// Open a device node in non-blocking mode.
    ///
    /// Devices that report no `EV_KEY` capability are rejected, since they
    /// can never contribute to a combo.
    pub fn open(path: &Path) -> io::Result<Self> {
        let device = Device::open(path)?;

        if !device.supported_events().contains(EvdevEventType::KEY) {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "device reports no key events",
            ));
        }

        set_nonblocking(device.as_raw_fd())?;

        let name = device.name().unwrap_or("unknown").to_string();
        Ok(Self {
            path: path.to_path_buf(),
            name,
            device,
        })
    }
}

fn set_nonblocking(fd: RawFd) -> io::Result<()> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

impl AsRawFd for InputDevice {
    fn as_raw_fd(&self) -> RawFd {
        self.device.as_raw_fd()
    }
}

impl InputSource for InputDevice {
    fn path(&self) -> &Path {
        &self.path
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn read_events(&mut self, source: usize, out: &mut Vec<KeyEvent>) -> io::Result<usize> {
        let now = Instant::now();
        let mut count = 0;
        for ev in self.device.fetch_events()? {
            count += 1;
            if let Some(event) = convert_event(&ev, source, now) {
                out.push(event);
            }
        }
        Ok(count)
    }
}

/// Convert an evdev event to a key event. Anything but `EV_KEY` is dropped.
fn convert_event(ev: &evdev::InputEvent, source: usize, time: Instant) -> Option<KeyEvent> {
    match ev.kind() {
        InputEventKind::Key(key) => {
            let transition = Transition::from_value(ev.value())?;
            Some(KeyEvent::new(KeyId(key.code()), transition, source, time))
        }
        _ => None,
    }
}
