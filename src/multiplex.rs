//! Bounded-timeout readiness wait over all open devices.
//!
//! One `poll(2)` call covers every active source. Ready sources are drained
//! with non-blocking reads until they report would-block. A source that
//! fails with any other I/O error is logged and excluded from later waits;
//! it stays owned by the multiplexer until the process exits.

use crate::device::InputSource;
use crate::error::{Error, Result};
use crate::event::KeyEvent;
use std::io;
use std::os::unix::io::AsRawFd;
use std::time::Duration;

/// Multiplexes reads across a fixed set of input sources.
pub struct EventMultiplexer<S: InputSource> {
    sources: Vec<S>,
    active: Vec<bool>,
    timeout: Duration,
}

impl<S: InputSource> EventMultiplexer<S> {
    /// Take ownership of the discovered sources.
    pub fn new(sources: Vec<S>, timeout: Duration) -> Self {
        let active = vec![true; sources.len()];
        Self {
            sources,
            active,
            timeout,
        }
    }

    /// All sources, including dropped ones.
    pub fn sources(&self) -> &[S] {
        &self.sources
    }

    /// Check if a source is still being waited on.
    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    /// Number of sources still being waited on.
    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    /// Block until at least one active source is readable or the timeout
    /// elapses. Returns the indices of ready sources.
    pub fn wait(&mut self) -> Result<Vec<usize>> {
        let indices: Vec<usize> = (0..self.sources.len())
            .filter(|i| self.active[*i])
            .collect();

        let mut poll_fds: Vec<libc::pollfd> = indices
            .iter()
            .map(|i| libc::pollfd {
                fd: self.sources[*i].as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            })
            .collect();

        let timeout_ms = self.timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;
        let ret = unsafe {
            libc::poll(
                poll_fds.as_mut_ptr(),
                poll_fds.len() as libc::nfds_t,
                timeout_ms,
            )
        };

        if ret < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(Vec::new());
            }
            return Err(Error::Poll(err.to_string()));
        }

        if ret == 0 {
            return Ok(Vec::new());
        }

        let ready_mask = libc::POLLIN | libc::POLLERR | libc::POLLHUP | libc::POLLNVAL;
        Ok(poll_fds
            .iter()
            .zip(indices)
            .filter(|(pfd, _)| pfd.revents & ready_mask != 0)
            .map(|(_, i)| i)
            .collect())
    }

    /// Read everything queued on one source into `out`.
    ///
    /// Returns `false` if the source failed and has been dropped.
    pub fn drain(&mut self, index: usize, out: &mut Vec<KeyEvent>) -> bool {
        if !self.is_active(index) {
            return false;
        }

        let source = &mut self.sources[index];
        loop {
            match source.read_events(index, out) {
                Ok(0) => return true,
                Ok(_) => continue,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return true,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::warn!(
                        "Dropping device {} | {}: {}",
                        source.path().display(),
                        source.name(),
                        e
                    );
                    self.active[index] = false;
                    if self.active_count() == 0 {
                        log::warn!("No input devices left to watch");
                    }
                    return false;
                }
            }
        }
    }

    /// Wait once, then drain every ready source. Returns the number of key
    /// events appended to `out`.
    pub fn poll_events(&mut self, out: &mut Vec<KeyEvent>) -> Result<usize> {
        let before = out.len();
        for index in self.wait()? {
            self.drain(index, out);
        }
        Ok(out.len() - before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Transition;
    use crate::keycode::KeyId;
    use std::io::{Read, Write};
    use std::os::unix::io::{AsRawFd, RawFd};
    use std::os::unix::net::UnixStream;
    use std::path::{Path, PathBuf};
    use std::time::Instant;

    /// Each byte read is a press of `KeyId(byte)`. Reads are capped at four
    /// bytes so a drain takes several calls.
    struct FakeSource {
        path: PathBuf,
        stream: UnixStream,
        fail: bool,
    }

    impl FakeSource {
        fn pair(name: &str) -> (Self, UnixStream) {
            let (ours, theirs) = UnixStream::pair().unwrap();
            ours.set_nonblocking(true).unwrap();
            let source = FakeSource {
                path: PathBuf::from(format!("/dev/input/{}", name)),
                stream: ours,
                fail: false,
            };
            (source, theirs)
        }
    }

    impl AsRawFd for FakeSource {
        fn as_raw_fd(&self) -> RawFd {
            self.stream.as_raw_fd()
        }
    }

    impl InputSource for FakeSource {
        fn path(&self) -> &Path {
            &self.path
        }

        fn name(&self) -> &str {
            "fake"
        }

        fn read_events(&mut self, source: usize, out: &mut Vec<KeyEvent>) -> io::Result<usize> {
            if self.fail {
                return Err(io::Error::other("device unplugged"));
            }
            let mut buf = [0u8; 4];
            let n = self.stream.read(&mut buf)?;
            if n == 0 {
                return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
            }
            let now = Instant::now();
            for b in &buf[..n] {
                out.push(KeyEvent::new(KeyId(*b as u16), Transition::Press, source, now));
            }
            Ok(n)
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_timeout_with_no_data() {
        let (a, _wa) = FakeSource::pair("event0");
        let mut mux = EventMultiplexer::new(vec![a], ms(20));

        let start = Instant::now();
        assert!(mux.wait().unwrap().is_empty());
        assert!(start.elapsed() >= ms(15));
    }

    #[test]
    fn test_ready_set_and_full_drain() {
        let (a, _wa) = FakeSource::pair("event0");
        let (b, mut wb) = FakeSource::pair("event1");
        let mut mux = EventMultiplexer::new(vec![a, b], ms(500));

        wb.write_all(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]).unwrap();
        assert_eq!(mux.wait().unwrap(), vec![1]);

        let mut out = Vec::new();
        assert!(mux.drain(1, &mut out));
        let keys: Vec<u16> = out.iter().map(|e| e.key.0).collect();
        assert_eq!(keys, (1..=10).collect::<Vec<u16>>());
        assert!(out.iter().all(|e| e.source == 1));

        // Drained: nothing left, so the next wait times out.
        mux.timeout = ms(10);
        assert!(mux.wait().unwrap().is_empty());
    }

    #[test]
    fn test_poll_events_preserves_per_device_order() {
        let (a, mut wa) = FakeSource::pair("event0");
        let (b, mut wb) = FakeSource::pair("event1");
        let mut mux = EventMultiplexer::new(vec![a, b], ms(500));

        wa.write_all(&[10, 11, 12]).unwrap();
        wb.write_all(&[20, 21]).unwrap();

        let mut out = Vec::new();
        let mut total = 0;
        while total < 5 {
            total += mux.poll_events(&mut out).unwrap();
        }

        let from = |src: usize| -> Vec<u16> {
            out.iter()
                .filter(|e| e.source == src)
                .map(|e| e.key.0)
                .collect()
        };
        assert_eq!(from(0), vec![10, 11, 12]);
        assert_eq!(from(1), vec![20, 21]);
    }

    #[test]
    fn test_io_error_drops_device() {
        let (mut a, mut wa) = FakeSource::pair("event0");
        let (b, mut wb) = FakeSource::pair("event1");
        a.fail = true;
        let mut mux = EventMultiplexer::new(vec![a, b], ms(200));

        wa.write_all(&[1]).unwrap();
        let mut out = Vec::new();
        mux.poll_events(&mut out).unwrap();
        assert!(out.is_empty());
        assert!(!mux.is_active(0));
        assert_eq!(mux.active_count(), 1);
        assert_eq!(mux.sources().len(), 2);

        // Still readable, but no longer waited on.
        wb.write_all(&[2]).unwrap();
        assert_eq!(mux.wait().unwrap(), vec![1]);
        assert!(!mux.drain(0, &mut out));
    }

    #[test]
    fn test_hangup_drops_device() {
        let (a, wa) = FakeSource::pair("event0");
        let mut mux = EventMultiplexer::new(vec![a], ms(200));
        drop(wa);

        let mut out = Vec::new();
        mux.poll_events(&mut out).unwrap();
        assert_eq!(mux.active_count(), 0);

        // With nothing left the wait just times out.
        assert!(mux.wait().unwrap().is_empty());
    }
}
