//! Single-threaded UI loop with a deferred-call queue.
//!
//! All state owned by the loop is mutated only on the thread that calls
//! [`UiLoop::run`] or [`UiLoop::turn`]. Other threads hold a [`UiHandle`]
//! and post closures to it; the loop drains the queue once per iteration.
//!
//! # Example
//!
//! ```
//! use mos_overlay::ui::UiLoop;
//! use std::time::Duration;
//!
//! let mut ui: UiLoop<u32> = UiLoop::new();
//! let handle = ui.handle();
//! std::thread::spawn(move || {
//!     let _ = handle.call_soon(|count| *count += 1);
//! })
//! .join()
//! .unwrap();
//!
//! let mut count = 0;
//! ui.turn(&mut count, Duration::from_millis(100));
//! assert_eq!(count, 1);
//! ```

use crate::error::{Error, Result};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

/// A closure run on the UI thread.
pub type Task<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

enum Message<S> {
    Call(Task<S>),
    CallAt(Instant, Task<S>),
}

/// Cloneable, `Send` handle for posting work onto the UI loop.
pub struct UiHandle<S> {
    tx: Sender<Message<S>>,
}

impl<S> Clone for UiHandle<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S> UiHandle<S> {
    /// Run `f` on the UI thread at the next loop iteration.
    pub fn call_soon<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.tx
            .send(Message::Call(Box::new(f)))
            .map_err(|_| Error::UiClosed)
    }

    /// Run `f` on the UI thread once `delay` has elapsed.
    pub fn call_later<F>(&self, delay: Duration, f: F) -> Result<()>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.tx
            .send(Message::CallAt(Instant::now() + delay, Box::new(f)))
            .map_err(|_| Error::UiClosed)
    }
}

struct Timer<S> {
    deadline: Instant,
    seq: u64,
    task: Task<S>,
}

/// The loop itself. Not `Send`-shared; lives on the UI thread.
pub struct UiLoop<S> {
    tx: Sender<Message<S>>,
    rx: Receiver<Message<S>>,
    timers: Vec<Timer<S>>,
    next_seq: u64,
    tick: Duration,
}

impl<S> Default for UiLoop<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> UiLoop<S> {
    /// Create a loop with a 100ms idle tick.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            timers: Vec::new(),
            next_seq: 0,
            tick: Duration::from_millis(100),
        }
    }

    /// Set the idle tick (the longest a turn waits with nothing queued).
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// A handle for posting work from any thread.
    pub fn handle(&self) -> UiHandle<S> {
        UiHandle {
            tx: self.tx.clone(),
        }
    }

    /// Number of scheduled timers not yet run.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Run one iteration: wait up to `max_wait` (or until the next timer) for
    /// work, drain everything queued so far, then run due timers.
    ///
    /// Work posted by tasks during this turn runs on the next turn. Returns
    /// the number of tasks run.
    pub fn turn(&mut self, state: &mut S, max_wait: Duration) -> usize {
        let now = Instant::now();
        let wait = match self.timers.iter().map(|t| t.deadline).min() {
            Some(deadline) => max_wait.min(deadline.saturating_duration_since(now)),
            None => max_wait,
        };

        let mut batch = Vec::new();
        match self.rx.recv_timeout(wait) {
            Ok(message) => batch.push(message),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {}
        }
        while let Ok(message) = self.rx.try_recv() {
            batch.push(message);
        }

        let mut ran = 0;
        for message in batch {
            match message {
                Message::Call(task) => {
                    task(state);
                    ran += 1;
                }
                Message::CallAt(deadline, task) => {
                    let seq = self.next_seq;
                    self.next_seq += 1;
                    self.timers.push(Timer {
                        deadline,
                        seq,
                        task,
                    });
                }
            }
        }

        let now = Instant::now();
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|t| t.deadline <= now);
        self.timers = pending;
        due.sort_by_key(|t| (t.deadline, t.seq));
        for timer in due {
            (timer.task)(state);
            ran += 1;
        }

        ran
    }

    /// Turn until `on_turn` returns `false`.
    ///
    /// `on_turn` runs on the UI thread after every iteration and is where a
    /// toolkit would pump its own input.
    pub fn run<F>(&mut self, state: &mut S, mut on_turn: F)
    where
        F: FnMut(&mut S) -> bool,
    {
        loop {
            self.turn(state, self.tick);
            if !on_turn(state) {
                break;
            }
        }
    }
}
