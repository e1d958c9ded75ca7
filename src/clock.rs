use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Where the session reads the current time from.
pub trait TimeSource {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for tests and headless runs. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualTimeSource {
    now: Rc<Cell<Instant>>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Countdown for a session. Polled; it never schedules anything itself.
#[derive(Debug, Clone, Default)]
pub struct SessionClock {
    ends_at: Option<Instant>,
    frozen: Option<Duration>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, duration_minutes: u32, now: Instant) {
        self.start_for(Duration::from_secs(duration_minutes as u64 * 60), now);
    }

    pub fn start_for(&mut self, duration: Duration, now: Instant) {
        self.ends_at = Some(now + duration);
        self.frozen = None;
    }

    /// Freeze the remaining time, e.g. when the session ends early.
    pub fn stop(&mut self, now: Instant) {
        if self.ends_at.is_some() && self.frozen.is_none() {
            self.frozen = Some(self.remaining(now));
        }
    }

    pub fn is_running(&self) -> bool {
        self.ends_at.is_some() && self.frozen.is_none()
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        if let Some(frozen) = self.frozen {
            return frozen;
        }
        self.ends_at
            .map(|end| end.saturating_duration_since(now))
            .unwrap_or_default()
    }

    pub fn expired(&self, now: Instant) -> bool {
        self.is_running() && self.remaining(now).is_zero()
    }
}

/// `m:ss`, the way the timer is shown in game.
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
