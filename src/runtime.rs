//! Event plumbing for the terminal front-end.
//!
//! The game core never sleeps or spawns; the host loop calls
//! [`crate::session::GameSession::tick`] whenever the runner hands back a
//! [`AppEvent::Tick`].

use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// How often the host polls the session clock.
pub const TICK_RATE: Duration = Duration::from_millis(100);

#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Anything that can hand the runner input events.
pub trait EventSource: Send + 'static {
    /// Wait up to `timeout` for the next event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Terminal input read on a background thread.
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let sent = match event::read() {
                // Windows reports releases too; only presses drive the game.
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    tx.send(AppEvent::Key(key))
                }
                Ok(CtEvent::Resize(_, _)) => tx.send(AppEvent::Resize),
                Ok(_) => Ok(()),
                Err(_) => break,
            };
            if sent.is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(TICK_RATE)
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-fed source for headless runs and tests.
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    last_tick: Cell<Instant>,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
            last_tick: Cell::new(Instant::now()),
        }
    }

    /// Next input event, or `Tick` once the interval has passed since the
    /// last one. Ticks stay on schedule while input keeps arriving.
    pub fn step(&self) -> AppEvent {
        let interval = self.ticker.interval();
        let elapsed = self.last_tick.get().elapsed();
        if elapsed >= interval {
            return self.tick();
        }

        let wait = interval - elapsed;
        match self.event_source.recv_timeout(wait) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => self.tick(),
            Err(RecvTimeoutError::Disconnected) => {
                // Nothing left to wait on; keep the tick pace instead of spinning.
                std::thread::sleep(wait);
                self.tick()
            }
        }
    }

    fn tick(&self) -> AppEvent {
        self.last_tick.set(Instant::now());
        AppEvent::Tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(1)),
        );

        assert!(matches!(runner.step(), AppEvent::Tick));
    }

    #[test]
    fn step_passes_through_keys() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Key(KeyEvent::new(
            KeyCode::Enter,
            KeyModifiers::NONE,
        )))
        .unwrap();
        let runner = Runner::new(TestEventSource::new(rx), FixedTicker::default());

        match runner.step() {
            AppEvent::Key(key) => assert_eq!(key.code, KeyCode::Enter),
            other => panic!("expected key event, got {:?}", other),
        }
    }

    #[test]
    fn disconnected_source_keeps_ticking() {
        let (tx, rx) = mpsc::channel::<AppEvent>();
        drop(tx);
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(1)),
        );
        assert!(matches!(runner.step(), AppEvent::Tick));
        assert!(matches!(runner.step(), AppEvent::Tick));
    }

    #[test]
    fn ticks_keep_firing_under_steady_input() {
        let (tx, rx) = mpsc::channel();
        for _ in 0..60 {
            tx.send(AppEvent::Key(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE)))
                .unwrap();
        }
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(10)),
        );

        let (mut keys, mut ticks) = (0, 0);
        while keys < 60 {
            match runner.step() {
                AppEvent::Key(_) => {
                    keys += 1;
                    std::thread::sleep(Duration::from_millis(2));
                }
                AppEvent::Tick => ticks += 1,
                AppEvent::Resize => {}
            }
        }
        // 60 keys at 2ms each span at least 120ms of 10ms intervals.
        assert!(ticks >= 5, "keys={keys} ticks={ticks}");
    }

    #[test]
    fn disconnected_source_waits_out_the_interval() {
        let (tx, rx) = mpsc::channel::<AppEvent>();
        drop(tx);
        let interval = Duration::from_millis(20);
        let runner = Runner::new(TestEventSource::new(rx), FixedTicker::new(interval));

        let started = Instant::now();
        for _ in 0..3 {
            assert!(matches!(runner.step(), AppEvent::Tick));
        }
        assert!(started.elapsed() >= interval * 3);
    }

    #[test]
    fn default_ticker_uses_tick_rate() {
        assert_eq!(FixedTicker::default().interval(), TICK_RATE);
    }
}
