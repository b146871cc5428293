use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);
pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// How long to block on input while nothing is scheduled.
pub const IDLE_POLL: Duration = Duration::from_millis(250);

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum BreathEvent {
    Key(KeyEvent),
    Resize,
    /// One second of session time has passed.
    Tick,
    /// The display is due for a redraw.
    Frame,
    /// Nothing happened before the wait expired.
    Idle,
    /// The event source has shut down; no further input will arrive.
    Closed,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait BreathEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<BreathEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<BreathEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                // Windows reports releases too
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    if tx.send(BreathEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(BreathEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(%err, "terminal event stream closed");
                    break;
                }
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

impl BreathEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<BreathEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source for unit tests. Never blocks: queued events are handed
/// out immediately, so tests move time with a `ManualClock` instead.
pub struct TestEventSource {
    rx: Receiver<BreathEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<BreathEvent>) -> Self {
        Self { rx }
    }
}

impl BreathEventSource for TestEventSource {
    fn recv_timeout(&self, _timeout: Duration) -> Result<BreathEvent, RecvTimeoutError> {
        self.rx.try_recv().map_err(|err| match err {
            TryRecvError::Empty => RecvTimeoutError::Timeout,
            TryRecvError::Disconnected => RecvTimeoutError::Disconnected,
        })
    }
}

/// Which recurring callback is due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Due {
    Tick,
    Frame,
}

/// Deadlines of the one-second tick and the display-refresh frame.
///
/// Both handles are armed and cancelled together. Once cancelled, nothing is
/// due until the next `arm`.
#[derive(Clone, Debug)]
pub struct Schedule {
    tick_at: Option<Duration>,
    frame_at: Option<Duration>,
    tick_interval: Duration,
    frame_interval: Duration,
}

impl Schedule {
    pub fn new(tick_interval: Duration, frame_interval: Duration) -> Self {
        Self {
            tick_at: None,
            frame_at: None,
            tick_interval,
            frame_interval,
        }
    }

    pub fn arm(&mut self, now: Duration) {
        self.tick_at = Some(now + self.tick_interval);
        self.frame_at = Some(now);
    }

    pub fn cancel(&mut self) {
        self.tick_at = None;
        self.frame_at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.tick_at.is_some() && self.frame_at.is_some()
    }

    /// Pop the next due callback, ticks first.
    ///
    /// The tick deadline moves by exactly one interval so ticks stay on a
    /// fixed-rate grid. A tick a whole interval or more overdue (process
    /// stopped, machine suspended) is delivered once and the grid restarts
    /// from `now`. A late frame is rescheduled from `now`; missed frames are
    /// dropped, not replayed.
    pub fn take_due(&mut self, now: Duration) -> Option<Due> {
        if let Some(at) = self.tick_at {
            if at <= now {
                let next = at + self.tick_interval;
                self.tick_at = Some(if next <= now {
                    now + self.tick_interval
                } else {
                    next
                });
                return Some(Due::Tick);
            }
        }
        if let Some(at) = self.frame_at {
            if at <= now {
                self.frame_at = Some(now + self.frame_interval);
                return Some(Due::Frame);
            }
        }
        None
    }

    /// Time left until the earliest deadline, if anything is armed.
    pub fn time_until_next(&self, now: Duration) -> Option<Duration> {
        [self.tick_at, self.frame_at]
            .into_iter()
            .flatten()
            .min()
            .map(|at| at.saturating_sub(now))
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new(TICK_INTERVAL, FRAME_INTERVAL)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: BreathEventSource> {
    event_source: E,
    idle_poll: Duration,
}

impl<E: BreathEventSource> Runner<E> {
    pub fn new(event_source: E) -> Self {
        Self {
            event_source,
            idle_poll: IDLE_POLL,
        }
    }

    pub fn with_idle_poll(mut self, idle_poll: Duration) -> Self {
        self.idle_poll = idle_poll;
        self
    }

    /// Returns whatever is due at `now`, otherwise blocks for input up to the
    /// next deadline. Returns `Idle` when the wait expires and `Closed` once
    /// the event source is gone.
    pub fn step(&self, schedule: &mut Schedule, now: Duration) -> BreathEvent {
        match schedule.take_due(now) {
            Some(Due::Tick) => return BreathEvent::Tick,
            Some(Due::Frame) => return BreathEvent::Frame,
            None => {}
        }

        let timeout = schedule.time_until_next(now).unwrap_or(self.idle_poll);
        match self.event_source.recv_timeout(timeout) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => BreathEvent::Idle,
            Err(RecvTimeoutError::Disconnected) => BreathEvent::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::mpsc;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn unarmed_schedule_has_nothing_due() {
        let mut schedule = Schedule::default();
        assert!(!schedule.is_armed());
        assert_eq!(schedule.take_due(secs(100)), None);
        assert_eq!(schedule.time_until_next(secs(100)), None);
    }

    #[test]
    fn armed_schedule_draws_first_frame_immediately() {
        let mut schedule = Schedule::default();
        schedule.arm(secs(10));
        assert_eq!(schedule.take_due(secs(10)), Some(Due::Frame));
        assert_eq!(schedule.take_due(secs(10)), None);
        assert_eq!(
            schedule.time_until_next(secs(10)),
            Some(FRAME_INTERVAL)
        );
    }

    #[test]
    fn tick_fires_one_interval_after_arming() {
        let mut schedule = Schedule::default();
        schedule.arm(Duration::ZERO);
        schedule.take_due(Duration::ZERO);

        let just_before = TICK_INTERVAL - Duration::from_millis(1);
        assert_ne!(schedule.take_due(just_before), Some(Due::Tick));
        assert_eq!(schedule.take_due(TICK_INTERVAL), Some(Due::Tick));
    }

    #[test]
    fn tick_takes_priority_over_frame() {
        let mut schedule = Schedule::default();
        schedule.arm(Duration::ZERO);
        assert_eq!(schedule.take_due(secs(1)), Some(Due::Tick));
        assert_eq!(schedule.take_due(secs(1)), Some(Due::Frame));
    }

    #[test]
    fn slightly_late_ticks_stay_on_the_grid() {
        let mut schedule = Schedule::default();
        schedule.arm(Duration::ZERO);
        schedule.take_due(Duration::ZERO);

        assert_eq!(schedule.take_due(Duration::from_millis(1400)), Some(Due::Tick));
        assert_ne!(schedule.take_due(Duration::from_millis(1999)), Some(Due::Tick));
        assert_eq!(schedule.take_due(secs(2)), Some(Due::Tick));
    }

    #[test]
    fn long_stall_delivers_a_single_tick_and_rebases() {
        let mut schedule = Schedule::default();
        schedule.arm(Duration::ZERO);
        let stalled = Duration::from_millis(3500);
        let ticks = (0..10)
            .filter_map(|_| schedule.take_due(stalled))
            .filter(|d| *d == Due::Tick)
            .count();
        assert_eq!(ticks, 1);

        assert_ne!(schedule.take_due(secs(4)), Some(Due::Tick));
        assert_eq!(schedule.take_due(Duration::from_millis(4500)), Some(Due::Tick));
    }

    #[test]
    fn cancel_stops_both_handles() {
        let mut schedule = Schedule::default();
        schedule.arm(Duration::ZERO);
        schedule.cancel();
        assert!(!schedule.is_armed());
        assert_eq!(schedule.take_due(secs(5)), None);
    }

    #[test]
    fn step_returns_idle_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let runner = Runner::new(es).with_idle_poll(Duration::from_millis(1));
        let mut schedule = Schedule::default();

        // With nothing scheduled and no input, step should yield Idle
        assert_matches!(runner.step(&mut schedule, Duration::ZERO), BreathEvent::Idle);
    }

    #[test]
    fn step_reports_a_closed_source() {
        let (tx, rx) = mpsc::channel::<BreathEvent>();
        drop(tx);
        let runner = Runner::new(TestEventSource::new(rx));
        let mut schedule = Schedule::default();

        assert_matches!(runner.step(&mut schedule, Duration::ZERO), BreathEvent::Closed);

        // due callbacks still come first
        schedule.arm(Duration::ZERO);
        assert_matches!(runner.step(&mut schedule, Duration::ZERO), BreathEvent::Frame);
        assert_matches!(runner.step(&mut schedule, Duration::ZERO), BreathEvent::Closed);
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(BreathEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let runner = Runner::new(es).with_idle_poll(Duration::from_millis(10));
        let mut schedule = Schedule::default();

        assert_matches!(runner.step(&mut schedule, Duration::ZERO), BreathEvent::Resize);
    }

    #[test]
    fn step_prefers_due_callbacks_over_input() {
        let (tx, rx) = mpsc::channel();
        tx.send(BreathEvent::Resize).unwrap();
        let runner = Runner::new(TestEventSource::new(rx));
        let mut schedule = Schedule::default();
        schedule.arm(Duration::ZERO);

        assert_matches!(runner.step(&mut schedule, Duration::ZERO), BreathEvent::Frame);
        assert_matches!(runner.step(&mut schedule, secs(1)), BreathEvent::Tick);
    }
}
