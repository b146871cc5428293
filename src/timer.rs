use crate::clock::{Clock, MonotonicClock};
use crate::phase::Phase;
use crate::runtime::Schedule;
use crate::session::{Session, SessionStatus};
use crate::settings::PhaseDuration;

/// Notification emitted after the timer mutates the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Started,
    Resumed,
    Paused,
    Reset,
    Ticked { elapsed_total_secs: u64 },
    PhaseChanged { from: Phase, to: Phase },
    LimitReached,
    Completed,
    SettingsChanged,
}

impl SessionEvent {
    /// Events that are announced with a phase cue.
    pub fn wants_cue(&self) -> bool {
        matches!(
            self,
            SessionEvent::Started | SessionEvent::Resumed | SessionEvent::PhaseChanged { .. }
        )
    }
}

/// Subscriber to session changes. Views redraw, cues sound, loggers log.
pub trait SessionObserver {
    fn notify(&mut self, session: &Session, event: SessionEvent);
}

/// Logs every transition through `tracing`
#[derive(Debug, Default)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn notify(&mut self, session: &Session, event: SessionEvent) {
        match event {
            SessionEvent::Ticked { .. } => {}
            SessionEvent::PhaseChanged { from, to } => tracing::debug!(
                %from,
                %to,
                elapsed = session.elapsed_total_secs,
                "phase changed"
            ),
            SessionEvent::SettingsChanged => tracing::debug!(
                phase_secs = session.phase_duration.secs(),
                limit_minutes = ?session.time_limit_minutes,
                sound = session.sound_enabled,
                "settings changed"
            ),
            other => tracing::info!(
                event = ?other,
                elapsed = session.elapsed_total_secs,
                phase = %session.phase,
                "session"
            ),
        }
    }
}

/// Discrete one-second state machine driving a breathing session.
///
/// Owns the session record and the paired tick/frame schedule. Every start
/// arms both handles and every pause, reset or completion cancels both.
pub struct PhaseTimer<K: Clock = MonotonicClock> {
    session: Session,
    /// Phase duration applied at the next start from idle.
    requested_phase_duration: PhaseDuration,
    schedule: Schedule,
    clock: K,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl<K: Clock> PhaseTimer<K> {
    pub fn new(phase_duration: PhaseDuration, clock: K) -> Self {
        Self {
            session: Session::new(phase_duration),
            requested_phase_duration: phase_duration,
            schedule: Schedule::default(),
            clock,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    pub fn schedule_mut(&mut self) -> &mut Schedule {
        &mut self.schedule
    }

    pub fn requested_phase_duration(&self) -> PhaseDuration {
        self.requested_phase_duration
    }

    fn emit(&mut self, event: SessionEvent) {
        for observer in self.observers.iter_mut() {
            observer.notify(&self.session, event);
        }
    }

    /// Idle: begin a fresh session. Paused: resume where it stopped.
    /// Running or complete: no-op.
    pub fn start(&mut self) {
        let event = match self.session.status() {
            SessionStatus::Idle => {
                let duration = self.requested_phase_duration;
                let session = &mut self.session;
                session.has_started = true;
                session.elapsed_total_secs = 0;
                session.phase = Phase::Inhale;
                session.phase_duration = duration;
                session.countdown_remaining = duration.secs();
                session.time_limit_reached = false;
                session.session_complete = false;
                SessionEvent::Started
            }
            SessionStatus::Paused => SessionEvent::Resumed,
            SessionStatus::Running | SessionStatus::Complete => return,
        };

        let now = self.clock.now();
        self.session.is_playing = true;
        self.session.reference_at = now;
        self.schedule.arm(now);
        self.emit(event);
    }

    /// Running -> Paused. The countdown keeps its last whole-second value.
    pub fn pause(&mut self) {
        if self.session.status() != SessionStatus::Running {
            return;
        }
        self.session.is_playing = false;
        self.schedule.cancel();
        self.emit(SessionEvent::Paused);
    }

    pub fn toggle(&mut self) {
        match self.session.status() {
            SessionStatus::Running => self.pause(),
            _ => self.start(),
        }
    }

    /// Back to idle from any state.
    pub fn reset(&mut self) {
        self.schedule.cancel();
        let duration = self.requested_phase_duration;
        let session = &mut self.session;
        session.is_playing = false;
        session.has_started = false;
        session.elapsed_total_secs = 0;
        session.phase = Phase::Inhale;
        session.phase_duration = duration;
        session.countdown_remaining = duration.secs();
        session.session_complete = false;
        session.time_limit_reached = false;
        self.emit(SessionEvent::Reset);
    }

    /// Advance one second. Ignored unless running.
    pub fn tick(&mut self) {
        if self.session.status() != SessionStatus::Running {
            return;
        }

        let now = self.clock.now();
        self.session.elapsed_total_secs += 1;
        self.session.reference_at = now;
        let elapsed = self.session.elapsed_total_secs;

        // Latched: never re-evaluated once set.
        if !self.session.time_limit_reached {
            if let Some(limit) = self.session.time_limit_secs() {
                if elapsed >= limit {
                    self.session.time_limit_reached = true;
                    self.emit(SessionEvent::LimitReached);
                }
            }
        }

        if self.session.countdown_remaining <= 1 {
            let from = self.session.phase;
            let to = from.next();
            self.session.phase = to;
            self.session.countdown_remaining = self.session.phase_duration.secs();
            self.emit(SessionEvent::PhaseChanged { from, to });

            if to == Phase::Wait && self.session.time_limit_reached {
                self.session.session_complete = true;
                self.session.is_playing = false;
                self.schedule.cancel();
                self.emit(SessionEvent::Completed);
            }
        } else {
            self.session.countdown_remaining -= 1;
        }

        self.emit(SessionEvent::Ticked {
            elapsed_total_secs: elapsed,
        });
    }

    /// Reset, apply a limit and start straight away.
    pub fn start_preset(&mut self, minutes: u32) {
        self.session.time_limit_minutes = Some(minutes);
        self.reset();
        self.start();
    }

    /// Applies immediately while idle. While paused the in-progress countdown
    /// is left alone and the new length waits for the next fresh start.
    pub fn set_phase_duration(&mut self, duration: PhaseDuration) {
        if !self.session.settings_editable() || duration == self.requested_phase_duration {
            return;
        }
        self.requested_phase_duration = duration;
        if self.session.status() == SessionStatus::Idle {
            self.session.phase_duration = duration;
            self.session.countdown_remaining = duration.secs();
        }
        self.emit(SessionEvent::SettingsChanged);
    }

    pub fn set_time_limit(&mut self, minutes: Option<u32>) {
        self.session.time_limit_minutes = minutes;
        self.emit(SessionEvent::SettingsChanged);
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.session.sound_enabled = enabled;
        self.emit(SessionEvent::SettingsChanged);
    }

    pub fn toggle_sound(&mut self) {
        self.set_sound_enabled(!self.session.sound_enabled);
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.session.reduced_motion = reduced;
        self.emit(SessionEvent::SettingsChanged);
    }
}
