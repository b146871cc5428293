use std::time::Duration;

use crate::phase::Phase;
use crate::settings::PhaseDuration;

/// Where a session is in its lifecycle. Derived from the session flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Running,
    Paused,
    Complete,
}

/// The shared state of one breathing session.
///
/// The timer is the only writer of `phase`, `countdown_remaining` and the
/// elapsed/limit/complete fields. The projector and the view only read.
#[derive(Debug, Clone)]
pub struct Session {
    pub phase: Phase,
    /// Phase length in force for the current session.
    pub phase_duration: PhaseDuration,
    /// Whole seconds left in the current phase, in `1..=phase_duration`.
    pub countdown_remaining: u32,
    pub elapsed_total_secs: u64,
    pub is_playing: bool,
    pub has_started: bool,
    pub time_limit_minutes: Option<u32>,
    pub time_limit_reached: bool,
    pub session_complete: bool,
    pub sound_enabled: bool,
    pub reduced_motion: bool,
    /// Clock reading at the last tick, start or resume. Interpolation runs
    /// from here.
    pub reference_at: Duration,
}

impl Session {
    pub fn new(phase_duration: PhaseDuration) -> Self {
        Self {
            phase: Phase::Inhale,
            phase_duration,
            countdown_remaining: phase_duration.secs(),
            elapsed_total_secs: 0,
            is_playing: false,
            has_started: false,
            time_limit_minutes: None,
            time_limit_reached: false,
            session_complete: false,
            sound_enabled: false,
            reduced_motion: false,
            reference_at: Duration::ZERO,
        }
    }

    pub fn status(&self) -> SessionStatus {
        if self.session_complete {
            SessionStatus::Complete
        } else if self.is_playing {
            SessionStatus::Running
        } else if self.has_started {
            SessionStatus::Paused
        } else {
            SessionStatus::Idle
        }
    }

    pub fn time_limit_secs(&self) -> Option<u64> {
        self.time_limit_minutes.map(|m| u64::from(m) * 60)
    }

    /// Settings are editable only while the session is stopped and not finished.
    pub fn settings_editable(&self) -> bool {
        matches!(self.status(), SessionStatus::Idle | SessionStatus::Paused)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PhaseDuration::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_idle() {
        let session = Session::default();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.phase, Phase::Inhale);
        assert_eq!(session.countdown_remaining, 4);
        assert_eq!(session.elapsed_total_secs, 0);
        assert!(session.settings_editable());
    }

    #[test]
    fn status_follows_flags() {
        let mut session = Session::default();
        session.has_started = true;
        session.is_playing = true;
        assert_eq!(session.status(), SessionStatus::Running);
        assert!(!session.settings_editable());

        session.is_playing = false;
        assert_eq!(session.status(), SessionStatus::Paused);
        assert!(session.settings_editable());

        session.session_complete = true;
        assert_eq!(session.status(), SessionStatus::Complete);
        assert!(!session.settings_editable());
    }

    #[test]
    fn time_limit_in_seconds() {
        let mut session = Session::default();
        assert_eq!(session.time_limit_secs(), None);
        session.time_limit_minutes = Some(5);
        assert_eq!(session.time_limit_secs(), Some(300));
    }
}
