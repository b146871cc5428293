use std::f64::consts::PI;
use std::time::Duration;

use crate::geometry::{BoxGeometry, Point};
use crate::phase::Phase;
use crate::session::{Session, SessionStatus};

// Sizes at REFERENCE_BOX_SIZE, see `BoxGeometry::scale`.
pub const GLOW_BASE_RADIUS: f64 = 100.0;
pub const GLOW_MAX_EXTRA: f64 = 60.0;
pub const DOT_RADIUS: f64 = 12.0;
pub const TRAIL_LENGTH: usize = 20;
const TRAIL_RADIUS: f64 = 15.0;
const TRAIL_RADIUS_STEP: f64 = 0.5;
const TRAIL_ALPHA: f64 = 0.1;
const TRAIL_ALPHA_STEP: f64 = 0.005;

/// Symmetric ease-in-out, 0 -> 0 and 1 -> 1.
pub fn ease(progress: f64) -> f64 {
    0.5 - (PI * progress.clamp(0.0, 1.0)).cos() / 2.0
}

/// Linear progress through the current phase at `now`, in [0, 1].
pub fn live_progress(session: &Session, now: Duration) -> f64 {
    let duration = f64::from(session.phase_duration.secs());
    let elapsed_in_phase = now.saturating_sub(session.reference_at).as_secs_f64();
    let effective_countdown = f64::from(session.countdown_remaining) - elapsed_in_phase;
    ((duration - effective_countdown) / duration).clamp(0.0, 1.0)
}

/// Progress implied by the countdown alone, used when nothing is moving.
pub fn frozen_progress(session: &Session) -> f64 {
    let duration = f64::from(session.phase_duration.secs());
    ((duration - f64::from(session.countdown_remaining)) / duration).clamp(0.0, 1.0)
}

/// Expansion of the breath: fills on Inhale, held on Hold, empties on
/// Exhale, empty on Wait.
pub fn breath_factor(phase: Phase, eased: f64) -> f64 {
    match phase {
        Phase::Inhale => eased,
        Phase::Hold => 1.0,
        Phase::Exhale => 1.0 - eased,
        Phase::Wait => 0.0,
    }
}

/// One point of the fading trail behind the indicator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
    pub at: Point,
    pub radius: f64,
    pub alpha: f64,
}

/// Everything needed to draw one frame of the indicator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub phase: Phase,
    pub progress: f64,
    pub eased: f64,
    pub breath: f64,
    /// False for static frames and under reduced motion.
    pub show_trail: bool,
}

impl Projection {
    fn new(phase: Phase, progress: f64, show_trail: bool) -> Self {
        let eased = ease(progress);
        Self {
            phase,
            progress,
            eased,
            breath: breath_factor(phase, eased),
            show_trail,
        }
    }

    /// Interpolated frame for a running session.
    pub fn live(session: &Session, now: Duration) -> Self {
        Self::new(
            session.phase,
            live_progress(session, now),
            !session.reduced_motion,
        )
    }

    /// Static frame for a stopped session. A finished session rests at the
    /// end of its last phase.
    pub fn frozen(session: &Session) -> Self {
        let progress = if session.session_complete {
            1.0
        } else {
            frozen_progress(session)
        };
        Self::new(session.phase, progress, false)
    }

    /// The frame to show right now, or nothing before the first start.
    pub fn current(session: &Session, now: Duration) -> Option<Self> {
        match session.status() {
            SessionStatus::Idle => None,
            SessionStatus::Running => Some(Self::live(session, now)),
            SessionStatus::Paused | SessionStatus::Complete => Some(Self::frozen(session)),
        }
    }

    pub fn position(&self, geom: &BoxGeometry) -> Point {
        geom.anchor(self.phase)
            .lerp(geom.anchor(self.phase.next()), self.eased)
    }

    pub fn glow_radius(&self, geom: &BoxGeometry) -> f64 {
        (GLOW_BASE_RADIUS + self.breath * GLOW_MAX_EXTRA) * geom.scale()
    }

    pub fn dot_radius(&self, geom: &BoxGeometry) -> f64 {
        DOT_RADIUS * geom.scale()
    }

    /// Trail points, nearest first. Empty when the trail is suppressed.
    pub fn trail(&self, geom: &BoxGeometry) -> Vec<TrailPoint> {
        if !self.show_trail {
            return Vec::new();
        }

        let from = geom.anchor(self.phase);
        let to = geom.anchor(self.phase.next());
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let head = self.position(geom);
        let scale = geom.scale();

        (0..TRAIL_LENGTH)
            .map(|i| {
                let step = i as f64;
                TrailPoint {
                    at: Point::new(head.x - dx * step / 100.0, head.y - dy * step / 100.0),
                    radius: (TRAIL_RADIUS - step * TRAIL_RADIUS_STEP) * scale,
                    alpha: TRAIL_ALPHA - step * TRAIL_ALPHA_STEP,
                }
            })
            .collect()
    }
}

/// Glow opacity at `t` = distance / glow radius: 0.8 at the centre, 0.3 at
/// a fifth of the way out, transparent at the edge.
pub fn glow_alpha(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t <= 0.2 {
        0.8 - (0.5 * t / 0.2)
    } else {
        0.3 * (1.0 - (t - 0.2) / 0.8)
    }
}

/// Frames of a running session sampled at `times`.
///
/// Each frame depends only on the session and its timestamp, so the sequence
/// can be restarted at any point. It yields nothing once the session stops.
pub fn frames<'a, I>(session: &'a Session, times: I) -> impl Iterator<Item = Projection> + 'a
where
    I: IntoIterator<Item = Duration>,
    I::IntoIter: 'a,
{
    times
        .into_iter()
        .take_while(move |_| session.is_playing)
        .map(move |now| Projection::live(session, now))
}
