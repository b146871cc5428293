/// One segment of a breathing cycle.
///
/// Phases run in the fixed order Inhale -> Hold -> Exhale -> Wait and then wrap
/// back to Inhale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Phase {
    Inhale,
    Hold,
    Exhale,
    Wait,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Inhale, Phase::Hold, Phase::Exhale, Phase::Wait];

    pub fn next(self) -> Self {
        match self {
            Phase::Inhale => Phase::Hold,
            Phase::Hold => Phase::Exhale,
            Phase::Exhale => Phase::Wait,
            Phase::Wait => Phase::Inhale,
        }
    }

    /// Position of the phase in the cycle, also the index of the corner the
    /// indicator leaves from while this phase runs.
    pub fn index(self) -> usize {
        match self {
            Phase::Inhale => 0,
            Phase::Hold => 1,
            Phase::Exhale => 2,
            Phase::Wait => 3,
        }
    }

    /// Accent colour as (r, g, b).
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Phase::Inhale => (0x32, 0xD7, 0x4B),
            Phase::Hold => (0x5E, 0x5C, 0xE6),
            Phase::Exhale => (0x0A, 0x84, 0xFF),
            Phase::Wait => (0xBF, 0x5A, 0xF2),
        }
    }
}
