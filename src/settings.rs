use std::fmt;

use thiserror::Error;

pub const MIN_PHASE_SECS: u32 = 3;
pub const MAX_PHASE_SECS: u32 = 8;
pub const DEFAULT_PHASE_SECS: u32 = 4;

/// Largest accepted time limit, one day.
pub const MAX_LIMIT_MINUTES: u32 = 24 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("phase duration must be between 3 and 8 seconds, got {0}")]
    PhaseDurationOutOfRange(u32),
    #[error("phase duration must be a whole number of seconds, got {0:?}")]
    PhaseDurationNotANumber(String),
    #[error("time limit must be a whole number of minutes, got {0:?}")]
    TimeLimitNotANumber(String),
    #[error("time limit must be at most 1440 minutes, got {0}")]
    TimeLimitTooLarge(u32),
}

/// Length of every phase in whole seconds, always within 3..=8.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PhaseDuration(u32);

impl PhaseDuration {
    pub fn new(secs: u32) -> Result<Self, SettingsError> {
        if (MIN_PHASE_SECS..=MAX_PHASE_SECS).contains(&secs) {
            Ok(Self(secs))
        } else {
            Err(SettingsError::PhaseDurationOutOfRange(secs))
        }
    }

    /// Clamp any value into range. Used by the step controls.
    pub fn clamped(secs: u32) -> Self {
        Self(secs.clamp(MIN_PHASE_SECS, MAX_PHASE_SECS))
    }

    pub fn secs(self) -> u32 {
        self.0
    }

    pub fn longer(self) -> Self {
        Self::clamped(self.0.saturating_add(1))
    }

    pub fn shorter(self) -> Self {
        Self::clamped(self.0.saturating_sub(1))
    }
}

impl Default for PhaseDuration {
    fn default() -> Self {
        Self(DEFAULT_PHASE_SECS)
    }
}

impl TryFrom<u32> for PhaseDuration {
    type Error = SettingsError;

    fn try_from(secs: u32) -> Result<Self, Self::Error> {
        Self::new(secs)
    }
}

impl fmt::Display for PhaseDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Parse a phase duration from the command line.
pub fn parse_phase_duration(raw: &str) -> Result<PhaseDuration, SettingsError> {
    let trimmed = raw.trim();
    let secs = trimmed
        .parse::<u32>()
        .map_err(|_| SettingsError::PhaseDurationNotANumber(trimmed.to_string()))?;
    PhaseDuration::new(secs)
}

/// Parse free-form time limit input.
///
/// Empty input and `0` both mean "no limit".
pub fn parse_time_limit(raw: &str) -> Result<Option<u32>, SettingsError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let minutes = trimmed
        .parse::<u32>()
        .map_err(|_| SettingsError::TimeLimitNotANumber(trimmed.to_string()))?;

    match minutes {
        0 => Ok(None),
        m if m > MAX_LIMIT_MINUTES => Err(SettingsError::TimeLimitTooLarge(m)),
        m => Ok(Some(m)),
    }
}
