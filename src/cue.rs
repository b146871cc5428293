use std::io::{self, Write};

use crate::session::Session;
use crate::timer::{SessionEvent, SessionObserver};

/// Short audible signal at a phase boundary.
///
/// Fire-and-forget: implementations swallow their own failures.
pub trait PhaseCue {
    fn emit_phase_cue(&mut self);
}

/// Rings the terminal bell on stdout.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl TerminalBell {
    fn ring(out: &mut impl Write) -> io::Result<()> {
        out.write_all(b"\x07")?;
        out.flush()
    }
}

impl PhaseCue for TerminalBell {
    fn emit_phase_cue(&mut self) {
        if let Err(err) = Self::ring(&mut io::stdout()) {
            tracing::debug!(%err, "phase cue failed");
        }
    }
}

/// Plays the cue for session events that want one, if sound is on.
pub struct CueObserver<P: PhaseCue> {
    cue: P,
}

impl<P: PhaseCue> CueObserver<P> {
    pub fn new(cue: P) -> Self {
        Self { cue }
    }
}

impl<P: PhaseCue> SessionObserver for CueObserver<P> {
    fn notify(&mut self, session: &Session, event: SessionEvent) {
        if session.sound_enabled && event.wants_cue() {
            self.cue.emit_phase_cue();
        }
    }
}
