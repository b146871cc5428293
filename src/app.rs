use std::cell::Cell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::clock::{Clock, MonotonicClock};
use crate::session::{Session, SessionStatus};
use crate::settings::parse_time_limit;
use crate::timer::{PhaseTimer, SessionEvent, SessionObserver};

const MAX_LIMIT_INPUT: usize = 6;

/// Set whenever the session changes; the event loop redraws and clears it.
#[derive(Clone, Debug, Default)]
pub struct RedrawSignal(Rc<Cell<bool>>);

impl RedrawSignal {
    pub fn raise(&self) {
        self.0.set(true);
    }

    /// Returns whether a redraw was requested and clears the request.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }
}

impl SessionObserver for RedrawSignal {
    fn notify(&mut self, _session: &Session, _event: SessionEvent) {
        self.raise();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing a time limit; holds the text entered so far.
    EditingLimit(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct App<K: Clock = MonotonicClock> {
    pub timer: PhaseTimer<K>,
    pub input_mode: InputMode,
    /// Validation message from the last rejected input.
    pub notice: Option<String>,
    redraw: RedrawSignal,
}

impl<K: Clock> App<K> {
    pub fn new(mut timer: PhaseTimer<K>) -> Self {
        let redraw = RedrawSignal::default();
        timer.subscribe(Box::new(redraw.clone()));
        Self {
            timer,
            input_mode: InputMode::Normal,
            notice: None,
            redraw,
        }
    }

    pub fn session(&self) -> &Session {
        self.timer.session()
    }

    /// Returns whether anything visible changed since the last call.
    pub fn take_redraw(&self) -> bool {
        self.redraw.take()
    }

    /// Label of the primary action for the current state.
    pub fn primary_action(&self) -> &'static str {
        match self.timer.status() {
            SessionStatus::Idle => "Start Session",
            SessionStatus::Running => "Pause",
            SessionStatus::Paused => "Resume",
            SessionStatus::Complete => "Start Over",
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        // editing changes only the view state, so always redraw
        if let InputMode::EditingLimit(buffer) = &mut self.input_mode {
            match key.code {
                KeyCode::Esc => self.input_mode = InputMode::Normal,
                KeyCode::Enter => {
                    let raw = std::mem::take(buffer);
                    self.input_mode = InputMode::Normal;
                    self.commit_time_limit(&raw);
                }
                KeyCode::Backspace => {
                    buffer.pop();
                }
                KeyCode::Char(c) if buffer.chars().count() < MAX_LIMIT_INPUT => buffer.push(c),
                _ => {}
            }
            self.redraw.raise();
            return Control::Continue;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
            KeyCode::Char(' ') | KeyCode::Enter => self.primary(),
            KeyCode::Char('r') => self.timer.reset(),
            _ if self.session().settings_editable() => self.handle_settings_key(key.code),
            _ => {}
        }

        Control::Continue
    }

    fn primary(&mut self) {
        self.notice = None;
        if self.timer.status() == SessionStatus::Complete {
            self.timer.reset();
        } else {
            self.timer.toggle();
        }
    }

    fn handle_settings_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('s') => self.timer.toggle_sound(),
            KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('=') => {
                let longer = self.timer.requested_phase_duration().longer();
                self.timer.set_phase_duration(longer);
            }
            KeyCode::Down | KeyCode::Char('-') => {
                let shorter = self.timer.requested_phase_duration().shorter();
                self.timer.set_phase_duration(shorter);
            }
            KeyCode::Char('l') => {
                let current = self
                    .session()
                    .time_limit_minutes
                    .map(|m| m.to_string())
                    .unwrap_or_default();
                self.input_mode = InputMode::EditingLimit(current);
                self.notice = None;
                self.redraw.raise();
            }
            KeyCode::Char('2') => self.timer.start_preset(2),
            KeyCode::Char('5') => self.timer.start_preset(5),
            KeyCode::Char('0') => self.timer.start_preset(10),
            _ => {}
        }
    }

    /// Invalid input is rejected here and the previous limit kept.
    fn commit_time_limit(&mut self, raw: &str) {
        match parse_time_limit(raw) {
            Ok(minutes) => {
                self.notice = None;
                self.timer.set_time_limit(minutes);
            }
            Err(err) => {
                tracing::debug!(%err, input = raw, "rejected time limit");
                self.notice = Some(err.to_string());
            }
        }
    }
}
