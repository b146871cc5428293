pub mod format;
pub mod indicator;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::{
    app::{App, InputMode},
    clock::Clock,
    phase::Phase,
    projector::Projection,
    session::SessionStatus,
    ui::{
        format::{fade, format_time},
        indicator::Indicator,
    },
};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;
const COMPLETE_GREEN: Color = Color::Rgb(0x30, 0xD1, 0x58);

pub fn phase_color(phase: Phase) -> Color {
    fade(phase.rgb(), 1.0)
}

impl<K: Clock> Widget for &App<K> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = self.session();
        let status = session.status();
        let show_settings = session.settings_editable();

        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let accent_style = Style::default()
            .patch(bold_style)
            .fg(phase_color(session.phase));

        let settings_height = match (show_settings, self.notice.is_some()) {
            (false, _) => 0,
            (true, false) => 6,
            (true, true) => 7,
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1),               // hud
                Constraint::Min(4),                  // indicator
                Constraint::Length(3),               // phase label, countdown, toast
                Constraint::Length(1),               // phase tracker
                Constraint::Length(settings_height), // settings panel
                Constraint::Length(1),               // actions
            ])
            .split(area);

        // 1. hud
        let hud = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[0]);
        Paragraph::new(Span::styled("Box Breathing", bold_style))
            .alignment(Alignment::Left)
            .render(hud[0], buf);
        if session.has_started {
            Paragraph::new(Span::styled(
                format_time(session.elapsed_total_secs),
                bold_style,
            ))
            .alignment(Alignment::Right)
            .render(hud[1], buf);
        }

        // 2. indicator
        if let Some(projection) = Projection::current(session, self.timer.clock().now()) {
            Indicator::new(projection).render(chunks[1], buf);
        }

        // 3. focus text
        let focus = match status {
            SessionStatus::Complete => vec![Line::from(Span::styled(
                "Session Complete",
                Style::default().patch(bold_style).fg(COMPLETE_GREEN),
            ))],
            SessionStatus::Running | SessionStatus::Paused => {
                let mut lines = vec![
                    Line::from(Span::styled(session.phase.to_string(), accent_style)),
                    Line::from(Span::styled(
                        session.countdown_remaining.to_string(),
                        bold_style,
                    )),
                ];
                if session.time_limit_reached {
                    lines.push(Line::from(Span::styled(
                        "Finishing cycle...",
                        italic_style,
                    )));
                }
                lines
            }
            SessionStatus::Idle => vec![Line::from(Span::styled("Ready", dim_style))],
        };
        Paragraph::new(focus)
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        // 4. phase tracker
        if session.has_started && status != SessionStatus::Complete {
            let spans: Vec<Span> = Phase::ALL
                .iter()
                .enumerate()
                .flat_map(|(i, phase)| {
                    let style = if *phase == session.phase {
                        accent_style
                    } else {
                        dim_style
                    };
                    let gap = if i == 0 { "" } else { "   " };
                    [Span::raw(gap), Span::styled(phase.to_string(), style)]
                })
                .collect();
            Paragraph::new(Line::from(spans))
                .alignment(Alignment::Center)
                .render(chunks[3], buf);
        }

        // 5. settings
        if show_settings {
            self.render_settings(chunks[4], buf);
        }

        // 6. actions
        let mut keys = vec![("space", self.primary_action())];
        if status != SessionStatus::Idle {
            keys.push(("r", "reset"));
        }
        keys.push(("q", "quit"));
        let legend = keys
            .iter()
            .map(|(key, action)| format!("({key}) {action}"))
            .join("   ");
        Paragraph::new(Span::styled(legend, italic_style))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
    }
}

impl<K: Clock> App<K> {
    fn render_settings(&self, area: Rect, buf: &mut Buffer) {
        let session = self.session();
        let label_style = Style::default().fg(Color::Gray);
        let value_style = Style::default().add_modifier(Modifier::BOLD);

        let limit_value = match &self.input_mode {
            InputMode::EditingLimit(text) => format!("{text}_"),
            InputMode::Normal => session
                .time_limit_minutes
                .map_or_else(|| "none".to_string(), |m| format!("{m} min")),
        };

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Sound         ", label_style),
                Span::styled(
                    if session.sound_enabled { "ON" } else { "OFF" },
                    value_style,
                ),
                Span::styled("   (s)", label_style),
            ]),
            Line::from(vec![
                Span::styled("Breath Speed  ", label_style),
                Span::styled(
                    self.timer.requested_phase_duration().to_string(),
                    value_style,
                ),
                Span::styled("   (up/down)", label_style),
            ]),
            Line::from(vec![
                Span::styled("Limit         ", label_style),
                Span::styled(limit_value, value_style),
                Span::styled(
                    if matches!(self.input_mode, InputMode::EditingLimit(_)) {
                        "   (enter) save (esc) cancel"
                    } else {
                        "   (l)"
                    },
                    label_style,
                ),
            ]),
            Line::from(vec![
                Span::styled("Presets       ", label_style),
                Span::styled("(2) 2 min  (5) 5 min  (0) 10 min", value_style),
            ]),
        ];

        if let Some(notice) = &self.notice {
            lines.push(Line::from(Span::styled(
                notice.as_str(),
                Style::default().fg(Color::Red),
            )));
        }

        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Settings"))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::settings::PhaseDuration;
    use crate::timer::PhaseTimer;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::time::Duration;

    fn create_test_app() -> (App<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let timer = PhaseTimer::new(PhaseDuration::default(), clock.clone());
        (App::new(timer), clock)
    }

    fn render(app: &App<ManualClock>, area: Rect) -> String {
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    fn tick(app: &mut App<ManualClock>, clock: &ManualClock, n: u32) {
        for _ in 0..n {
            clock.advance(Duration::from_secs(1));
            app.timer.tick();
        }
    }

    fn press(app: &mut App<ManualClock>, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    const AREA: Rect = Rect {
        x: 0,
        y: 0,
        width: 80,
        height: 30,
    };

    #[test]
    fn test_idle_screen() {
        let (app, _) = create_test_app();
        let rendered = render(&app, AREA);
        assert!(rendered.contains("Box Breathing"));
        assert!(rendered.contains("Ready"));
        assert!(rendered.contains("(space) Start Session"));
        assert!(rendered.contains("Settings"));
        assert!(rendered.contains("4s"));
        assert!(!rendered.contains("00:00"));
        assert!(!rendered.contains("(r) reset"));
    }

    #[test]
    fn test_running_screen() {
        let (mut app, clock) = create_test_app();
        app.timer.start();
        tick(&mut app, &clock, 5);
        clock.advance(Duration::from_millis(400));

        let rendered = render(&app, AREA);
        assert!(rendered.contains("00:05"));
        assert!(rendered.contains("Hold"));
        assert!(rendered.contains("Exhale"));
        assert!(rendered.contains("(space) Pause"));
        // settings are hidden while breathing
        assert!(!rendered.contains("Settings"));
    }

    #[test]
    fn test_paused_screen_shows_settings() {
        let (mut app, clock) = create_test_app();
        app.timer.start();
        tick(&mut app, &clock, 2);
        app.timer.pause();

        let rendered = render(&app, AREA);
        assert!(rendered.contains("(space) Resume"));
        assert!(rendered.contains("Settings"));
        assert!(rendered.contains("00:02"));
    }

    #[test]
    fn test_finishing_cycle_toast() {
        let (mut app, clock) = create_test_app();
        app.timer.set_time_limit(Some(1));
        app.timer.start();
        tick(&mut app, &clock, 40);
        assert!(!render(&app, AREA).contains("Finishing cycle..."));

        // 5s phases keep running past the limit
        let (mut app, clock) = create_test_app();
        app.timer.set_phase_duration(PhaseDuration::new(5).unwrap());
        app.timer.set_time_limit(Some(1));
        app.timer.start();
        tick(&mut app, &clock, 61);
        assert!(render(&app, AREA).contains("Finishing cycle..."));
    }

    #[test]
    fn test_complete_screen() {
        let (mut app, clock) = create_test_app();
        app.timer.start_preset(2);
        tick(&mut app, &clock, 200);

        let rendered = render(&app, AREA);
        assert!(rendered.contains("Session Complete"));
        assert!(rendered.contains("(space) Start Over"));
        assert!(!rendered.contains("Settings"));
        assert!(!rendered.contains("Inhale"));
    }

    #[test]
    fn test_limit_editing_and_notice() {
        let (mut app, _) = create_test_app();
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Char('2'));
        let rendered = render(&app, AREA);
        assert!(rendered.contains("12_"));
        assert!(rendered.contains("(enter) save"));

        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Enter);
        let rendered = render(&app, AREA);
        assert!(rendered.contains("whole number"));
        assert!(rendered.contains("none"));
    }

    #[test]
    fn test_sound_toggle_shown() {
        let (mut app, _) = create_test_app();
        assert!(render(&app, AREA).contains("OFF"));
        press(&mut app, KeyCode::Char('s'));
        assert!(render(&app, AREA).contains("ON"));
    }

    #[test]
    fn test_extreme_sizes() {
        let (mut app, clock) = create_test_app();
        app.timer.start();
        tick(&mut app, &clock, 3);

        for area in [
            Rect::new(0, 0, 10, 5),
            Rect::new(0, 0, 1, 1),
            Rect::new(0, 0, 300, 100),
        ] {
            let mut buffer = Buffer::empty(area);
            (&app).render(area, &mut buffer);
            assert!(*buffer.area() == area);
        }
    }

    #[test]
    fn test_ui_constants() {
        assert_eq!(HORIZONTAL_MARGIN, 2);
        assert_eq!(VERTICAL_MARGIN, 1);
    }
}
