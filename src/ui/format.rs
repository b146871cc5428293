use ratatui::style::Color;

/// Elapsed seconds as `MM:SS`. Minutes keep counting past 99.
pub fn format_time(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// `rgb` blended over black at `alpha`.
pub fn fade((r, g, b): (u8, u8, u8), alpha: f64) -> Color {
    let a = alpha.clamp(0.0, 1.0);
    let scale = |c: u8| (f64::from(c) * a).round() as u8;
    Color::Rgb(scale(r), scale(g), scale(b))
}
