use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle, Context, Points, Rectangle},
        Widget,
    },
};

use crate::geometry::{BoxGeometry, Point, Viewport};
use crate::projector::{glow_alpha, Projection};
use crate::ui::format::fade;

const TRACK_ALPHA: f64 = 0.15;
const GLOW_RINGS: usize = 6;
// Cells overwrite rather than blend, so the faint trail needs a boost.
const TRAIL_BOOST: f64 = 4.0;

/// Canvas drawing of one indicator frame.
pub struct Indicator {
    pub projection: Projection,
}

impl Indicator {
    pub fn new(projection: Projection) -> Self {
        Self { projection }
    }
}

impl Widget for Indicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let viewport = Viewport::from_cells(area.width, area.height);
        let geom = BoxGeometry::fit(viewport);
        let projection = self.projection;
        let accent = projection.phase.rgb();
        // Canvas y grows upwards; geometry grows downwards.
        let flip = move |p: Point| (p.x, viewport.height - p.y);

        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, viewport.width])
            .y_bounds([0.0, viewport.height])
            .paint(move |ctx| {
                draw_track(ctx, &geom, accent, viewport.height);

                for point in projection.trail(&geom) {
                    let (x, y) = flip(point.at);
                    ctx.draw(&Circle {
                        x,
                        y,
                        radius: point.radius,
                        color: fade(accent, point.alpha * TRAIL_BOOST),
                    });
                }
                ctx.layer();

                let (x, y) = flip(projection.position(&geom));
                let glow = projection.glow_radius(&geom);
                for ring in (1..=GLOW_RINGS).rev() {
                    let t = ring as f64 / GLOW_RINGS as f64;
                    ctx.draw(&Circle {
                        x,
                        y,
                        radius: glow * t,
                        color: fade(accent, glow_alpha(t)),
                    });
                }
                ctx.layer();

                draw_dot(ctx, x, y, projection.dot_radius(&geom));
            })
            .render(area, buf);
    }
}

fn draw_track(ctx: &mut Context, geom: &BoxGeometry, accent: (u8, u8, u8), height: f64) {
    ctx.draw(&Rectangle {
        x: geom.left,
        y: height - (geom.top + geom.size),
        width: geom.size,
        height: geom.size,
        color: fade(accent, TRACK_ALPHA),
    });
}

/// Filled disc: concentric circles half a dot apart around a centre point.
fn draw_dot(ctx: &mut Context, x: f64, y: f64, radius: f64) {
    ctx.draw(&Points {
        coords: &[(x, y)],
        color: Color::White,
    });
    let mut r = 0.5;
    while r <= radius {
        ctx.draw(&Circle {
            x,
            y,
            radius: r,
            color: Color::White,
        });
        r += 0.5;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Phase;
    use crate::projector::breath_factor;

    fn projection(phase: Phase, eased: f64) -> Projection {
        Projection {
            phase,
            progress: eased,
            eased,
            breath: breath_factor(phase, eased),
            show_trail: true,
        }
    }

    fn painted(buf: &Buffer) -> usize {
        buf.content()
            .iter()
            .filter(|c| c.symbol() != " " && c.symbol() != "\u{2800}")
            .count()
    }

    #[test]
    fn renders_something_into_the_area() {
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        Indicator::new(projection(Phase::Inhale, 0.3)).render(area, &mut buf);
        assert!(painted(&buf) > 0);
    }

    #[test]
    fn handles_degenerate_areas() {
        for area in [Rect::new(0, 0, 0, 0), Rect::new(0, 0, 1, 1), Rect::new(0, 0, 300, 2)] {
            let mut buf = Buffer::empty(area);
            Indicator::new(projection(Phase::Wait, 1.0)).render(area, &mut buf);
            assert_eq!(*buf.area(), area);
        }
    }

    #[test]
    fn dot_is_white() {
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        Indicator::new(projection(Phase::Hold, 0.0)).render(area, &mut buf);
        assert!(buf.content().iter().any(|c| c.fg == Color::White));
    }
}
