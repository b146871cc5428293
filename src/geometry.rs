use crate::phase::Phase;

/// Braille canvas resolution per terminal cell. Cells are roughly twice as
/// tall as wide, so one braille dot is close to square.
pub const DOTS_PER_COL: f64 = 2.0;
pub const DOTS_PER_ROW: f64 = 4.0;

/// Side of the indicator square relative to the smaller viewport side.
pub const BOX_SCALE: f64 = 0.55;

/// Box side the drawing constants below were tuned for. Everything is scaled
/// by `size / REFERENCE_BOX_SIZE`.
pub const REFERENCE_BOX_SIZE: f64 = 220.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, to: Point, t: f64) -> Point {
        Point::new(self.x + t * (to.x - self.x), self.y + t * (to.y - self.y))
    }
}

/// Drawing surface size in square dot units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn from_cells(cols: u16, rows: u16) -> Self {
        Self::new(f64::from(cols) * DOTS_PER_COL, f64::from(rows) * DOTS_PER_ROW)
    }
}

/// The square path the indicator travels, centred in the viewport.
/// Coordinates grow rightwards and downwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxGeometry {
    pub left: f64,
    pub top: f64,
    pub size: f64,
}

impl BoxGeometry {
    /// Pure function of the viewport; safe to recompute on every resize.
    pub fn fit(viewport: Viewport) -> Self {
        let size = viewport.width.min(viewport.height).max(0.0) * BOX_SCALE;
        Self {
            left: (viewport.width - size) / 2.0,
            top: (viewport.height - size) / 2.0,
            size,
        }
    }

    /// Corners in phase order: bottom-left, top-left, top-right, bottom-right.
    pub fn corners(&self) -> [Point; 4] {
        let right = self.left + self.size;
        let bottom = self.top + self.size;
        [
            Point::new(self.left, bottom),
            Point::new(self.left, self.top),
            Point::new(right, self.top),
            Point::new(right, bottom),
        ]
    }

    /// Corner the indicator leaves from during `phase`.
    pub fn anchor(&self, phase: Phase) -> Point {
        self.corners()[phase.index()]
    }

    pub fn scale(&self) -> f64 {
        self.size / REFERENCE_BOX_SIZE
    }
}
