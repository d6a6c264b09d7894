//! Drawing primitives used by the coupon page layout.
//!
//! The PDF writer only gives us straight lines and text/image placement, so
//! everything curved (the rounded instruction box) is traced here as a polyline
//! on top of the [`Surface`] capability trait. Coordinates are millimetres with
//! the origin in the top-left corner of the page and `y` growing downwards.

use super::error::GenerateError;
use std::f64::consts::PI;
use std::path::Path;

/// Number of straight segments used to approximate one arc.
pub const ARC_STEPS: u32 = 20;

/// An RGB stroke colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const LIGHT_GRAY: Rgb = Rgb(200, 200, 200);
}

/// Font selection for a text cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Font {
    pub size: u8,
    pub bold: bool,
}

impl Font {
    pub fn regular(size: u8) -> Self {
        Font { size, bold: false }
    }

    pub fn bold(size: u8) -> Self {
        Font { size, bold: true }
    }
}

/// The drawing capability a page is rendered onto.
///
/// Implemented by the `genpdf` adapter for real documents and by a recording
/// surface in tests. `line_to` strokes from the current cursor, which is set by
/// `move_to` and by every `line_to`.
pub trait Surface {
    fn set_draw_color(&mut self, color: Rgb);

    fn move_to(&mut self, x: f64, y: f64);

    fn line_to(&mut self, x: f64, y: f64);

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);

    /// Strokes the outline of an axis-aligned rectangle.
    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64);

    /// Places the image stored at `path` so that it covers exactly `w` x `h`.
    fn image(&mut self, path: &Path, x: f64, y: f64, w: f64, h: f64)
        -> Result<(), GenerateError>;

    /// Prints a single line of text centred in the cell `(x, y, w, h)`.
    /// A negative `h` puts the cell above `y`.
    fn text_cell(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        text: &str,
        font: Font,
    ) -> Result<(), GenerateError>;
}

/// Point on the circle of radius `r` around `(cx, cy)` at `degrees`.
pub fn arc_point(cx: f64, cy: f64, r: f64, degrees: f64) -> (f64, f64) {
    let theta = degrees * (PI / 180.0);
    (cx + r * theta.cos(), cy + r * theta.sin())
}

/// Traces a circular arc as a polyline of [`ARC_STEPS`] equal angular steps.
///
/// The first point is a cursor move, every following point is a line from the
/// previous one. Both the start and the end angle are always sampled.
pub fn arc<S: Surface + ?Sized>(
    surface: &mut S,
    cx: f64,
    cy: f64,
    start_deg: f64,
    end_deg: f64,
    r: f64,
) {
    let step = (end_deg - start_deg) / f64::from(ARC_STEPS);
    for i in 0..=ARC_STEPS {
        let (x, y) = arc_point(cx, cy, r, start_deg + step * f64::from(i));
        if i == 0 {
            surface.move_to(x, y);
        } else {
            surface.line_to(x, y);
        }
    }
}

/// Strokes a rectangle whose corners are quarter-circle polylines of radius `r`.
///
/// `r` is clamped to half the width and half the height. Corners are drawn
/// top-left, top-right, bottom-right, bottom-left, then the four straight
/// edges join their tangent points.
pub fn rounded_rect<S: Surface + ?Sized>(surface: &mut S, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0);

    arc(surface, x + r, y + r, 180.0, 270.0, r);
    arc(surface, x + w - r, y + r, 270.0, 360.0, r);
    arc(surface, x + w - r, y + h - r, 0.0, 90.0, r);
    arc(surface, x + r, y + h - r, 90.0, 180.0, r);

    surface.line(x + r, y, x + w - r, y);
    surface.line(x + w, y + r, x + w, y + h - r);
    surface.line(x + r, y + h, x + w - r, y + h);
    surface.line(x, y + r, x, y + h - r);
}
