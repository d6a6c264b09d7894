//! [`Surface`] implementation over a `genpdf` render area.

use super::drawing::{Font, Rgb, Surface};
use super::error::GenerateError;
use genpdf::elements::Image as PdfImage;
use genpdf::render::Area;
use genpdf::style::{Color, Style};
use genpdf::{Context, Element as _, Mm, Position, Scale};
use log::warn;
use std::path::Path;

const MM_PER_INCH: f64 = 25.4;

/// Draws onto one page of a `genpdf` document.
///
/// The area must be the whole page without margins, so surface coordinates
/// are page coordinates. Lines are stroked with the PDF default width; genpdf
/// only carries the colour through to the page.
pub struct PdfSurface<'a, 'p> {
    context: &'a Context,
    area: Area<'p>,
    draw_color: Rgb,
    cursor: (f64, f64),
}

impl<'a, 'p> PdfSurface<'a, 'p> {
    pub fn new(context: &'a Context, area: Area<'p>) -> Self {
        PdfSurface {
            context,
            area,
            draw_color: Rgb::BLACK,
            cursor: (0.0, 0.0),
        }
    }

    fn line_style(&self) -> Style {
        let Rgb(r, g, b) = self.draw_color;
        Style::new().with_color(Color::Rgb(r, g, b))
    }

    fn stroke(&self, points: &[(f64, f64)]) {
        let points: Vec<Position> = points.iter().map(|&(x, y)| Position::new(x, y)).collect();
        self.area.draw_line(points, self.line_style());
    }
}

fn text_style(font: Font) -> Style {
    let mut style = Style::new().with_font_size(font.size);
    if font.bold {
        style.set_bold();
    }
    style
}

impl Surface for PdfSurface<'_, '_> {
    fn set_draw_color(&mut self, color: Rgb) {
        self.draw_color = color;
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.cursor = (x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.stroke(&[self.cursor, (x, y)]);
        self.cursor = (x, y);
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.stroke(&[(x1, y1), (x2, y2)]);
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.stroke(&[(x, y), (x + w, y), (x + w, y + h), (x, y + h), (x, y)]);
    }

    fn image(
        &mut self,
        path: &Path,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    ) -> Result<(), GenerateError> {
        // genpdf sizes images from their pixel count and DPI; pick the DPI that
        // maps the bitmap width to `w` and stretch vertically to `h`.
        let (px_w, px_h) = image::image_dimensions(path)?;
        let dpi = f64::from(px_w) * MM_PER_INCH / w;
        let scale_y = (h / w) * (f64::from(px_w) / f64::from(px_h));

        let mut element = PdfImage::from_path(path)?
            .with_position(Position::new(x, y))
            .with_scale(Scale::new(1.0, scale_y));
        element.set_dpi(dpi);
        element.render(self.context, self.area.clone(), Style::new())?;
        Ok(())
    }

    fn text_cell(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        text: &str,
        font: Font,
    ) -> Result<(), GenerateError> {
        let style = text_style(font);
        let font_cache = &self.context.font_cache;
        let text_width = style.str_width(font_cache, text);
        let line_height = style.line_height(font_cache);

        let left = Mm::from(x) + (Mm::from(w) - text_width) / 2.0;
        let top = Mm::from(y) + (Mm::from(h) - line_height) / 2.0;

        if !self
            .area
            .print_str(font_cache, Position::new(left, top), style, text)?
        {
            warn!("text {:?} did not fit on the page", text);
        }
        Ok(())
    }
}
