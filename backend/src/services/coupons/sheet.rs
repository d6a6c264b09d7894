use super::drawing::Surface;
use super::error::GenerateError;
use super::images::{encode_qr, write_temp_png, QR_PAYLOAD};
use super::layout::draw_coupon;
use super::pdf_surface::PdfSurface;
use super::rows::CouponRow;
use genpdf::error::{Error as PdfError, ErrorKind as PdfErrorKind};
use genpdf::render::Area;
use genpdf::style::Style;
use genpdf::{Context, Element, RenderResult};
use log::debug;
use std::collections::VecDeque;
use std::path::PathBuf;

/// The sequence of coupon pages, one per row, in row order.
///
/// As a `genpdf` element it fills exactly one page per render call and asks
/// for another page while rows remain.
pub struct CouponSheet {
    rows: VecDeque<CouponRow>,
    icon_path: PathBuf,
    pages_drawn: usize,
}

impl CouponSheet {
    pub fn new(rows: Vec<CouponRow>, icon_path: PathBuf) -> Self {
        CouponSheet {
            rows: rows.into(),
            icon_path,
            pages_drawn: 0,
        }
    }

    /// Draws the next row's coupon and returns whether more rows remain.
    ///
    /// The QR bitmap is encoded for every page and its transient PNG is
    /// deleted as soon as the page is drawn.
    pub fn draw_next_page<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<bool, GenerateError> {
        let Some(row) = self.rows.pop_front() else {
            return Ok(false);
        };

        let bitmap = encode_qr(QR_PAYLOAD)?;
        let qr_file = write_temp_png(&bitmap)?;
        draw_coupon(surface, &row, qr_file.path(), &self.icon_path)?;
        qr_file.close()?;

        self.pages_drawn += 1;
        debug!("drew coupon page {} for code {:?}", self.pages_drawn, row.code);
        Ok(!self.rows.is_empty())
    }
}

impl Element for CouponSheet {
    fn render(
        &mut self,
        context: &Context,
        area: Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, PdfError> {
        let size = area.size();
        let mut surface = PdfSurface::new(context, area);
        let has_more = self
            .draw_next_page(&mut surface)
            .map_err(|e| PdfError::new(e.to_string(), PdfErrorKind::Internal))?;
        if !has_more {
            debug!("coupon sheet complete after {} pages", self.pages_drawn);
        }
        Ok(RenderResult { size, has_more })
    }
}
