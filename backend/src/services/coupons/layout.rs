//! Fixed geometry of one coupon page.
//!
//! All measures are millimetres on an A4 portrait page. The coupon is a
//! 50 x 70 mm card centred on the page: QR code on top, the coupon code
//! beneath it, a rounded box with the redemption instructions and finally the
//! helpline caption with its icon.

use super::drawing::{rounded_rect, Font, Rgb, Surface};
use super::error::GenerateError;
use super::images::QR_PAYLOAD;
use super::rows::CouponRow;
use std::path::Path;

pub const PAGE_WIDTH: f64 = 210.0;
pub const PAGE_HEIGHT: f64 = 297.0;

pub const CARD_WIDTH: f64 = 50.0;
pub const CARD_HEIGHT: f64 = 70.0;
pub const QR_SIZE: f64 = 45.0;
pub const ICON_SIZE: f64 = 3.0;

const CODE_CELL_HEIGHT: f64 = 8.0;
const INSTRUCTION_PADDING: f64 = 2.0;
const INSTRUCTION_HEIGHT: f64 = 5.0;
const INSTRUCTION_RADIUS: f64 = 2.0;
const INSTRUCTION_LINE_HEIGHT: f64 = 4.0;
const HELPLINE_CELL_HEIGHT: f64 = -4.0;

pub const INSTRUCTION_LEAD: &str = "Scan the QR code or visit";
pub const INSTRUCTION_TAIL: &str = " and enter the";
pub const INSTRUCTION_CLOSE: &str = "coupon code to avail cashback.";

/// Top-left corner of the card.
pub fn card_origin() -> (f64, f64) {
    (
        (PAGE_WIDTH - CARD_WIDTH) / 2.0,
        (PAGE_HEIGHT - CARD_HEIGHT) / 2.0,
    )
}

/// Draws one complete coupon onto `surface`.
///
/// `qr_path` and `icon_path` are RGB PNG files placed as-is.
pub fn draw_coupon<S: Surface + ?Sized>(
    surface: &mut S,
    row: &CouponRow,
    qr_path: &Path,
    icon_path: &Path,
) -> Result<(), GenerateError> {
    let (x, y) = card_origin();

    surface.set_draw_color(Rgb::LIGHT_GRAY);
    surface.rect(x, y, CARD_WIDTH, CARD_HEIGHT);

    let qr_x = x + (CARD_WIDTH - QR_SIZE) / 2.0;
    let qr_y = y + 1.0;
    surface.image(qr_path, qr_x, qr_y, QR_SIZE, QR_SIZE)?;

    // The code label slightly overlaps the QR quiet zone.
    let code_y = qr_y + QR_SIZE - 2.5;
    surface.text_cell(
        x,
        code_y,
        CARD_WIDTH,
        CODE_CELL_HEIGHT,
        &row.code,
        Font::regular(21),
    )?;

    let box_x = x + INSTRUCTION_PADDING;
    let box_y = code_y + CODE_CELL_HEIGHT;
    let box_width = CARD_WIDTH - INSTRUCTION_PADDING * 2.0;

    surface.set_draw_color(Rgb::BLACK);
    rounded_rect(
        surface,
        box_x,
        box_y,
        box_width,
        INSTRUCTION_HEIGHT + 8.0,
        INSTRUCTION_RADIUS,
    );

    surface.text_cell(
        box_x + 1.0,
        box_y + 1.0,
        box_width - 2.0,
        INSTRUCTION_LINE_HEIGHT,
        INSTRUCTION_LEAD,
        Font::regular(8),
    )?;
    // Second line: the bold link and the regular tail are two overlapping
    // centred cells of different widths.
    surface.text_cell(
        box_x + 1.0,
        box_y + 5.0,
        box_width - 20.0,
        INSTRUCTION_LINE_HEIGHT,
        QR_PAYLOAD,
        Font::bold(8),
    )?;
    surface.text_cell(
        box_x + 2.0,
        box_y + 5.0,
        box_width + 17.0,
        INSTRUCTION_LINE_HEIGHT,
        INSTRUCTION_TAIL,
        Font::regular(8),
    )?;
    surface.text_cell(
        box_x + 1.0,
        box_y + 9.0,
        box_width - 2.0,
        INSTRUCTION_LINE_HEIGHT,
        INSTRUCTION_CLOSE,
        Font::regular(8),
    )?;

    let helpline_y = box_y + INSTRUCTION_HEIGHT + 13.0;
    surface.image(icon_path, x + 4.0, helpline_y - 3.5, ICON_SIZE, ICON_SIZE)?;
    surface.text_cell(
        x + ICON_SIZE,
        helpline_y,
        CARD_WIDTH - 4.0,
        HELPLINE_CELL_HEIGHT,
        &row.helpline,
        Font::regular(7),
    )?;

    Ok(())
}
