//! Raster helpers: QR bitmaps and the helpline icon.
//!
//! The PDF writer only accepts images without an alpha channel and loads them
//! from disk, so every raster is flattened to 8-bit RGB and written as a
//! transient PNG before it is placed on a page.

use super::error::GenerateError;
use image::imageops;
use image::{DynamicImage, Luma, Rgb, RgbImage, RgbaImage};
use png::{BitDepth as PngBitDepth, ColorType as PngColorType, Encoder as PngEncoder};
use qrcode::{EcLevel, QrCode};
use std::path::Path;
use tempfile::NamedTempFile;

/// The short URL every coupon page points to.
pub const QR_PAYLOAD: &str = "bit.ly/oasiscb24";

/// Pixels per QR module.
const QR_MODULE_PX: u32 = 10;
/// Quiet zone around the symbol, in modules.
const QR_BORDER_MODULES: u32 = 2;

/// Encodes `payload` as a black-on-white QR bitmap.
///
/// Uses error-correction level M and the smallest version that fits, with a
/// two-module white border.
pub fn encode_qr(payload: &str) -> Result<RgbImage, GenerateError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)
        .map_err(GenerateError::Qr)?;
    let symbol = code
        .render::<Luma<u8>>()
        .quiet_zone(false)
        .module_dimensions(QR_MODULE_PX, QR_MODULE_PX)
        .build();

    let border = QR_BORDER_MODULES * QR_MODULE_PX;
    let (w, h) = symbol.dimensions();
    let mut canvas = RgbImage::from_pixel(w + 2 * border, h + 2 * border, Rgb([255, 255, 255]));
    let symbol = DynamicImage::ImageLuma8(symbol).to_rgb8();
    imageops::overlay(&mut canvas, &symbol, i64::from(border), i64::from(border));
    Ok(canvas)
}

/// Loads the image at `path` and composites any transparency over white.
pub fn load_flattened(path: &Path) -> Result<RgbImage, GenerateError> {
    if !path.exists() {
        return Err(GenerateError::FileNotFound(path.to_path_buf()));
    }
    let rgba = image::open(path)?.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut background = RgbaImage::from_pixel(w, h, image::Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut background, &rgba, 0, 0);
    Ok(DynamicImage::ImageRgba8(background).to_rgb8())
}

/// Writes `image` to a fresh temporary PNG file.
///
/// The file is removed when the returned handle is dropped or closed.
pub fn write_temp_png(image: &RgbImage) -> Result<NamedTempFile, GenerateError> {
    let (w, h) = image.dimensions();
    let mut tmp = tempfile::Builder::new().suffix(".png").tempfile()?;
    {
        let file = tmp.as_file_mut();
        let mut encoder = PngEncoder::new(file, w, h);
        encoder.set_color(PngColorType::Rgb);
        encoder.set_depth(PngBitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(image.as_raw())?;
        writer.finish()?;
    }
    Ok(tmp)
}
