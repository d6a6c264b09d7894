//! Builds the coupon PDF for an uploaded CSV.

use super::error::GenerateError;
use super::images::{load_flattened, write_temp_png};
use super::rows::read_rows;
use super::sheet::CouponSheet;
use genpdf::fonts::{FontData, FontFamily};
use genpdf::{Document, PaperSize};
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Where the generator finds fonts and writes its output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub fonts_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// `<stem of the original upload>.pdf`
pub fn output_file_name(original_filename: &str) -> String {
    let stem = Path::new(original_filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}.pdf", stem)
}

/// Load the font family: Arial when present, then LiberationSans, then the
/// DejaVuSans family shipped in `backend/fonts`.
fn load_font(fonts_dir: &Path) -> Result<FontFamily<FontData>, GenerateError> {
    genpdf::fonts::from_files(fonts_dir, "Arial", None)
        .or_else(|_| genpdf::fonts::from_files(fonts_dir, "LiberationSans", None))
        .or_else(|_| genpdf::fonts::from_files(fonts_dir, "DejaVuSans", None))
        .map_err(GenerateError::Font)
}

fn configure_document(fonts_dir: &Path, title: &str) -> Result<Document, GenerateError> {
    let mut doc = Document::new(load_font(fonts_dir)?);
    doc.set_title(title);
    doc.set_paper_size(PaperSize::A4);
    Ok(doc)
}

fn generate(
    csv_path: &Path,
    original_filename: &str,
    icon_path: &Path,
    config: &GeneratorConfig,
) -> Result<PathBuf, GenerateError> {
    let rows = read_rows(csv_path)?;
    if rows.is_empty() {
        return Err(GenerateError::NoRows);
    }
    let page_count = rows.len();

    let icon = write_temp_png(&load_flattened(icon_path)?)?;
    let file_name = output_file_name(original_filename);
    let mut doc = configure_document(&config.fonts_dir, &file_name)?;
    doc.push(CouponSheet::new(rows, icon.path().to_path_buf()));

    // Render next to the final location and move it into place only once the
    // whole document is written.
    fs::create_dir_all(&config.output_dir)?;
    let mut staging = NamedTempFile::new_in(&config.output_dir)?;
    doc.render(staging.as_file_mut())?;

    let output_path = config.output_dir.join(&file_name);
    staging
        .persist(&output_path)
        .map_err(|e| GenerateError::Io(e.error))?;

    info!(
        "PDF generated successfully: {} ({} pages)",
        output_path.display(),
        page_count
    );
    Ok(output_path)
}

/// Renders one coupon page per row of the CSV at `csv_path`.
///
/// Returns the path of `<output_dir>/<original stem>.pdf`. On any failure the
/// error is logged and nothing is left in `output_dir`.
pub fn generate_pdf_from_csv(
    csv_path: &Path,
    original_filename: &str,
    icon_path: &Path,
    config: &GeneratorConfig,
) -> Result<PathBuf, GenerateError> {
    generate(csv_path, original_filename, icon_path, config).map_err(|e| {
        error!("Error generating PDF for {}: {}", original_filename, e);
        e
    })
}
