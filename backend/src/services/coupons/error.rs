use std::path::PathBuf;

/// Why a coupon sheet could not be produced.
///
/// Any of these means no output file was written.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("the file {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    #[error("missing expected column in CSV: {0}")]
    MissingColumn(String),

    #[error("error decoding file: {0}")]
    Decode(#[source] csv::Error),

    #[error("the CSV file has no data rows")]
    NoRows,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("QR encoding failed: {0:?}")]
    Qr(qrcode::types::QrError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),

    #[error("font family could not be loaded: {0}")]
    Font(#[source] genpdf::error::Error),

    #[error("PDF rendering failed: {0}")]
    Pdf(#[from] genpdf::error::Error),
}
