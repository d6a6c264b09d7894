//! Reading coupon rows out of the uploaded CSV.
//!
//! Uploads are ISO-8859-1, so every byte maps straight to the code point of
//! the same value. Header names are matched exactly.

use super::error::GenerateError;
use csv::{ByteRecord, ReaderBuilder};
use log::debug;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

pub const CODE_COLUMN: &str = "Code";
pub const HELPLINE_COLUMN: &str = "Helpline";
pub const DEFAULT_HELPLINE: &str = "WhatsApp Helpline: 8766070705";

/// One data row of the upload; becomes one page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CouponRow {
    pub code: String,
    pub helpline: String,
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn column_index(headers: &ByteRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| latin1(h) == name)
}

/// Opens `path` and reads every coupon row, in file order.
pub fn read_rows(path: &Path) -> Result<Vec<CouponRow>, GenerateError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => GenerateError::FileNotFound(path.to_path_buf()),
        _ => GenerateError::Io(e),
    })?;
    read_rows_from(file)
}

/// Reads coupon rows from any CSV source.
///
/// Fails without returning any rows when the `Code` column is absent or the
/// data cannot be parsed. A missing `Helpline` column, or an empty cell in it,
/// yields [`DEFAULT_HELPLINE`].
pub fn read_rows_from<R: Read>(source: R) -> Result<Vec<CouponRow>, GenerateError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(source);

    let headers = reader.byte_headers().map_err(GenerateError::Decode)?.clone();
    let code_idx = column_index(&headers, CODE_COLUMN)
        .ok_or_else(|| GenerateError::MissingColumn(CODE_COLUMN.to_string()))?;
    let helpline_idx = column_index(&headers, HELPLINE_COLUMN);

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(GenerateError::Decode)?;
        let code = record.get(code_idx).map(latin1).unwrap_or_default();
        let helpline = helpline_idx
            .and_then(|idx| record.get(idx))
            .filter(|cell| !cell.is_empty())
            .map(latin1)
            .unwrap_or_else(|| DEFAULT_HELPLINE.to_string());
        rows.push(CouponRow { code, helpline });
    }
    debug!("read {} coupon rows", rows.len());
    Ok(rows)
}
