//! Coupon sheet generation from an uploaded CSV.
//!
//! Every data row of the CSV becomes one A4 page with a QR code for the
//! campaign short URL, the row's coupon code, the redemption instructions and
//! a helpline caption. The modules build on each other bottom-up:
//!
//! - `rows`: decodes the ISO-8859-1 CSV into `CouponRow`s.
//! - `images`: QR encoding and the flattened PNG files the PDF writer loads.
//! - `drawing`: the `Surface` trait plus the polyline arc / rounded rectangle.
//! - `layout`: the fixed page template drawn onto any `Surface`.
//! - `pdf_surface` / `sheet`: the `genpdf` adapter and the page sequence.
//! - `generator`: turns a CSV path into `<original stem>.pdf`.
//! - `upload`: the HTTP handler.
//!
//! The only route is:
//! - `POST /upload`: multipart form with a `csv` file field. Responds with the
//!   PDF as an attachment, or with a JSON `{"error": ...}` body.

use actix_web::web::{post, scope};
use actix_web::Scope;

mod drawing;
mod error;
mod generator;
mod images;
mod layout;
mod pdf_surface;
mod rows;
mod sheet;
mod upload;

pub use generator::GeneratorConfig;

const API_PATH: &str = "";

/// Configures and returns the Actix scope for the coupon routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/upload", post().to(upload::process))
}
