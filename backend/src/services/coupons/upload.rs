use super::generator::{generate_pdf_from_csv, output_file_name};
use crate::config::AppConfig;
use actix_files::NamedFile;
use actix_multipart::{Multipart, MultipartError};
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use common::responses::{
    ErrorResponse, FILE_NOT_SAVED, GENERATION_FAILED, NO_FILE_PART, NO_SELECTED_FILE,
    UNKNOWN_ERROR,
};
use futures_util::StreamExt;
use log::{debug, error, info, warn};
use mime_guess::from_path;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the multipart field carrying the CSV.
pub const CSV_FIELD: &str = "csv";

/// Every way an upload can fail, each mapped to one JSON error body.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("{}", NO_FILE_PART)]
    NoFilePart,
    #[error("{}", NO_SELECTED_FILE)]
    NoSelectedFile,
    #[error("{}", FILE_NOT_SAVED)]
    NotSaved,
    #[error("{}", GENERATION_FAILED)]
    Generation,
    #[error("{}", UNKNOWN_ERROR)]
    Unknown,
}

impl ResponseError for UploadError {
    fn status_code(&self) -> StatusCode {
        match self {
            UploadError::NoFilePart | UploadError::NoSelectedFile => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.to_string()))
    }
}

/// A CSV persisted in the request's scratch directory.
struct SavedUpload {
    path: PathBuf,
    original_filename: String,
    bytes: usize,
}

/// `Content-Disposition: attachment; filename="<name>"`
pub fn attachment(name: &str) -> ContentDisposition {
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(name.to_string())],
    }
}

/// True for errors raised before the body is parsed, when the request is not
/// a multipart form at all.
fn is_not_a_form(error: &MultipartError) -> bool {
    matches!(
        error,
        MultipartError::ContentTypeMissing
            | MultipartError::ContentTypeParse
            | MultipartError::ContentTypeIncompatible
            | MultipartError::BoundaryMissing
    )
}

/// Reads the multipart stream, storing the `csv` file part under `dir`.
///
/// Only the last path component of the client's filename is used. Every other
/// field is drained and ignored, including a `csv` field sent as a plain value
/// without a filename.
async fn save_upload(mut payload: Multipart, dir: &Path) -> Result<SavedUpload, UploadError> {
    let mut saved: Option<SavedUpload> = None;
    let mut fields_read = 0;

    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(field) => field,
            Err(e) if fields_read == 0 && is_not_a_form(&e) => {
                warn!("Upload without a multipart form: {}", e);
                return Err(UploadError::NoFilePart);
            }
            Err(e) => {
                error!("Malformed multipart payload: {}", e);
                return Err(UploadError::Unknown);
            }
        };
        fields_read += 1;

        let (field_name, filename) = field
            .content_disposition()
            .map(|cd| {
                (
                    cd.get_name().map(str::to_string),
                    cd.get_filename().map(str::to_string),
                )
            })
            .unwrap_or_default();

        let filename = match filename {
            Some(filename) if field_name.as_deref() == Some(CSV_FIELD) && saved.is_none() => {
                filename
            }
            _ => {
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|_| UploadError::Unknown)?;
                }
                continue;
            }
        };

        let file_name = Path::new(&filename)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or(UploadError::NoSelectedFile)?;

        let path = dir.join(&file_name);
        let mut file = File::create(&path).map_err(|e| {
            error!("Could not create {}: {}", path.display(), e);
            UploadError::NotSaved
        })?;
        let mut bytes = 0;
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| {
                error!("Upload of {} interrupted: {}", file_name, e);
                UploadError::Unknown
            })?;
            bytes += chunk.len();
            file.write_all(&chunk).map_err(|e| {
                error!("Could not write {}: {}", path.display(), e);
                UploadError::NotSaved
            })?;
        }
        file.flush().map_err(|_| UploadError::NotSaved)?;

        saved = Some(SavedUpload {
            path,
            original_filename: file_name,
            bytes,
        });
    }

    saved.ok_or(UploadError::NoFilePart)
}

/// `POST /upload`: turns the uploaded CSV into a coupon PDF download.
pub async fn process(
    req: HttpRequest,
    payload: Multipart,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, UploadError> {
    // Dropped (and removed from disk) when the request is done.
    let scratch = tempfile::Builder::new()
        .prefix("coupons-")
        .tempdir_in(&config.temp_dir)
        .map_err(|e| {
            error!(
                "Could not create a scratch directory in {}: {}",
                config.temp_dir.display(),
                e
            );
            UploadError::NotSaved
        })?;

    let upload = save_upload(payload, scratch.path()).await?;
    if !upload.path.exists() {
        error!("File not saved correctly at: {}", upload.path.display());
        return Err(UploadError::NotSaved);
    }
    debug!(
        "Saved upload {} ({} bytes) to {}",
        upload.original_filename,
        upload.bytes,
        upload.path.display()
    );

    let icon_path = config.icon_path.clone();
    let generator = config.generator.clone();
    let csv_path = upload.path.clone();
    let original_filename = upload.original_filename.clone();
    let handle = tokio::task::spawn_blocking(move || {
        generate_pdf_from_csv(&csv_path, &original_filename, &icon_path, &generator)
    });

    let output = match handle.await {
        Ok(Ok(path)) => path,
        // Already logged with its cause by the generator.
        Ok(Err(_)) => return Err(UploadError::Generation),
        Err(e) => {
            error!("PDF generation task failed: {}", e);
            return Err(UploadError::Unknown);
        }
    };

    let download_name = output_file_name(&upload.original_filename);
    let file = NamedFile::open(&output).map_err(|e| {
        error!("Could not open generated {}: {}", output.display(), e);
        UploadError::Unknown
    })?;
    info!("Sending {} for upload {}", download_name, upload.original_filename);

    Ok(file
        .set_content_type(from_path(&output).first_or_octet_stream())
        .set_content_disposition(attachment(&download_name))
        .into_response(&req))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::coupons::configure_routes;
    use crate::services::coupons::generator::GeneratorConfig;
    use actix_web::dev::ServiceResponse;
    use actix_web::http::header;
    use actix_web::test::{call_service, init_service, read_body, read_body_json, TestRequest};
    use actix_web::App;
    use pretty_assertions::assert_eq;
    use std::fs;

    const BOUNDARY: &str = "----coupon-test-boundary";

    struct Harness {
        root: tempfile::TempDir,
        config: AppConfig,
    }

    fn harness() -> Harness {
        let root = tempfile::tempdir().unwrap();
        let temp_dir = root.path().join("tmp");
        fs::create_dir_all(&temp_dir).unwrap();
        let icon_path = root.path().join("icon.png");
        image::RgbImage::from_pixel(4, 4, image::Rgb([0, 160, 0]))
            .save(&icon_path)
            .unwrap();
        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            temp_dir,
            icon_path,
            generator: GeneratorConfig {
                fonts_dir: root.path().join("fonts"),
                output_dir: root.path().join("out"),
            },
        };
        Harness { root, config }
    }

    fn multipart(name: &str, filename: Option<&str>, contents: &str) -> String {
        let disposition = match filename {
            Some(f) => format!("form-data; name=\"{}\"; filename=\"{}\"", name, f),
            None => format!("form-data; name=\"{}\"", name),
        };
        format!(
            "--{b}\r\nContent-Disposition: {d}\r\nContent-Type: text/csv\r\n\r\n{c}\r\n--{b}--\r\n",
            b = BOUNDARY,
            d = disposition,
            c = contents
        )
    }

    async fn send(config: AppConfig, req: TestRequest) -> ServiceResponse {
        let app = init_service(
            App::new()
                .app_data(web::Data::new(config))
                .service(configure_routes()),
        )
        .await;
        call_service(&app, req.uri("/upload").to_request()).await
    }

    fn form(body: String) -> TestRequest {
        TestRequest::post()
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(body)
    }

    async fn post(config: AppConfig, body: String) -> (StatusCode, ErrorResponse) {
        let resp = send(config, form(body)).await;
        let status = resp.status();
        let body: ErrorResponse = read_body_json(resp).await;
        (status, body)
    }

    fn scratch_is_empty(config: &AppConfig) -> bool {
        fs::read_dir(&config.temp_dir).unwrap().count() == 0
    }

    #[actix_web::test]
    async fn missing_csv_field_is_rejected() {
        let h = harness();
        let body = multipart("document", Some("codes.csv"), "Code\nA\n");
        let (status, error) = post(h.config.clone(), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error, ErrorResponse::new(NO_FILE_PART));
    }

    #[actix_web::test]
    async fn request_without_a_form_has_no_file_part() {
        let h = harness();
        let resp = send(h.config.clone(), TestRequest::post()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse = read_body_json(resp).await;
        assert_eq!(error, ErrorResponse::new(NO_FILE_PART));
    }

    #[actix_web::test]
    async fn plain_text_body_has_no_file_part() {
        let h = harness();
        let req = TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "text/csv"))
            .set_payload("Code\nA\n");
        let resp = send(h.config.clone(), req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse = read_body_json(resp).await;
        assert_eq!(error, ErrorResponse::new(NO_FILE_PART));
    }

    #[actix_web::test]
    async fn csv_value_without_filename_has_no_file_part() {
        let h = harness();
        let body = multipart(CSV_FIELD, None, "Code\nA\n");
        let (status, error) = post(h.config.clone(), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error, ErrorResponse::new(NO_FILE_PART));
    }

    #[actix_web::test]
    async fn empty_filename_is_rejected() {
        let h = harness();
        let body = multipart(CSV_FIELD, Some(""), "Code\nA\n");
        let (status, error) = post(h.config.clone(), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error, ErrorResponse::new(NO_SELECTED_FILE));
    }

    #[actix_web::test]
    async fn csv_without_code_column_is_a_generation_error() {
        let h = harness();
        let body = multipart(CSV_FIELD, Some("codes.csv"), "Name,Helpline\nA,B\n");
        let (status, error) = post(h.config.clone(), body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error, ErrorResponse::new(GENERATION_FAILED));
        assert!(!h.config.generator.output_dir.join("codes.pdf").exists());
        assert!(scratch_is_empty(&h.config));
    }

    #[actix_web::test]
    async fn render_failure_leaves_no_pdf_behind() {
        // No fonts are installed in the harness, so rendering fails late.
        let h = harness();
        let body = multipart(CSV_FIELD, Some("codes.csv"), "Code,Helpline\nA,\nB,Call\n");
        let (status, error) = post(h.config.clone(), body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error, ErrorResponse::new(GENERATION_FAILED));
        assert!(!h.config.generator.output_dir.join("codes.pdf").exists());
        assert!(scratch_is_empty(&h.config));
    }

    #[actix_web::test]
    async fn missing_temp_dir_means_not_saved() {
        let mut h = harness();
        h.config.temp_dir = h.root.path().join("missing");
        let body = multipart(CSV_FIELD, Some("codes.csv"), "Code\nA\n");
        let (status, error) = post(h.config.clone(), body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error, ErrorResponse::new(FILE_NOT_SAVED));
    }

    #[actix_web::test]
    async fn upload_returns_the_pdf_as_an_attachment() {
        let mut h = harness();
        h.config.generator.fonts_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("fonts");
        let body = multipart(
            CSV_FIELD,
            Some("march.csv"),
            "Code,Helpline\nA1,\nB2,Call 100\nC3,\n",
        );
        let resp = send(h.config.clone(), form(body)).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let headers = resp.headers();
        assert_eq!(
            headers.get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap(),
            "attachment; filename=\"march.pdf\""
        );
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap().to_str().unwrap(),
            "application/pdf"
        );

        let pdf = read_body(resp).await;
        assert!(pdf.starts_with(b"%PDF"));
        assert!(String::from_utf8_lossy(&pdf).contains("/Count 3"));
        assert!(h.config.generator.output_dir.join("march.pdf").exists());
        assert!(scratch_is_empty(&h.config));
    }

    #[test]
    fn errors_map_to_status_codes() {
        assert_eq!(UploadError::NoFilePart.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(UploadError::NoSelectedFile.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(UploadError::NotSaved.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(UploadError::Generation.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(UploadError::Unknown.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn attachment_header_names_the_pdf() {
        assert_eq!(
            attachment("march.pdf").to_string(),
            "attachment; filename=\"march.pdf\""
        );
    }
}
