use serde::{Deserialize, Serialize};

/// Body of every failed request to the coupon service.
///
/// Serialized as `{"error": "<message>"}`; the message is one of the constants
/// below so clients can match on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorResponse {
            error: message.into(),
        }
    }
}

/// The multipart request had no `csv` field.
pub const NO_FILE_PART: &str = "No file part";
/// The `csv` field carried an empty filename.
pub const NO_SELECTED_FILE: &str = "No selected file";
/// The upload could not be written to or found in the temp directory.
pub const FILE_NOT_SAVED: &str = "File not saved correctly";
/// The generator produced no output.
pub const GENERATION_FAILED: &str = "Error generating PDF";
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";
