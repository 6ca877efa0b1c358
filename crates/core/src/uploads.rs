//! Upload limits and file checks for questionnaire file fields.
//!
//! Every check here runs before a single byte is written to object storage.

use crate::error::FieldError;

/// Per-file size cap (5 MB).
pub const MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// Aggregate cap for a multi-photo field (50 MB).
pub const MAX_MULTI_FILE_BYTES: u64 = 50 * 1024 * 1024;

/// Largest request body accepted by the upload route (aggregate cap plus
/// multipart framing).
pub const MAX_UPLOAD_REQUEST_BYTES: usize = (MAX_MULTI_FILE_BYTES as usize) + 1024 * 1024;

/// MIME types accepted for upload.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/svg+xml",
    "application/pdf",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("{name} is larger than the 5 MB limit per file")]
    FileTooLarge { name: String },

    #[error("The selected files add up to more than the 50 MB limit")]
    TotalTooLarge,

    #[error("{name} has an unsupported file type ({mime_type}). Accepted: JPEG, PNG, WebP, GIF, SVG or PDF")]
    UnsupportedType { name: String, mime_type: String },

    #[error("{name} is empty")]
    Empty { name: String },
}

impl UploadError {
    /// Attach the error to the questionnaire field being uploaded to.
    pub fn for_field(&self, question_id: &str) -> FieldError {
        FieldError::new(question_id, self.to_string())
    }
}

/// Check a single file's size and declared type.
pub fn validate_file(name: &str, mime_type: &str, size: u64) -> Result<(), UploadError> {
    if size == 0 {
        return Err(UploadError::Empty { name: name.to_string() });
    }
    if size > MAX_FILE_BYTES {
        return Err(UploadError::FileTooLarge { name: name.to_string() });
    }
    if !is_allowed_mime(mime_type) {
        return Err(UploadError::UnsupportedType {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
        });
    }
    Ok(())
}

/// Check the combined size of a multi-file selection.
pub fn validate_total(sizes: &[u64]) -> Result<(), UploadError> {
    let total: u64 = sizes.iter().sum();
    if total > MAX_MULTI_FILE_BYTES {
        return Err(UploadError::TotalTooLarge);
    }
    Ok(())
}

pub fn is_allowed_mime(mime_type: &str) -> bool {
    let base = mime_type.split(';').next().unwrap_or_default().trim();
    ALLOWED_MIME_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(base))
}

/// Reduce a client-supplied file name to a safe storage key component.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
