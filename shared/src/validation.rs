use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const ALLOWED_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

/// What the validator needs to know about a picked or captured file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

impl FileMeta {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No file selected")]
    NoFile,
    #[error("Invalid file type. Please upload a JPG or PNG image.")]
    UnsupportedType(String),
    #[error(
        "File size exceeds 10MB. Please upload a smaller image. Current size: {:.2}MB",
        megabytes(.size)
    )]
    TooLarge { size: u64 },
}

fn megabytes(size: &u64) -> f64 {
    *size as f64 / 1024.0 / 1024.0
}

/// Checks the declared MIME type and byte size only; the content itself is
/// never sniffed, so a renamed file passes.
pub fn validate_image(file: Option<&FileMeta>) -> Result<(), ValidationError> {
    let file = file.ok_or(ValidationError::NoFile)?;

    if !ALLOWED_TYPES.contains(&file.mime_type.as_str()) {
        return Err(ValidationError::UnsupportedType(file.mime_type.clone()));
    }

    if file.size > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge { size: file.size });
    }

    Ok(())
}

/// Loose filter used for drag-drop and paste, before full validation.
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.2} MB", megabytes(&bytes))
    }
}
