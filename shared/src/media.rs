use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataUrlError {
    #[error("Not a data URL")]
    MissingPrefix,
    #[error("Data URL is not base64 encoded")]
    NotBase64,
    #[error("Invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDataUrl {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Decodes `data:<mime>;base64,<payload>`, as produced by a canvas capture
/// or a file reader.
pub fn decode_data_url(url: &str) -> Result<DecodedDataUrl, DataUrlError> {
    let rest = url.strip_prefix("data:").ok_or(DataUrlError::MissingPrefix)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUrlError::MissingPrefix)?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or(DataUrlError::NotBase64)?;
    let bytes = STANDARD.decode(payload.trim())?;

    Ok(DecodedDataUrl {
        mime_type: if mime_type.is_empty() {
            "text/plain".to_string()
        } else {
            mime_type.to_string()
        },
        bytes,
    })
}

/// The crack service returns a bare base64 PNG; images need a full data URL.
pub fn mask_data_url(mask_base64: &str) -> String {
    if mask_base64.starts_with("data:") {
        mask_base64.to_string()
    } else {
        format!("data:image/png;base64,{}", mask_base64.trim())
    }
}

/// File name for a camera frame, e.g. `capture-1767225600000.jpg`.
pub fn capture_file_name(timestamp_ms: u64, mime_type: &str) -> String {
    let extension = match mime_type {
        "image/png" => "png",
        _ => "jpg",
    };
    format!("capture-{}.{}", timestamp_ms, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_canvas_capture() {
        let decoded = decode_data_url("data:image/jpeg;base64,/9j/4A==").unwrap();
        assert_eq!(decoded.mime_type, "image/jpeg");
        assert_eq!(decoded.bytes, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[test]
    fn rejects_non_data_urls() {
        assert_eq!(
            decode_data_url("blob:http://localhost/123"),
            Err(DataUrlError::MissingPrefix)
        );
        assert_eq!(
            decode_data_url("data:text/plain,hello"),
            Err(DataUrlError::NotBase64)
        );
        assert!(matches!(
            decode_data_url("data:image/png;base64,@@@"),
            Err(DataUrlError::Decode(_))
        ));
    }

    #[test]
    fn mask_gets_png_prefix_once() {
        assert_eq!(mask_data_url("iVBORw0K"), "data:image/png;base64,iVBORw0K");
        assert_eq!(
            mask_data_url("data:image/png;base64,iVBORw0K"),
            "data:image/png;base64,iVBORw0K"
        );
    }

    #[test]
    fn capture_names_follow_mime() {
        assert_eq!(capture_file_name(42, "image/jpeg"), "capture-42.jpg");
        assert_eq!(capture_file_name(42, "image/png"), "capture-42.png");
    }
}
