use crate::config::Endpoint;
use thiserror::Error;

/// Failures talking to a prediction service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Server error: {status} - {}", .message.as_deref().unwrap_or("Prediction failed"))]
    Http { status: u16, message: Option<String> },
    #[error("Failed to parse response: {0}")]
    Parse(String),
    #[error("Malformed {endpoint} response: {reason}")]
    Malformed { endpoint: Endpoint, reason: String },
    #[error("Prediction rejected: {0}")]
    Rejected(String),
    #[error("Failed to build request: {0}")]
    Request(String),
}

const CONNECTION_STEPS: &[&str] = &[
    "Open a terminal in your backend folder",
    "Start the API server, for example: uvicorn app.main:app --port 8000",
    "Check that the API URL on the Settings page points at the running server",
];

impl ApiError {
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// Message shown in the failed state. Connection failures are rewritten
    /// to point at the likely cause.
    pub fn user_message(&self, base_url: &str) -> String {
        match self {
            ApiError::Network(_) => format!(
                "Cannot connect to server. Please make sure the backend is running on {}",
                base_url
            ),
            ApiError::Http {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Http {
                status,
                message: None,
            } => format!("Prediction failed (HTTP {})", status),
            ApiError::Parse(_) | ApiError::Malformed { .. } => {
                format!("The server returned an unexpected response. {}", self)
            }
            ApiError::Rejected(message) => message.clone(),
            ApiError::Request(_) => self.to_string(),
        }
    }

    pub fn remediation_steps(&self) -> &'static [&'static str] {
        if self.is_connection_failure() {
            CONNECTION_STEPS
        } else {
            &[]
        }
    }

    /// Builds an `Http` error from a non-2xx body, pulling out a
    /// server-supplied message when the body is JSON.
    pub fn from_status(status: u16, body: &str) -> Self {
        ApiError::Http {
            status,
            message: server_message(body),
        }
    }
}

/// Best-effort extraction of `detail`, `error` or `message` from an error
/// body. FastAPI validation errors carry `detail` as a list of `{msg}`.
pub fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;
    for key in ["detail", "error", "message"] {
        match object.get(key) {
            Some(serde_json::Value::String(text)) if !text.trim().is_empty() => {
                return Some(text.trim().to_string());
            }
            Some(serde_json::Value::Array(items)) => {
                let joined = items
                    .iter()
                    .filter_map(|item| {
                        item.get("msg")
                            .and_then(|msg| msg.as_str())
                            .or_else(|| item.as_str())
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                if !joined.is_empty() {
                    return Some(joined);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serde JSON error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_failure_points_at_backend() {
        let err = ApiError::Network("TypeError: Failed to fetch".into());
        let message = err.user_message("http://localhost:8000");
        assert_eq!(
            message,
            "Cannot connect to server. Please make sure the backend is running on http://localhost:8000"
        );
        assert_eq!(err.remediation_steps().len(), 3);
    }

    #[test]
    fn http_error_prefers_server_detail() {
        let err = ApiError::from_status(503, r#"{"detail":"Model not loaded"}"#);
        assert_eq!(err.user_message("http://x"), "Model not loaded");
        assert!(err.remediation_steps().is_empty());
    }

    #[test]
    fn http_error_falls_back_to_generic_message() {
        let err = ApiError::from_status(500, "<html>Internal Server Error</html>");
        assert_eq!(err.user_message("http://x"), "Prediction failed (HTTP 500)");
        assert_eq!(err.to_string(), "Server error: 500 - Prediction failed");
    }

    #[test]
    fn validation_detail_list_is_joined() {
        let body = r#"{"detail":[{"loc":["body","cao"],"msg":"field required"},{"msg":"value is not a valid float"}]}"#;
        assert_eq!(
            server_message(body).as_deref(),
            Some("field required; value is not a valid float")
        );
    }

    #[test]
    fn error_and_message_keys_are_checked() {
        assert_eq!(
            server_message(r#"{"error":"bad image"}"#).as_deref(),
            Some("bad image")
        );
        assert_eq!(
            server_message(r#"{"message":"busy"}"#).as_deref(),
            Some("busy")
        );
        assert_eq!(server_message(r#"{"detail":""}"#), None);
        assert_eq!(server_message("[1,2]"), None);
    }
}
