use reqwest::StatusCode;
use serde_json::Value;

/// Failure talking to the command backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response whose body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
}

impl BackendError {
    /// Human-readable message supplied by the backend, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            BackendError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn from_error_body(status: StatusCode, body: &[u8]) -> Self {
        let detail = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|value| extract_detail(&value));
        BackendError::Status { status, detail }
    }
}

/// Pull the `detail` field out of an error body. Blank strings count as no
/// detail; non-string details (FastAPI validation errors are arrays) are kept
/// as compact JSON.
pub fn extract_detail(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::Null => None,
        Value::String(message) if message.trim().is_empty() => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}
