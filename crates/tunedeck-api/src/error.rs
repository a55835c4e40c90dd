// Error types for the player API client.
//
// HTTP failures keep the status line and the server's parsed error body so
// callers can branch on the server-defined `ErrorType` without the client
// interpreting it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server-defined error classification, passed through as received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "String")]
pub enum ErrorType {
    #[default]
    None,
    Unknown,
    Internal,
    InvalidParam,
    InvalidState,
    NotFound,
    AccessDenied,
}

impl From<String> for ErrorType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "none" => ErrorType::None,
            "internal" => ErrorType::Internal,
            "invalidParam" => ErrorType::InvalidParam,
            "invalidState" => ErrorType::InvalidState,
            "notFound" => ErrorType::NotFound,
            "accessDenied" => ErrorType::AccessDenied,
            _ => ErrorType::Unknown,
        }
    }
}

/// Parsed body of a non-2xx response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub parameter: Option<String>,
    #[serde(rename = "type", default)]
    pub error_type: ErrorType,
}

#[derive(Debug, Deserialize)]
struct WrappedErrorBody {
    error: ErrorBody,
}

impl ErrorBody {
    /// Parse an error response body.
    ///
    /// Accepts `{"error": {...}}`, a flat `{...}` object, or arbitrary text
    /// (kept verbatim as the message).
    pub fn parse(text: &str) -> Self {
        if let Ok(wrapped) = serde_json::from_str::<WrappedErrorBody>(text) {
            return wrapped.error;
        }
        if let Ok(serde_json::Value::Object(fields)) = serde_json::from_str(text) {
            let known = ["message", "parameter", "type"];
            if known.iter().any(|key| fields.contains_key(*key)) {
                if let Ok(flat) = serde_json::from_value(serde_json::Value::Object(fields)) {
                    return flat;
                }
            }
        }
        let trimmed = text.trim();
        ErrorBody {
            message: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            ..ErrorBody::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{status} {status_text}{}", .body.message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Http {
        status: u16,
        status_text: String,
        body: ErrorBody,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid url `{url}`: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("event stream closed: {0}")]
    StreamClosed(String),

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl ApiError {
    /// HTTP status code, if this error came from a server response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server-provided error type, or `None` for client-side failures.
    pub fn error_type(&self) -> ErrorType {
        match self {
            ApiError::Http { body, .. } => body.error_type,
            _ => ErrorType::None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404) || self.error_type() == ErrorType::NotFound
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
