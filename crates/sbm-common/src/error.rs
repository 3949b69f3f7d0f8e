use thiserror::Error;

use crate::models::ErrorBody;

/// Status reported for failures where no HTTP response arrived.
pub const TRANSPORT_STATUS: u16 = 0;

const GENERIC_MESSAGE: &str = "request failed";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response or transport failure. Client errors, server errors
    /// and network errors all land here.
    #[error("{status}: {status_text}: {message}")]
    RequestFailed {
        status: u16,
        status_text: String,
        message: String,
    },

    /// A 2xx response whose body did not have the expected shape.
    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("invalid server URL '{0}'")]
    InvalidUrl(String),

    /// Keys that cannot be expressed as a single path segment.
    #[error("'{0}' cannot be used as a resource key")]
    InvalidKey(String),
}

impl ApiError {
    /// Builds a `RequestFailed` from a response status and raw body.
    ///
    /// The message is the body's `err` field. Without one it falls back to
    /// the body text, then to the status text.
    pub fn from_response(status: u16, status_text: &str, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => parsed.err,
            Err(_) if !body.trim().is_empty() => body.trim().to_string(),
            Err(_) if !status_text.is_empty() => status_text.to_string(),
            Err(_) => GENERIC_MESSAGE.to_string(),
        };

        ApiError::RequestFailed {
            status,
            status_text: status_text.to_string(),
            message,
        }
    }

    /// Builds a `RequestFailed` for a failure with no response at all.
    pub fn transport(description: impl Into<String>) -> Self {
        let description = description.into();
        ApiError::RequestFailed {
            status: TRANSPORT_STATUS,
            status_text: "error".to_string(),
            message: if description.is_empty() {
                GENERIC_MESSAGE.to_string()
            } else {
                description
            },
        }
    }

    /// HTTP status, `Some(0)` for transport failures, `None` for errors
    /// that were not request failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
