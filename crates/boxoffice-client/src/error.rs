//! Client error types.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Backend answered with a non-success status.
    #[error("service error ({status}): {message}")]
    Service {
        /// HTTP status code.
        status: u16,
        /// Message supplied by the backend, or `HTTP <status>` when it sent none.
        message: String,
    },

    /// The request never completed (connection refused, DNS, timeout...).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// A success response could not be decoded into the expected type.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// URL parsing failed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A resource id that cannot be addressed as a single path segment.
    #[error("invalid resource id: {0:?}")]
    InvalidId(String),

    /// JSON serialization of a request body failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status of a service error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Service { status: 404, .. })
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Service { status: 401 | 403, .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Service { status, .. } if *status >= 500)
    }

    /// Check if the request failed before a response arrived.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Pull a human-readable message out of an error body.
///
/// Backends answer either with a bare JSON string, an object carrying a
/// `message`/`error`/`title` field, or plain text.
pub(crate) fn backend_message(status: u16, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return format!("HTTP {}", status);
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::String(s)) if !s.is_empty() => s,
        Ok(serde_json::Value::Object(map)) => ["message", "error", "title"]
            .iter()
            .find_map(|key| map.get(*key).and_then(|v| v.as_str()))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status)),
        Ok(_) => format!("HTTP {}", status),
        Err(_) => trimmed.to_string(),
    }
}
