//! Error types for the session layer.

use boxoffice_client::Error as ClientError;

/// A credential that cannot be structurally decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedCredential {
    /// Not three non-empty dot-separated segments.
    #[error("credential is not a three-part token")]
    Shape,

    /// Payload segment is not base64url.
    #[error("credential payload is not base64url: {0}")]
    Encoding(String),

    /// Payload is not a JSON object.
    #[error("credential payload is not valid JSON: {0}")]
    Json(String),
}

/// Persisted storage failure.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error at '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The backing file is not a JSON object of strings.
    #[error("storage file '{path}' is corrupt: {message}")]
    Corrupt { path: String, message: String },
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Why a login or registration did not establish a session.
///
/// In every case the session is left exactly as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The identity service refused the request.
    #[error("{message}")]
    Rejected {
        /// HTTP status, when the backend answered at all.
        status: Option<u16>,
        /// Backend-supplied message, or a generic fallback.
        message: String,
    },

    /// The identity service could not be reached.
    #[error("{message}")]
    Unreachable { message: String },

    /// The identity service returned a credential that does not decode and no
    /// user object to fall back on.
    #[error("identity service returned an unusable credential: {0}")]
    MalformedCredential(#[from] MalformedCredential),

    /// The credential could not be persisted.
    #[error("could not store credential: {0}")]
    Storage(#[from] StorageError),

    /// The credential could not be attached to outgoing requests.
    #[error("could not arm service clients: {0}")]
    Arm(String),
}

/// Error returned by [`AuthGateway::login`](crate::AuthGateway::login).
pub type LoginError = AuthError;

/// Error returned by [`AuthGateway::register`](crate::AuthGateway::register).
pub type RegisterError = AuthError;

impl AuthError {
    /// Message suitable for showing inline in a form.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Translate a client failure into an auth failure, using `fallback` when
    /// the backend gave no usable message.
    pub(crate) fn from_client(err: ClientError, fallback: &str) -> Self {
        match err {
            ClientError::Service { status, message } => AuthError::Rejected {
                status: Some(status),
                message: if message.is_empty() || message == format!("HTTP {}", status) {
                    fallback.to_string()
                } else {
                    message
                },
            },
            ClientError::Network(_) => AuthError::Unreachable {
                message: fallback.to_string(),
            },
            other => AuthError::Rejected {
                status: None,
                message: format!("{}: {}", fallback, other),
            },
        }
    }
}
