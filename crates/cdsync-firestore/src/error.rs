//! Firestore error types.

use thiserror::Error;

/// Result type for Firestore operations.
pub type FirestoreResult<T> = Result<T, FirestoreError>;

/// Errors that can occur during Firestore operations.
///
/// Everything except `InvalidCredentials`, `Json` and `SerializationError`
/// comes back from the service itself.
#[derive(Debug, Error)]
pub enum FirestoreError {
    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Server error {0}: {1}")]
    ServerError(u16, String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid service account credentials: {0}")]
    InvalidCredentials(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FirestoreError {
    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::AuthError(msg.into())
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn invalid_credentials(msg: impl Into<String>) -> Self {
        Self::InvalidCredentials(msg.into())
    }

    /// Map an HTTP error status onto the error taxonomy.
    pub fn from_http_status(status: u16, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        match status {
            401 => Self::AuthError(msg),
            403 => Self::PermissionDenied(msg),
            404 => Self::NotFound(msg),
            409 => Self::AlreadyExists(msg),
            412 => Self::PreconditionFailed(msg),
            429 => Self::RateLimited(msg),
            500..=599 => Self::ServerError(status, msg),
            _ => Self::RequestFailed(format!("HTTP {}: {}", status, msg)),
        }
    }

    /// True for errors raised by the remote service.
    ///
    /// Connection initialization retries these; local failures such as
    /// unparsable credentials propagate immediately.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            FirestoreError::InvalidCredentials(_)
                | FirestoreError::SerializationError(_)
                | FirestoreError::Json(_)
        )
    }

    /// HTTP status this error corresponds to, for metrics.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            FirestoreError::AuthError(_) => Some(401),
            FirestoreError::PermissionDenied(_) => Some(403),
            FirestoreError::NotFound(_) => Some(404),
            FirestoreError::AlreadyExists(_) => Some(409),
            FirestoreError::PreconditionFailed(_) => Some(412),
            FirestoreError::RateLimited(_) => Some(429),
            FirestoreError::ServerError(status, _) => Some(*status),
            FirestoreError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
