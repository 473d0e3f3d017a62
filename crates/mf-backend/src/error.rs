//! Error types for backend access.

/// Error from content backend operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    HttpRequest(#[from] ureq::Error),

    /// The backend rejected the credential (missing, expired or wrong).
    #[error("backend rejected credentials (HTTP {status})")]
    Unauthorized {
        /// HTTP status code (401 or 403).
        status: u16,
    },

    /// Nothing exists at the requested location.
    #[error("not found: {0}")]
    NotFound(String),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Login succeeded at the HTTP level but no session cookie was set.
    #[error("login response did not set the '{0}' session cookie")]
    MissingSessionCookie(String),

    /// Reading a response body failed.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

impl BackendError {
    /// Whether this error is an authentication failure.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. } | Self::MissingSessionCookie(_)
        )
    }

    /// Whether this error means the requested resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Map an error status to the matching error variant.
    pub(crate) fn from_status(status: u16, location: &str, body: String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status },
            404 => Self::NotFound(location.to_owned()),
            _ => Self::HttpResponse { status, body },
        }
    }
}
