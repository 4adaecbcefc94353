//! Ticket backend error types.

use thiserror::Error;

/// Longest response body kept in a [`BackendError::Status`].
const MAX_BODY_CHARS: usize = 200;

/// Errors from calls to the ticket backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request did not complete within the configured timeout.
    #[error("Backend request timed out")]
    Timeout,

    /// The request could not be sent or the response could not be read.
    #[error("Backend transport error: {0}")]
    Transport(String),

    /// The backend rejected the session token (401).
    #[error("Backend rejected the session token")]
    Unauthorized,

    /// The backend rejected the email/password pair.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The backend answered with a non-success status.
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("Failed to decode backend response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Classify a reqwest error raised while sending or reading.
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }

    /// Classify a reqwest error raised while decoding a JSON body.
    pub(crate) fn from_decode(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Decode(err.to_string())
        }
    }

    /// A non-success status with its (truncated) body.
    pub(crate) fn status(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            body: body.chars().take(MAX_BODY_CHARS).collect(),
        }
    }

    /// Whether the session must be treated as signed out.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Whether the backend could not be reached at all.
    #[must_use]
    pub const fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Timeout | Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_body_is_truncated() {
        let long = "x".repeat(1000);
        let BackendError::Status { status, body } = BackendError::status(500, &long) else {
            panic!("expected status error");
        };
        assert_eq!(status, 500);
        assert_eq!(body.len(), MAX_BODY_CHARS);
    }

    #[test]
    fn test_classification() {
        assert!(BackendError::Unauthorized.is_unauthorized());
        assert!(BackendError::Timeout.is_connection_failure());
        assert!(BackendError::Transport("refused".to_string()).is_connection_failure());
        assert!(!BackendError::status(503, "").is_connection_failure());
        assert!(!BackendError::InvalidCredentials.is_unauthorized());
    }
}
