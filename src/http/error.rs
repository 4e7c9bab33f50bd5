//! Status-driven error classification for REST responses.

use reqwest::StatusCode;
use serde::Serialize;

/// Error returned when the server answers 429 (Too Many Requests) or
/// 403 (Forbidden).
///
/// Every other failure is reported as a plain `anyhow::Error`; this type
/// is the one callers are expected to `downcast_ref` when they want to
/// back off and retry on their own terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestLibError {
    /// Numeric HTTP status code.
    pub code: u16,
    /// Status line as received, e.g. `429 Too Many Requests`.
    #[serde(skip)]
    pub status: String,
}

impl RestLibError {
    /// Builds the error from a response status.
    pub fn from_status(status: StatusCode) -> Self {
        Self {
            code: status.as_u16(),
            status: status.to_string(),
        }
    }

    /// Returns true for 429 Too Many Requests.
    pub fn is_rate_limited(&self) -> bool {
        self.code == StatusCode::TOO_MANY_REQUESTS.as_u16()
    }

    /// Returns true for 403 Forbidden.
    pub fn is_forbidden(&self) -> bool {
        self.code == StatusCode::FORBIDDEN.as_u16()
    }
}

impl std::fmt::Display for RestLibError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.status)
    }
}

impl std::error::Error for RestLibError {}

/// Returns true for the statuses that map to [`RestLibError`].
pub fn is_distinguished_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::FORBIDDEN
}

/// Extracts the status code of a [`RestLibError`] anywhere in the error chain.
pub fn status_code(error: &anyhow::Error) -> Option<u16> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<RestLibError>())
        .map(|e| e.code)
}
