use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::auth::ValidationError;

/// Status-level failures returned by the enrollment API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unprocessable content: {0}")]
    Unprocessable(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the human-readable message out of an error body.
    /// The server answers `{"detail": ...}` for most failures.
    pub fn detail(body: &str) -> String {
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
            match parsed.detail {
                Some(serde_json::Value::String(s)) => return Self::truncate_body(&s),
                Some(other) => return Self::truncate_body(&other.to_string()),
                None => {}
            }
            if let Some(message) = parsed.message {
                return Self::truncate_body(&message);
            }
        }
        Self::truncate_body(body)
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = Self::detail(body);
        match status.as_u16() {
            400 => ApiError::BadRequest(detail),
            401 => ApiError::Unauthorized(detail),
            403 => ApiError::AccessDenied(detail),
            404 => ApiError::NotFound(detail),
            422 => ApiError::Unprocessable(detail),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(detail),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, detail)),
        }
    }
}

/// Why the session could not be established or renewed.
///
/// Cloneable so every caller joined on one refresh episode receives the
/// same outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Rejected by server ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Authentication service unreachable: {0}")]
    Unreachable(String),

    #[error("No access token in response")]
    MissingToken,

    #[error("Malformed token response: {0}")]
    Malformed(String),

    #[error("Session refresh timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Session refresh task aborted: {0}")]
    Aborted(String),
}

/// Errors surfaced to callers of the session manager and API client.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Authentication failed: {0}")]
    Authentication(#[from] AuthenticationError),

    #[error("Network error: {0}")]
    TransientNetwork(#[from] reqwest::Error),

    #[error("Request was still unauthorized after refreshing the session")]
    AuthorizationRetryExhausted,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SessionError {
    /// Whether the caller has lost its session and must sign in again.
    pub fn requires_sign_in(&self) -> bool {
        matches!(
            self,
            SessionError::Authentication(_) | SessionError::AuthorizationRetryExhausted
        )
    }
}
