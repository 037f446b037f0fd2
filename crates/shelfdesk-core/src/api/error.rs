use reqwest::StatusCode;
use thiserror::Error;

use crate::models::Payload;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not logged in")]
    MissingCredential,

    #[error("Status {status}: {}", status_body(.payload))]
    Status { status: StatusCode, payload: Payload },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

fn status_body(payload: &Payload) -> String {
    ApiError::truncate_body(&payload.to_display())
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

    pub fn from_status(status: StatusCode, payload: Payload) -> Self {
        ApiError::Status { status, payload }
    }

    /// HTTP status of a server-side failure, if this is one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}
