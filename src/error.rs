use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised while handling a chat request
#[derive(Error, Debug)]
pub enum HeartrestError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Completion provider rate limited: {0}")]
    RateLimited(String),

    #[error("Upstream provider error: {0}")]
    Upstream(String),

    /// Never surfaces to the user; the prompt builder swallows it.
    #[error("Search unavailable: {0}")]
    SearchUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HeartrestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HeartrestError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            HeartrestError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, HeartrestError>;
