use std::fmt;

use reqwest::{Method, StatusCode};
use thiserror::Error;

use crate::utils::truncate_for_log;

/// Longest response body kept in a `RequestError` message.
const BODY_SNIPPET_LEN: usize = 512;

#[derive(Debug, Error)]
pub enum AppError {
    /// A required key was blank. Raised before any network call.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn validation(field: &str) -> Self {
        AppError::Validation(format!("{} must not be empty", field))
    }
}

/// A non-2xx upstream response other than 404.
#[derive(Debug, Clone)]
pub struct RequestError {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub body: String,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Request: '{}' failed. Status Code: {}. Reason Phrase: {}. Content: {}.",
            self.method,
            self.url,
            self.status.as_u16(),
            self.reason_phrase(),
            truncate_for_log(self.body.clone(), BODY_SNIPPET_LEN)
        )
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn reason_phrase(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Unknown")
    }
}

pub type AppResult<T> = Result<T, AppError>;
