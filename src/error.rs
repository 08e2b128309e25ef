// src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(&'static str),

    #[error("invalid address in env: {0}")]
    InvalidAddress(&'static str),

    #[error("invalid positive number in env: {0}")]
    InvalidNumber(&'static str),

    #[error("invalid date (expected YYYY-MM-DD) in env: {0}")]
    InvalidDate(&'static str),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for action={action}")]
    Status { status: u16, action: String },

    #[error("upstream NOTOK for action={action}: {message}")]
    Upstream { action: String, message: String },

    #[error("malformed payload for action={action}: {message}")]
    Decode { action: String, message: String },
}

#[derive(Debug, Error)]
#[error("unknown range: {0}")]
pub struct ParseRangeError(pub String);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid public key: {0}")]
    InvalidAddress(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}
