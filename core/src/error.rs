//! Error types for the board API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other unexpected statuses land in `HttpError` with the raw
//! status code and body. Nothing here is retried or recovered locally.

use crate::types::ErrorBody;

/// Errors returned by `BoardClient`, `Transport` implementations and `BoardApi`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request never produced a response (connect, TLS, timeout, ...).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The client configuration is invalid (bad env value, HTTP client build failure).
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status carried by this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server's `{"error": "..."}` message, when the body has one.
    pub fn server_message(&self) -> Option<String> {
        match self {
            ApiError::HttpError { body, .. } => serde_json::from_str::<ErrorBody>(body)
                .ok()
                .map(|b| b.error),
            _ => None,
        }
    }
}
