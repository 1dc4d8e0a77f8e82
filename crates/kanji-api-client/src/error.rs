//! Errors observed by the client

use kanji_core::models::ErrorEnvelope;
use thiserror::Error;

/// Everything that can go wrong between the client and the API.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with an error envelope (or a non-envelope error body).
    #[error("{message}")]
    Server {
        status: u16,
        code: String,
        message: String,
        recoverable: bool,
    },

    /// A 2xx response whose body did not match the expected shape.
    #[error("Unexpected response from server: {0}")]
    Decode(String),

    #[error("Failed to read {path}: {message}")]
    File { path: String, message: String },

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Build a server error from the response status and raw body.
    ///
    /// Bodies that are not an error envelope are kept verbatim as the message.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => ClientError::Server {
                status,
                code: envelope.code,
                message: envelope.error,
                recoverable: envelope.recoverable,
            },
            Err(_) => ClientError::Server {
                status,
                code: String::new(),
                message: if body.trim().is_empty() {
                    format!("Request failed with status {}", status)
                } else {
                    body.trim().to_string()
                },
                recoverable: status >= 500,
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// A 404 that means "no such dictionary entry" rather than a missing route.
    pub fn is_missing_entry(&self) -> bool {
        matches!(self, ClientError::Server { status: 404, code, .. } if code == "NOT_FOUND")
    }

    /// Whether trying the same request again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) => true,
            ClientError::Server { recoverable, .. } => *recoverable,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}
