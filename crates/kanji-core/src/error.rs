//! Error types module
//!
//! All server-side failures are unified under `AppError`. Each variant
//! self-describes its HTTP presentation through `ErrorMetadata`, so the API layer
//! can turn any error into the uniform `{success: false, error}` envelope without
//! leaking internal detail.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like saturated providers
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "INVALID_FILE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether the internal message must never reach the client
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing file: {0}")]
    MissingFile(String),

    #[error("Invalid file: {0}")]
    InvalidFile(String),

    /// The `InvalidFile` case for uploads over the configured maximum; kept
    /// separate so it maps to 413.
    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid character: {0}")]
    InvalidCharacter(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// No route matches the request path.
    #[error("No route: {0}")]
    RouteNotFound(String),

    #[error("Message must not be empty")]
    EmptyMessage,

    #[error("{provider} provider failure: {message}")]
    ProviderFailure { provider: String, message: String },

    #[error("{provider} provider timed out after {timeout_ms} ms")]
    ProviderTimeout { provider: String, timeout_ms: u64 },

    #[error("{provider} provider is at capacity")]
    ProviderBusy { provider: String },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Failures reported by an external collaborator (OCR, dictionary, chat) or by
/// the gate that wraps it.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} provider failed: {message}")]
    Failed { provider: String, message: String },

    #[error("{provider} provider broke its contract: {message}")]
    ContractViolation { provider: String, message: String },

    #[error("{provider} provider timed out after {timeout_ms} ms")]
    Timeout { provider: String, timeout_ms: u64 },

    #[error("{provider} provider is at capacity")]
    Busy { provider: String },
}

impl ProviderError {
    pub fn failed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Failed {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn contract(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::ContractViolation {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Failed { provider, message }
            | ProviderError::ContractViolation { provider, message } => {
                AppError::ProviderFailure { provider, message }
            }
            ProviderError::Timeout {
                provider,
                timeout_ms,
            } => AppError::ProviderTimeout {
                provider,
                timeout_ms,
            },
            ProviderError::Busy { provider } => AppError::ProviderBusy { provider },
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::MissingFile(_) => (400, "MISSING_FILE", false, false, LogLevel::Debug),
        AppError::InvalidFile(_) => (400, "INVALID_FILE", false, false, LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (413, "FILE_TOO_LARGE", false, false, LogLevel::Debug),
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, false, LogLevel::Debug),
        AppError::InvalidCharacter(_) => {
            (400, "INVALID_CHARACTER", false, false, LogLevel::Debug)
        }
        AppError::NotFound(_) => (404, "NOT_FOUND", false, false, LogLevel::Debug),
        AppError::RouteNotFound(_) => (404, "ROUTE_NOT_FOUND", false, false, LogLevel::Debug),
        AppError::EmptyMessage => (400, "EMPTY_MESSAGE", false, false, LogLevel::Debug),
        AppError::ProviderFailure { .. } => (500, "PROVIDER_FAILURE", true, true, LogLevel::Error),
        AppError::ProviderTimeout { .. } => (504, "PROVIDER_TIMEOUT", true, false, LogLevel::Warn),
        AppError::ProviderBusy { .. } => (503, "PROVIDER_BUSY", true, false, LogLevel::Warn),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => {
            (500, "INTERNAL_ERROR", true, true, LogLevel::Error)
        }
    }
}

impl AppError {
    /// Get the error type name for logging
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::MissingFile(_) => "MissingFile",
            AppError::InvalidFile(_) => "InvalidFile",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::InvalidCharacter(_) => "InvalidCharacter",
            AppError::NotFound(_) => "NotFound",
            AppError::RouteNotFound(_) => "RouteNotFound",
            AppError::EmptyMessage => "EmptyMessage",
            AppError::ProviderFailure { .. } => "ProviderFailure",
            AppError::ProviderTimeout { .. } => "ProviderTimeout",
            AppError::ProviderBusy { .. } => "ProviderBusy",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::MissingFile(ref msg) => msg.clone(),
            AppError::InvalidFile(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::InvalidCharacter(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::RouteNotFound(ref msg) => msg.clone(),
            AppError::EmptyMessage => "Message must not be empty".to_string(),
            AppError::ProviderFailure { provider, .. } => {
                format!("Failed to process request ({} unavailable)", provider)
            }
            AppError::ProviderTimeout { provider, .. } => {
                format!("The {} service took too long to respond", provider)
            }
            AppError::ProviderBusy { provider } => {
                format!("The {} service is busy, please retry shortly", provider)
            }
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("not found".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "not found");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_route_miss_has_its_own_code() {
        let err = AppError::RouteNotFound("No route for GET /api/nope".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "ROUTE_NOT_FOUND");
        assert_ne!(err.error_code(), AppError::NotFound(String::new()).error_code());
    }

    #[test]
    fn test_error_metadata_payload_too_large() {
        let err = AppError::PayloadTooLarge("20971520 bytes exceeds max".to_string());
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_code(), "FILE_TOO_LARGE");
        assert!(err.client_message().contains("20971520"));
    }

    #[test]
    fn test_provider_failure_hides_internal_message() {
        let err = AppError::from(ProviderError::failed("ocr", "segfault in engine at 0xdead"));
        assert_eq!(err.http_status_code(), 500);
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("0xdead"));
        assert!(err.detailed_message().contains("0xdead"));
    }

    #[test]
    fn test_contract_violation_maps_to_provider_failure() {
        let err = AppError::from(ProviderError::contract("ocr", "confidence 1.7"));
        assert_eq!(err.error_code(), "PROVIDER_FAILURE");
    }

    #[test]
    fn test_provider_timeout_and_busy_are_recoverable() {
        let timeout = AppError::from(ProviderError::Timeout {
            provider: "ocr".to_string(),
            timeout_ms: 30_000,
        });
        assert_eq!(timeout.http_status_code(), 504);
        assert!(timeout.is_recoverable());
        assert_eq!(timeout.log_level(), LogLevel::Warn);

        let busy = AppError::from(ProviderError::Busy {
            provider: "ocr".to_string(),
        });
        assert_eq!(busy.http_status_code(), 503);
        assert!(busy.is_recoverable());
    }

    #[test]
    fn test_empty_message_metadata() {
        let err = AppError::EmptyMessage;
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "EMPTY_MESSAGE");
        assert_eq!(err.client_message(), "Message must not be empty");
    }

    #[test]
    fn test_internal_error_is_sensitive() {
        let err = AppError::from(anyhow::anyhow!("disk on fire"));
        assert_eq!(err.http_status_code(), 500);
        assert!(err.is_sensitive());
        assert_eq!(err.client_message(), "Internal server error");
    }
}
