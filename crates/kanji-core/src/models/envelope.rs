//! Wire envelopes shared by the server and the client.
//!
//! Every endpoint answers `{success: true, ...}` or `{success: false, error, code}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::dictionary::DictionaryEntry;
use super::ocr::OcrResult;

/// Success envelope of `POST /api/upload`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    /// Sanitized name of the uploaded file
    pub filename: String,
    pub ocr_results: OcrResult,
    pub message: String,
}

/// Success envelope of `GET /api/lookup/{character}`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LookupResponse {
    pub success: bool,
    pub kanji: String,
    pub data: DictionaryEntry,
}

/// Failure envelope returned by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    /// Machine-readable error code for programmatic handling
    #[serde(default)]
    pub code: String,
    /// Whether retrying the same request may succeed
    #[serde(default)]
    pub recoverable: bool,
    /// Error chain, only outside production and never for sensitive errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>, code: impl Into<String>, recoverable: bool) -> Self {
        Self {
            success: false,
            error: error.into(),
            code: code.into(),
            recoverable,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_shape() {
        let json = serde_json::to_value(ErrorEnvelope::new("not found", "NOT_FOUND", false))
            .expect("serialize");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "not found");
        assert_eq!(json["code"], "NOT_FOUND");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_error_envelope_tolerates_minimal_body() {
        let envelope: ErrorEnvelope =
            serde_json::from_str(r#"{"success":false,"error":"boom"}"#).unwrap();
        assert_eq!(envelope.error, "boom");
        assert!(envelope.code.is_empty());
    }
}
