//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`. Anything that converts into
//! `AppError` converts into `HttpAppError` too, and renders as the uniform
//! `{success: false, error, code}` envelope with the status from
//! `ErrorMetadata`.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kanji_core::models::ErrorEnvelope;
use kanji_core::{AppError, ErrorMetadata, LogLevel, ProviderError};
use kanji_processing::ValidationError;
use serde::de::DeserializeOwned;

/// `AppError` as an axum response; `AppError` lives in kanji-core.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<ProviderError> for HttpAppError {
    fn from(err: ProviderError) -> Self {
        HttpAppError(err.into())
    }
}

/// Convert JSON body deserialization failures into our envelope.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return HttpAppError(AppError::PayloadTooLarge(
                "Request body too large".to_string(),
            ));
        }
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that answers with the error envelope on deserialization failure.
/// Use this instead of `Json<T>` so malformed bodies get the same shape as every other error.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Request rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error.detailed_message(),
                error_type = error_type,
                "Request failed"
            );
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

/// Build the failure envelope for `error`, hiding internals where required.
pub fn error_envelope(error: &AppError) -> ErrorEnvelope {
    let envelope = ErrorEnvelope::new(
        error.client_message(),
        error.error_code(),
        error.is_recoverable(),
    );
    if is_production_env() || error.is_sensitive() {
        envelope
    } else {
        envelope.with_details(error.detailed_message())
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        (status, Json(error_envelope(app_error))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_error_has_no_details() {
        let err = AppError::from(ProviderError::failed("ocr", "tesseract crashed: /opt/secret"));
        let envelope = error_envelope(&err);
        assert!(!envelope.success);
        assert_eq!(envelope.code, "PROVIDER_FAILURE");
        assert!(envelope.details.is_none());
        assert!(!envelope.error.contains("/opt/secret"));
    }

    #[test]
    fn test_validation_error_maps_to_status() {
        let too_large = HttpAppError::from(ValidationError::FileTooLarge { size: 10, max: 5 });
        assert_eq!(too_large.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);

        let bad_ext = HttpAppError::from(ValidationError::InvalidExtension {
            extension: "txt".to_string(),
            allowed: vec!["png".to_string()],
        });
        assert_eq!(bad_ext.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_provider_busy_is_service_unavailable() {
        let err = HttpAppError::from(ProviderError::Busy {
            provider: "ocr".to_string(),
        });
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
