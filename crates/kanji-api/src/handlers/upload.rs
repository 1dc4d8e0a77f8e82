use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use kanji_core::models::{ErrorEnvelope, UploadResponse};
use kanji_core::AppError;

use crate::error::HttpAppError;
use crate::services::ocr_pipeline::OcrPipeline;
use crate::state::AppState;
use crate::utils::upload::extract_image_field;

/// Upload an image for OCR
///
/// Expects `multipart/form-data` with one file field named `image`. The file is
/// validated, staged in scratch storage for the duration of the OCR call and
/// removed again before the response is sent.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "ocr",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image processed", body = UploadResponse),
        (status = 400, description = "Missing or invalid file", body = ErrorEnvelope),
        (status = 413, description = "File too large", body = ErrorEnvelope),
        (status = 503, description = "OCR provider at capacity", body = ErrorEnvelope),
        (status = 504, description = "OCR provider timed out", body = ErrorEnvelope),
        (status = 500, description = "OCR provider failure", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_image"))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let multipart = multipart.map_err(|rejection| {
        tracing::debug!(rejection = %rejection, "Upload is not a multipart form");
        AppError::MissingFile("No image file provided".to_string())
    })?;

    let upload = extract_image_field(multipart, state.validator.max_file_size()).await?;

    let pipeline = OcrPipeline::new(&state.validator, &state.scratch, &state.providers);
    let response = pipeline.process(upload).await?;

    Ok(Json(response))
}
