use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use kanji_core::models::{ErrorEnvelope, LookupResponse};
use kanji_core::AppError;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Reduce the path segment to exactly one user-perceived character.
fn single_character(raw: &str) -> Result<&str, AppError> {
    let trimmed = raw.trim();
    let mut graphemes = trimmed.graphemes(true);
    match (graphemes.next(), graphemes.next()) {
        (None, _) => Err(AppError::InvalidCharacter(
            "No character provided".to_string(),
        )),
        (Some(_), Some(_)) => Err(AppError::InvalidCharacter(format!(
            "Expected a single character, got {} characters",
            trimmed.graphemes(true).count()
        ))),
        (Some(_), None) => Ok(trimmed),
    }
}

/// Look up dictionary data for one character
#[utoipa::path(
    get,
    path = "/api/lookup/{character}",
    tag = "dictionary",
    params(
        ("character" = String, Path, description = "A single character, percent-encoded")
    ),
    responses(
        (status = 200, description = "Dictionary entry", body = LookupResponse),
        (status = 400, description = "Empty, multi-character or undecodable input", body = ErrorEnvelope),
        (status = 404, description = "Character not in the dictionary", body = ErrorEnvelope),
        (status = 503, description = "Dictionary provider at capacity", body = ErrorEnvelope),
        (status = 504, description = "Dictionary provider timed out", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip(state, path), fields(operation = "lookup_kanji"))]
pub async fn lookup_kanji(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<LookupResponse>, HttpAppError> {
    let Path(character) = path.map_err(|rejection| {
        tracing::debug!(rejection = %rejection, "Lookup path is not a valid character");
        AppError::InvalidCharacter("Character must be valid percent-encoded UTF-8".to_string())
    })?;
    let kanji = single_character(&character)?;

    let entry = state.providers.lookup(kanji).await?.ok_or_else(|| {
        AppError::NotFound(format!("No dictionary entry for '{}'", kanji))
    })?;

    Ok(Json(LookupResponse {
        success: true,
        kanji: kanji.to_string(),
        data: entry,
    }))
}

/// `/api/lookup/` with nothing after the slash
pub async fn lookup_missing() -> HttpAppError {
    AppError::InvalidCharacter("No character provided".to_string()).into()
}
