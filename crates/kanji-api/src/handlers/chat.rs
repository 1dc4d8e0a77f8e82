use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use kanji_core::models::{ChatRequest, ChatResponse, ErrorEnvelope};
use kanji_core::AppError;

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Send one message to the language partner
///
/// Stateless: every call is answered on its own, without history.
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Partner response", body = ChatResponse),
        (status = 400, description = "Empty, oversized or malformed message", body = ErrorEnvelope),
        (status = 503, description = "Chat responder at capacity", body = ErrorEnvelope),
        (status = 504, description = "Chat responder timed out", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "chat"))]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ChatRequest>,
) -> Result<Json<ChatResponse>, HttpAppError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::EmptyMessage.into());
    }

    let max_chars = state.config.chat_max_message_chars;
    let length = message.chars().count();
    if length > max_chars {
        return Err(AppError::InvalidInput(format!(
            "Message too long: {} characters (max: {})",
            length, max_chars
        ))
        .into());
    }

    let response = state.providers.respond(message).await?;
    tracing::debug!(message_chars = length, "Chat answered");

    Ok(Json(ChatResponse::new(response)))
}
