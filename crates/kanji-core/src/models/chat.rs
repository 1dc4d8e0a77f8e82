use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// A missing field is treated like an empty message
    #[serde(default)]
    pub message: String,
}

/// Success envelope of `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
}

impl ChatResponse {
    pub fn new(response: String) -> Self {
        Self {
            success: true,
            response,
        }
    }
}
