//! API-wide constants

/// Prefix of every JSON endpoint except `/health`
pub const API_PREFIX: &str = "/api";

/// Service name reported by `/health`
pub const SERVICE_NAME: &str = "kanji-ocr-api";

pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Multipart form field carrying the image
pub const UPLOAD_FIELD: &str = "image";
