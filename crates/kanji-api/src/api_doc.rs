//! OpenAPI documentation, served at `/api/openapi.json` and browsable at `/docs`.

use utoipa::OpenApi;

use crate::handlers;
use kanji_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kanji OCR API",
        version = "0.1.0",
        description = "Upload a photo of Japanese text, get the recognized characters back, and look each one up in the dictionary. OCR, dictionary and chat are currently backed by stand-in providers returning fixed data."
    ),
    paths(
        handlers::health::health_check,
        handlers::upload::upload_image,
        handlers::lookup::lookup_kanji,
        handlers::chat::chat,
    ),
    components(schemas(
        models::UploadResponse,
        models::OcrResult,
        models::OcrCharacterResult,
        models::BoundingBox,
        models::LookupResponse,
        models::DictionaryEntry,
        models::ExampleWord,
        models::ChatRequest,
        models::ChatResponse,
        models::ErrorEnvelope,
        models::HealthResponse,
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "ocr", description = "Image upload and character recognition"),
        (name = "dictionary", description = "Character lookup"),
        (name = "chat", description = "Language partner")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_endpoint() {
        let doc = get_openapi_spec();
        for path in [
            "/health",
            "/api/upload",
            "/api/lookup/{character}",
            "/api/chat",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
