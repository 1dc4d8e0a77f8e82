pub mod chat;
pub mod dictionary;
pub mod envelope;
pub mod ocr;

pub use chat::{ChatRequest, ChatResponse};
pub use dictionary::{DictionaryEntry, ExampleWord};
pub use envelope::{ErrorEnvelope, HealthResponse, LookupResponse, UploadResponse};
pub use ocr::{BoundingBox, OcrCharacterResult, OcrResult};
