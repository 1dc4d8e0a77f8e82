//! Kanji OCR API Library
//!
//! HTTP handlers, middleware and application setup for the OCR backend.

mod api_doc;
pub mod constants;
mod handlers;
mod middleware;
mod services;
pub mod setup;
pub mod telemetry;
mod utils;

pub mod error;
pub mod state;

pub use error::HttpAppError;
pub use services::ocr_pipeline::{IncomingUpload, OcrPipeline};
pub use state::AppState;
