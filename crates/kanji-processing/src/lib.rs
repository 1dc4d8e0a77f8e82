//! Upload validation and scoped scratch storage for the OCR pipeline.

pub mod scratch;
pub mod validator;

pub use scratch::{StoredUpload, UploadScratch};
pub use validator::{Accepted, UploadValidator, ValidationError};
