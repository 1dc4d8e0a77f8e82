//! Kanji OCR Core Library
//!
//! This crate provides the domain models, error types and configuration shared
//! by the API server, the providers and the client.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, ProviderLimits, ServerConfig, UploadConfig};
pub use error::{AppError, ErrorMetadata, LogLevel, ProviderError};
