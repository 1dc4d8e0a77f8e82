//! Provider contracts
//!
//! The pipeline depends only on these traits. Implementations report their own
//! failures as [`ProviderError`]; admission control and timeouts are applied
//! around them by [`crate::ProviderGate`], never inside.

use async_trait::async_trait;
use kanji_core::models::{DictionaryEntry, OcrResult};
use kanji_core::ProviderError;
use std::fmt::Debug;
use std::path::Path;

/// An accepted upload as handed to the OCR provider
///
/// Both the on-disk copy and the bytes are offered; engines that shell out can
/// use the path, in-process engines the bytes.
#[derive(Debug, Clone, Copy)]
pub struct OcrImage<'a> {
    pub path: &'a Path,
    pub bytes: &'a [u8],
    /// Lower-cased extension, already validated against the sniffed format
    pub extension: &'a str,
}

/// Turns image bytes into a transcription
#[async_trait]
pub trait OcrProvider: Send + Sync + Debug {
    /// Provider name used in logs and error messages
    fn name(&self) -> &str;

    /// Recognize the characters in `image`.
    ///
    /// `characters` must be in reading order. An image with no text is a
    /// successful result with no characters, not an error.
    async fn recognize(&self, image: OcrImage<'_>) -> Result<OcrResult, ProviderError>;
}

/// Character to lexical data
#[async_trait]
pub trait DictionaryProvider: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Look up a single character. `Ok(None)` means the provider does not know it.
    async fn lookup(&self, character: &str) -> Result<Option<DictionaryEntry>, ProviderError>;
}

/// Language-partner responder behind the chat endpoint
#[async_trait]
pub trait ChatResponder: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Answer one message. No conversation history is carried between calls.
    async fn respond(&self, message: &str) -> Result<String, ProviderError>;
}
