//! Upload pipeline: validate, stage on disk, recognize, shape the response.

use bytes::Bytes;
use kanji_core::models::UploadResponse;
use kanji_core::AppError;
use kanji_processing::{UploadScratch, UploadValidator};
use kanji_providers::{OcrImage, ProviderRegistry};
use std::time::Instant;

use crate::utils::upload::sanitize_filename;

/// An upload as received from the client, before any validation
#[derive(Debug, Clone)]
pub struct IncomingUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Orchestrates one upload from raw bytes to an OCR envelope
pub struct OcrPipeline<'a> {
    validator: &'a UploadValidator,
    scratch: &'a UploadScratch,
    providers: &'a ProviderRegistry,
}

impl<'a> OcrPipeline<'a> {
    pub fn new(
        validator: &'a UploadValidator,
        scratch: &'a UploadScratch,
        providers: &'a ProviderRegistry,
    ) -> Self {
        Self {
            validator,
            scratch,
            providers,
        }
    }

    /// Run the upload through every stage.
    ///
    /// The staged file is removed before this returns on every path. If the
    /// future is dropped mid-flight the guard removes it on drop instead.
    pub async fn process(&self, upload: IncomingUpload) -> Result<UploadResponse, AppError> {
        let started = Instant::now();

        let accepted = self.validator.validate(
            upload.filename.as_deref(),
            upload.content_type.as_deref(),
            upload.data.len(),
        )?;
        let format = self.validator.sniff(&accepted, &upload.data)?;

        let filename = sanitize_filename(upload.filename.as_deref().unwrap_or_default());
        tracing::debug!(
            filename = %filename,
            extension = %accepted.extension,
            format = ?format,
            size = upload.data.len(),
            "Upload accepted"
        );

        let stored = self.scratch.persist(&accepted.extension, upload.data).await?;

        let recognized = self
            .providers
            .recognize(OcrImage {
                path: stored.path(),
                bytes: stored.bytes(),
                extension: &accepted.extension,
            })
            .await;
        stored.discard();
        let ocr_results = recognized?;

        tracing::info!(
            filename = %filename,
            characters = ocr_results.characters.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Image processed"
        );

        let message = match (&ocr_results.note, ocr_results.characters.is_empty()) {
            (_, true) => "No text found in image".to_string(),
            (Some(_), false) => "Image processed successfully (using stub data)".to_string(),
            (None, false) => "Image processed successfully".to_string(),
        };

        Ok(UploadResponse {
            success: true,
            filename,
            ocr_results,
            message,
        })
    }
}
