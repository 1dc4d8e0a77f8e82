//! Multipart helpers for the upload handler

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::BytesMut;
use kanji_core::AppError;
use kanji_processing::ValidationError;

use crate::constants::UPLOAD_FIELD;
use crate::services::ocr_pipeline::IncomingUpload;

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body too large".to_string())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Extract the image part from a multipart form.
///
/// Exactly one field named `image` is accepted; other fields are ignored. The
/// file is read chunk by chunk and reading stops as soon as it exceeds
/// `max_size`, so oversized uploads are never fully buffered.
pub async fn extract_image_field(
    mut multipart: Multipart,
    max_size: usize,
) -> Result<IncomingUpload, AppError> {
    let mut upload: Option<IncomingUpload> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        if upload.is_some() {
            return Err(AppError::InvalidInput(format!(
                "Multiple '{}' fields are not allowed; send exactly one image",
                UPLOAD_FIELD
            )));
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);

        let mut data = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if data.len() + chunk.len() > max_size {
                tracing::debug!(
                    filename = ?filename,
                    max_size,
                    "Upload exceeds size limit, aborting read"
                );
                return Err(ValidationError::FileTooLarge {
                    size: data.len() + chunk.len(),
                    max: max_size,
                }
                .into());
            }
            data.extend_from_slice(&chunk);
        }

        upload = Some(IncomingUpload {
            filename,
            content_type,
            data: data.freeze(),
        });
    }

    upload.ok_or_else(|| AppError::MissingFile("No image file provided".to_string()))
}

/// Reduce a client-supplied filename to a safe display name.
///
/// Directory components are stripped and anything outside a conservative
/// character set becomes `_`.
pub fn sanitize_filename(filename: &str) -> String {
    const MAX_FILENAME_LENGTH: usize = 255;

    let filename_only = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let sanitized = sanitized.trim_start_matches('.').to_string();
    if sanitized.is_empty() {
        "upload".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd.png"), "passwd.png");
        assert_eq!(sanitize_filename("C:\\Users\\me\\scan.jpg"), "scan.jpg");
    }

    #[test]
    fn test_sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("my scan (1).png"), "my_scan__1_.png");
        assert_eq!(sanitize_filename("日本語.png"), "日本語.png");
    }

    #[test]
    fn test_sanitize_never_returns_hidden_or_empty() {
        assert_eq!(sanitize_filename(".hidden.png"), "hidden.png");
        assert_eq!(sanitize_filename("///"), "upload");
    }
}
