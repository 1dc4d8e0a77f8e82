use image::ImageFormat;
use kanji_core::{AppError, UploadConfig};
use std::path::Path;

/// Reasons an upload is rejected before any provider sees it
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid file type '{extension}'. Allowed: {}", .allowed.join(", "))]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid content type '{content_type}'. Allowed: {}", .allowed.join(", "))]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Content type '{content_type}' does not match extension '{extension}'")]
    ContentTypeMismatch {
        content_type: String,
        extension: String,
    },

    #[error("No file selected")]
    MissingFilename,

    #[error("Missing file extension (filename: {0})")]
    MissingExtension(String),

    #[error("File is empty")]
    EmptyFile,

    #[error("File content is not a recognized image")]
    UnrecognizedContent,

    #[error("File content is {detected} but the extension is '{extension}'")]
    ContentMismatch { detected: String, extension: String },
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            _ => AppError::InvalidFile(err.to_string()),
        }
    }
}

/// Metadata that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    /// Lower-cased extension without the leading dot
    pub extension: String,
}

/// Upload validator
///
/// Pure checks over upload metadata plus a magic-byte sniff of the content.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

const JPEG_TYPES: &[&str] = &["image/jpeg", "image/pjpeg"];
const PNG_TYPES: &[&str] = &["image/png"];
const GIF_TYPES: &[&str] = &["image/gif"];
const WEBP_TYPES: &[&str] = &["image/webp"];

/// Content types a browser may legitimately send for each image extension
fn expected_content_types(extension: &str) -> Option<&'static [&'static str]> {
    match extension {
        "jpg" | "jpeg" => Some(JPEG_TYPES),
        "png" => Some(PNG_TYPES),
        "gif" => Some(GIF_TYPES),
        "webp" => Some(WEBP_TYPES),
        _ => None,
    }
}

/// Image container expected behind each extension
fn expected_format(extension: &str) -> Option<ImageFormat> {
    match extension {
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "png" => Some(ImageFormat::Png),
        "gif" => Some(ImageFormat::Gif),
        "webp" => Some(ImageFormat::WebP),
        _ => None,
    }
}

/// Strip MIME parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg") and lower-case.
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

impl UploadValidator {
    pub fn new(
        max_file_size: usize,
        allowed_extensions: Vec<String>,
        allowed_content_types: Vec<String>,
    ) -> Self {
        Self {
            max_file_size,
            allowed_extensions,
            allowed_content_types,
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(
            config.max_file_size_bytes,
            config.allowed_extensions.clone(),
            config.allowed_content_types.clone(),
        )
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate filename and return its lower-cased extension
    pub fn validate_extension(&self, filename: Option<&str>) -> Result<String, ValidationError> {
        let filename = filename
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .ok_or(ValidationError::MissingFilename)?;

        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ValidationError::MissingExtension(filename.to_string()))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(extension)
    }

    /// Validate the declared content type, when the client sent a meaningful one.
    ///
    /// A missing or generic `application/octet-stream` type is left to the
    /// content sniff.
    pub fn validate_content_type(
        &self,
        content_type: Option<&str>,
        extension: &str,
    ) -> Result<(), ValidationError> {
        let Some(content_type) = content_type else {
            return Ok(());
        };
        let normalized = normalize_mime_type(content_type);
        if normalized.is_empty() || normalized == "application/octet-stream" {
            return Ok(());
        }

        if !self.allowed_content_types.iter().any(|ct| ct == &normalized) {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        // Prevent Content-Type spoofing: the declared type must agree with the extension.
        match expected_content_types(extension) {
            Some(expected) if !expected.contains(&normalized.as_str()) => {
                Err(ValidationError::ContentTypeMismatch {
                    content_type: content_type.to_string(),
                    extension: extension.to_string(),
                })
            }
            Some(_) => Ok(()),
            None => {
                tracing::debug!(
                    extension = %extension,
                    content_type = %content_type,
                    "Unknown extension, skipping Content-Type/extension cross-validation"
                );
                Ok(())
            }
        }
    }

    /// Validate all metadata of an upload. Does not read the content.
    pub fn validate(
        &self,
        filename: Option<&str>,
        content_type: Option<&str>,
        file_size: usize,
    ) -> Result<Accepted, ValidationError> {
        self.validate_file_size(file_size)?;
        let extension = self.validate_extension(filename)?;
        self.validate_content_type(content_type, &extension)?;
        Ok(Accepted { extension })
    }

    /// Inspect the magic bytes and make sure the content really is the image
    /// format its extension claims.
    pub fn sniff(&self, accepted: &Accepted, data: &[u8]) -> Result<ImageFormat, ValidationError> {
        let detected =
            image::guess_format(data).map_err(|_| ValidationError::UnrecognizedContent)?;

        match expected_format(&accepted.extension) {
            Some(expected) if expected != detected => Err(ValidationError::ContentMismatch {
                detected: format!("{:?}", detected).to_lowercase(),
                extension: accepted.extension.clone(),
            }),
            Some(_) => Ok(detected),
            None if matches!(
                detected,
                ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif | ImageFormat::WebP
            ) =>
            {
                Ok(detected)
            }
            None => Err(ValidationError::UnrecognizedContent),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x06\0\0\0";
    pub const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0\x01\x01\0\0\x01\0\x01\0\0";
    pub const GIF: &[u8] = b"GIF89a\x01\0\x01\0\x80\0\0\0\0\0\xff\xff\xff";
    pub const WEBP: &[u8] = b"RIFF\x1a\0\0\0WEBPVP8L\x0d\0\0\0\x2f\0\0\0\x10";
}

#[cfg(test)]
mod tests {
    use super::fixtures;
    use super::*;

    fn test_validator() -> UploadValidator {
        UploadValidator::from_config(&kanji_core::Config::default().upload)
    }

    #[test]
    fn test_validate_file_size_ok() {
        let validator = test_validator();
        assert!(validator.validate_file_size(2 * 1024 * 1024).is_ok());
        assert!(validator.validate_file_size(16 * 1024 * 1024).is_ok());
    }

    #[test]
    fn test_validate_file_size_too_large() {
        let validator = test_validator();
        assert!(matches!(
            validator.validate_file_size(16 * 1024 * 1024 + 1),
            Err(ValidationError::FileTooLarge { .. })
        ));
        assert!(validator.validate_file_size(20 * 1024 * 1024).is_err());
    }

    #[test]
    fn test_validate_file_size_empty() {
        let validator = test_validator();
        assert!(matches!(
            validator.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        ));
    }

    #[test]
    fn test_validate_extension_ok() {
        let validator = test_validator();
        for name in ["a.png", "a.jpg", "a.jpeg", "a.gif", "a.webp", "scan.PNG", "x.JpEg"] {
            assert!(validator.validate_extension(Some(name)).is_ok(), "{}", name);
        }
        assert_eq!(
            validator.validate_extension(Some("page.JPG")).unwrap(),
            "jpg"
        );
    }

    #[test]
    fn test_validate_extension_rejects_outside_allow_set() {
        let validator = test_validator();
        for name in ["notes.txt", "image.bmp", "image.png.exe", "archive.tar.gz"] {
            assert!(matches!(
                validator.validate_extension(Some(name)),
                Err(ValidationError::InvalidExtension { .. })
            ));
        }
    }

    #[test]
    fn test_validate_extension_missing_parts() {
        let validator = test_validator();
        assert!(matches!(
            validator.validate_extension(None),
            Err(ValidationError::MissingFilename)
        ));
        assert!(matches!(
            validator.validate_extension(Some("  ")),
            Err(ValidationError::MissingFilename)
        ));
        assert!(matches!(
            validator.validate_extension(Some("noextension")),
            Err(ValidationError::MissingExtension(_))
        ));
        assert!(matches!(
            validator.validate_extension(Some(".png")),
            Err(ValidationError::MissingExtension(_))
        ));
    }

    #[test]
    fn test_validate_content_type() {
        let validator = test_validator();
        assert!(validator.validate_content_type(Some("image/png"), "png").is_ok());
        assert!(validator
            .validate_content_type(Some("IMAGE/JPEG; charset=binary"), "jpg")
            .is_ok());
        assert!(validator.validate_content_type(None, "png").is_ok());
        assert!(validator
            .validate_content_type(Some("application/octet-stream"), "png")
            .is_ok());
        assert!(matches!(
            validator.validate_content_type(Some("text/plain"), "png"),
            Err(ValidationError::InvalidContentType { .. })
        ));
        assert!(matches!(
            validator.validate_content_type(Some("image/png"), "jpg"),
            Err(ValidationError::ContentTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_all() {
        let validator = test_validator();
        let accepted = validator
            .validate(Some("kanji.webp"), Some("image/webp"), 1024)
            .unwrap();
        assert_eq!(accepted.extension, "webp");

        assert!(validator
            .validate(Some("kanji.webp"), Some("image/webp"), 0)
            .is_err());
        assert!(validator
            .validate(Some("kanji.txt"), Some("text/plain"), 10)
            .is_err());
    }

    #[test]
    fn test_sniff_accepts_matching_content() {
        let validator = test_validator();
        let cases: [(&str, &[u8]); 5] = [
            ("png", fixtures::PNG),
            ("jpg", fixtures::JPEG),
            ("jpeg", fixtures::JPEG),
            ("gif", fixtures::GIF),
            ("webp", fixtures::WEBP),
        ];
        for (extension, data) in cases {
            let accepted = Accepted {
                extension: extension.to_string(),
            };
            assert!(validator.sniff(&accepted, data).is_ok(), "{}", extension);
        }
    }

    #[test]
    fn test_sniff_rejects_spoofed_content() {
        let validator = test_validator();
        let accepted = Accepted {
            extension: "png".to_string(),
        };
        assert!(matches!(
            validator.sniff(&accepted, b"hello, I am plain text"),
            Err(ValidationError::UnrecognizedContent)
        ));
        assert!(matches!(
            validator.sniff(&accepted, fixtures::JPEG),
            Err(ValidationError::ContentMismatch { .. })
        ));
    }

    #[test]
    fn test_into_app_error() {
        let err: AppError = ValidationError::FileTooLarge { size: 2, max: 1 }.into();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));

        let err: AppError = ValidationError::InvalidExtension {
            extension: "txt".to_string(),
            allowed: vec!["png".to_string(), "jpg".to_string()],
        }
        .into();
        match err {
            AppError::InvalidFile(msg) => {
                assert!(msg.contains("txt"));
                assert!(msg.contains("png, jpg"));
            }
            other => panic!("Expected InvalidFile, got {:?}", other),
        }
    }
}
