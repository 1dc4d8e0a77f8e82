//! Domain methods for the Kanji OCR API client.
//!
//! Response types come from `kanji_core::models`; the server and the client
//! share one definition of every envelope.

use bytes::Bytes;
use kanji_core::models::{ChatRequest, ChatResponse, HealthResponse, LookupResponse, UploadResponse};
use std::path::{Component, Path};

use crate::{ApiClient, ClientError};

/// Multipart field the server reads the image from
pub const UPLOAD_FIELD: &str = "image";

/// Extensions the client treats as images when no content type is declared
const IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

/// A file the user picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content_type: Option<&str>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.map(str::to_string),
            data: data.into(),
        }
    }

    /// Read a local file; the content type is guessed from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(ClientError::File {
                path: path.display().to_string(),
                message: "parent directory components are not allowed".to_string(),
            });
        }

        let data = tokio::fs::read(path).await.map_err(|e| ClientError::File {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        let content_type = content_type_for(&name);

        Ok(Self {
            name,
            content_type: content_type.map(str::to_string),
            data: Bytes::from(data),
        })
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
    }

    /// Client-side MIME check.
    ///
    /// A declared content type decides on its own; without one the extension
    /// must be a known image extension.
    pub fn looks_like_image(&self) -> bool {
        match self.content_type.as_deref() {
            Some(ct) if !ct.trim().is_empty() => ct.trim().to_lowercase().starts_with("image/"),
            _ => self
                .extension()
                .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|(known, _)| *known == ext)),
        }
    }

    fn to_part(&self) -> Result<reqwest::multipart::Part, ClientError> {
        let part = reqwest::multipart::Part::bytes(self.data.to_vec()).file_name(self.name.clone());
        match self.content_type.as_deref() {
            Some(ct) => part
                .mime_str(ct)
                .map_err(|e| ClientError::Config(format!("Invalid content type '{}': {}", ct, e))),
            None => Ok(part),
        }
    }
}

fn content_type_for(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?.to_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, ct)| *ct)
}

impl ApiClient {
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get("/health").await
    }

    /// Upload an image for recognition.
    pub async fn upload(&self, file: &SelectedFile) -> Result<UploadResponse, ClientError> {
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, file.to_part()?);
        self.post_multipart("/api/upload", form).await
    }

    /// Upload an image from a local file path.
    pub async fn upload_path(&self, path: &Path) -> Result<UploadResponse, ClientError> {
        let file = SelectedFile::from_path(path).await?;
        self.upload(&file).await
    }

    /// Look up one character. A missing entry is a `Server` error with status 404.
    pub async fn lookup(&self, character: &str) -> Result<LookupResponse, ClientError> {
        self.get(&format!("/api/lookup/{}", urlencoding::encode(character)))
            .await
    }

    pub async fn chat(&self, message: &str) -> Result<ChatResponse, ClientError> {
        self.post_json(
            "/api/chat",
            &ChatRequest {
                message: message.to_string(),
            },
        )
        .await
    }
}
