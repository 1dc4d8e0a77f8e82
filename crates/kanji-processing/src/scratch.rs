//! Scoped scratch storage for uploads in flight.
//!
//! Each upload is written to its own uniquely named file inside the upload
//! directory. The file lives exactly as long as its `StoredUpload` guard: it is
//! removed when the guard drops, whether the request succeeded, failed, timed
//! out, or was cancelled by a client disconnect.

use bytes::Bytes;
use kanji_core::AppError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Prefix shared by every scratch file, used by the orphan sweep
const SCRATCH_PREFIX: &str = "upload-";

/// Directory that holds uploads while the OCR provider works on them
#[derive(Debug, Clone)]
pub struct UploadScratch {
    dir: PathBuf,
}

impl UploadScratch {
    /// Create the directory if needed.
    pub async fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the upload to a fresh, collision-free file.
    pub async fn persist(&self, extension: &str, data: Bytes) -> Result<StoredUpload, AppError> {
        let dir = self.dir.clone();
        let prefix = format!("{}{}_", SCRATCH_PREFIX, Uuid::new_v4().simple());
        let suffix = format!(".{}", extension);
        let payload = data.clone();

        let file = tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
            let mut file = tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(&suffix)
                .tempfile_in(&dir)?;
            file.write_all(&payload)?;
            file.flush()?;
            Ok(file)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Scratch write task failed: {}", e)))??;

        tracing::debug!(
            path = %file.path().display(),
            size = data.len(),
            "Upload written to scratch storage"
        );

        Ok(StoredUpload { file, data })
    }

    /// Remove scratch files older than `max_age`.
    ///
    /// Guards clean up after themselves; this only catches files orphaned by a
    /// process that died mid-request.
    pub async fn sweep_orphans(&self, max_age: Duration) -> std::io::Result<usize> {
        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let now = SystemTime::now();

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if !name.to_string_lossy().starts_with(SCRATCH_PREFIX) {
                continue;
            }
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let age = metadata
                .modified()
                .ok()
                .and_then(|m| now.duration_since(m).ok())
                .unwrap_or_default();
            if age >= max_age {
                match tokio::fs::remove_file(entry.path()).await {
                    Ok(()) => removed += 1,
                    Err(e) => tracing::warn!(
                        error = %e,
                        path = %entry.path().display(),
                        "Failed to remove orphaned upload"
                    ),
                }
            }
        }

        if removed > 0 {
            tracing::info!(removed, dir = %self.dir.display(), "Removed orphaned uploads");
        }
        Ok(removed)
    }
}

/// An upload on disk, deleted when dropped
#[derive(Debug)]
pub struct StoredUpload {
    file: NamedTempFile,
    data: Bytes,
}

impl StoredUpload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Delete the file now, reporting failures instead of swallowing them like `Drop` does.
    pub fn discard(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            tracing::warn!(error = %e, path = %path.display(), "Failed to remove scratch upload");
        }
    }
}
