//! Photo upload validation and the file storage collaborator.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid file name: {0}")]
    InvalidName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Persists uploaded bytes under a caller-chosen file name.
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<(), StorageError>;
}

/// Writes files into a single local directory, which is also served under `/uploads`.
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.starts_with('.') {
            return Err(StorageError::InvalidName(file_name.to_string()));
        }
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(file_name), bytes).await?;
        tracing::debug!(file = %file_name, bytes = bytes.len(), "Stored upload");
        Ok(())
    }
}

/// A file pulled out of a multipart request.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Checks MIME type and size. Failures are 400 upload errors, never storage errors.
pub fn validate_image(file: &UploadedFile, max_bytes: usize) -> Result<(), ApiError> {
    let is_image = file
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("image/"));
    if !is_image {
        return Err(ApiError::upload("Please upload an image file"));
    }
    if file.bytes.len() > max_bytes {
        return Err(ApiError::upload(format!(
            "Please upload an image less than {}",
            max_bytes
        )));
    }
    Ok(())
}

/// Deterministic stored name: `photo_<id><ext>`, keeping the original extension.
pub fn photo_file_name(bootcamp_id: Uuid, original_name: Option<&str>) -> String {
    let ext = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();
    format!("photo_{}{}", bootcamp_id, ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content_type: &str, len: usize) -> UploadedFile {
        UploadedFile {
            file_name: Some("campus.JPG".into()),
            content_type: Some(content_type.into()),
            bytes: vec![0; len],
        }
    }

    #[test]
    fn accepts_images_within_limit() {
        assert!(validate_image(&file("image/jpeg", 100), 100).is_ok());
    }

    #[test]
    fn rejects_non_images_and_oversized() {
        let err = validate_image(&file("application/pdf", 10), 100).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Please upload an image file");

        let err = validate_image(&file("image/png", 101), 100).unwrap_err();
        assert_eq!(err.message(), "Please upload an image less than 100");

        let mut missing = file("image/png", 1);
        missing.content_type = None;
        assert!(validate_image(&missing, 100).is_err());
    }

    #[test]
    fn photo_names_keep_extension() {
        let id = Uuid::new_v4();
        assert_eq!(photo_file_name(id, Some("campus.JPG")), format!("photo_{}.JPG", id));
        assert_eq!(photo_file_name(id, Some("noext")), format!("photo_{}", id));
        assert_eq!(photo_file_name(id, None), format!("photo_{}", id));
    }

    #[tokio::test]
    async fn local_storage_writes_and_rejects_traversal() {
        let dir = std::env::temp_dir().join(format!("uploads-{}", Uuid::new_v4()));
        let storage = LocalFileStorage::new(&dir);
        storage.store("photo_x.jpg", b"abc").await.unwrap();
        assert_eq!(std::fs::read(dir.join("photo_x.jpg")).unwrap(), b"abc");
        assert!(storage.store("../escape.jpg", b"x").await.is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
