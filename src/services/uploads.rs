use crate::errors::ServiceError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Upload categories accepted by the service; anything else is rejected.
pub const ALLOWED_CATEGORIES: &[&str] = &["vehicles", "dealers", "documents"];

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "pdf"];

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoredFile {
    pub category: String,
    pub filename: String,
    pub path: String,
    pub size_bytes: u64,
}

/// Stores uploaded files on local disk under `<upload_dir>/<category>/`.
#[derive(Clone)]
pub struct UploadService {
    upload_dir: PathBuf,
}

impl UploadService {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    /// Validates `filename` is a bare name (no separators, no parent refs)
    /// with an allowed extension, returning the lowercase extension.
    fn checked_extension(filename: &str) -> Result<String, ServiceError> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(ServiceError::ValidationError(
                "Invalid file name".to_string(),
            ));
        }
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .ok_or_else(|| {
                ServiceError::ValidationError("File name has no extension".to_string())
            })?;
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ServiceError::ValidationError(format!(
                "Unsupported file type: .{}",
                extension
            )));
        }
        Ok(extension)
    }

    fn checked_category(category: &str) -> Result<(), ServiceError> {
        if ALLOWED_CATEGORIES.contains(&category) {
            Ok(())
        } else {
            Err(ServiceError::ValidationError(format!(
                "Unknown upload category: {}",
                category
            )))
        }
    }

    #[instrument(skip(self, data), fields(category = %category, original = %original_filename, bytes = data.len()))]
    pub async fn store(
        &self,
        category: &str,
        original_filename: &str,
        data: &[u8],
    ) -> Result<StoredFile, ServiceError> {
        Self::checked_category(category)?;
        let extension = Self::checked_extension(original_filename)?;
        if data.is_empty() {
            return Err(ServiceError::ValidationError(
                "Uploaded file is empty".to_string(),
            ));
        }

        let dir = self.upload_dir.join(category);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ServiceError::InternalError(format!("Failed to create upload dir: {}", e)))?;

        let filename = format!("{}.{}", Uuid::new_v4().simple(), extension);
        let path = dir.join(&filename);
        fs::write(&path, data)
            .await
            .map_err(|e| ServiceError::InternalError(format!("Failed to write file: {}", e)))?;

        info!(stored = %path.display(), "File stored");
        Ok(StoredFile {
            category: category.to_string(),
            filename,
            path: format!("{}/{}", category, path_file_name(&path)),
            size_bytes: data.len() as u64,
        })
    }

    #[instrument(skip(self), fields(category = %category, filename = %filename))]
    pub async fn delete(&self, category: &str, filename: &str) -> Result<(), ServiceError> {
        Self::checked_category(category)?;
        Self::checked_extension(filename)?;

        let path = self.upload_dir.join(category).join(filename);
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!(deleted = %path.display(), "File deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ServiceError::NotFound("File not found".to_string()))
            }
            Err(e) => Err(ServiceError::InternalError(format!(
                "Failed to delete file: {}",
                e
            ))),
        }
    }
}

fn path_file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn stores_and_deletes_a_file() {
        let dir = tempdir().unwrap();
        let service = UploadService::new(dir.path());

        let stored = service
            .store("vehicles", "front.jpg", b"not really a jpeg")
            .await
            .unwrap();
        assert_eq!(stored.category, "vehicles");
        assert!(stored.filename.ends_with(".jpg"));
        assert!(dir.path().join("vehicles").join(&stored.filename).exists());

        service.delete("vehicles", &stored.filename).await.unwrap();
        assert!(!dir.path().join("vehicles").join(&stored.filename).exists());
    }

    #[tokio::test]
    async fn rejects_traversal_and_bad_categories() {
        let dir = tempdir().unwrap();
        let service = UploadService::new(dir.path());

        let result = service.store("vehicles", "../../etc/passwd.png", b"x").await;
        assert!(matches!(result, Err(ServiceError::ValidationError(_))));

        let result = service.store("secrets", "a.png", b"x").await;
        assert!(matches!(result, Err(ServiceError::ValidationError(_))));

        let result = service.delete("vehicles", "..\\escape.png").await;
        assert!(matches!(result, Err(ServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn rejects_unsupported_extensions_and_empty_payloads() {
        let dir = tempdir().unwrap();
        let service = UploadService::new(dir.path());

        let result = service.store("vehicles", "setup.exe", b"x").await;
        assert!(matches!(result, Err(ServiceError::ValidationError(_))));

        let result = service.store("vehicles", "front.jpg", b"").await;
        assert!(matches!(result, Err(ServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn delete_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let service = UploadService::new(dir.path());
        let result = service.delete("vehicles", "missing.png").await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
