//! Media storage on the local filesystem
//!
//! Handles upload, delete, and URL generation for media files.
//! Files are written below a root directory and served from `public_url`.

use std::path::{Component, Path, PathBuf};

use crate::error::AppError;

/// Media storage service
///
/// Writes media files to disk and returns public URLs.
pub struct MediaStorage {
    /// Directory every key is resolved against
    root: PathBuf,
    /// Public URL base, without trailing slash
    /// e.g., "https://media.example.com"
    public_url: String,
}

impl MediaStorage {
    /// Create new media storage
    ///
    /// Creates the root directory if it is missing.
    ///
    /// # Errors
    /// Returns error if the root directory cannot be created
    pub async fn new(config: &crate::config::MediaStorageConfig) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(&config.root)
            .await
            .map_err(|e| {
                AppError::Storage(format!(
                    "failed to create media root {}: {}",
                    config.root.display(),
                    e
                ))
            })?;

        Ok(Self {
            root: config.root.clone(),
            public_url: config.public_url.trim_end_matches('/').to_string(),
        })
    }

    /// Store a media file
    ///
    /// # Arguments
    /// * `key` - Relative path for the file, e.g. "attachments/abc.png"
    /// * `data` - File contents
    ///
    /// # Returns
    /// Public URL for the stored file
    pub async fn upload(&self, key: &str, data: Vec<u8>) -> Result<String, AppError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("media upload failed: {}", e)))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("media upload failed: {}", e)))?;

        Ok(self.get_public_url(key))
    }

    /// Store status attachment
    ///
    /// Stores in attachments/ prefix.
    ///
    /// # Arguments
    /// * `id` - Unique identifier
    /// * `data` - File data
    /// * `content_type` - MIME type
    ///
    /// # Returns
    /// (storage key, public URL)
    pub async fn upload_attachment(
        &self,
        id: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(String, String), AppError> {
        let ext = match content_type {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "video/mp4" => "mp4",
            "video/webm" => "webm",
            _ => "bin",
        };

        let key = format!("attachments/{}.{}", id, ext);
        let url = self.upload(&key, data).await?;
        Ok((key, url))
    }

    /// Delete media file
    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.resolve(key)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| AppError::Storage(format!("media delete failed: {}", e)))?;

        Ok(())
    }

    /// Get public URL for a storage key
    pub fn get_public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }

    /// Absolute path for a key; keys may not escape the root
    fn resolve(&self, key: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(key);
        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)))
        {
            return Err(AppError::Storage(format!("invalid media key: {}", key)));
        }

        Ok(self.root.join(relative))
    }
}
