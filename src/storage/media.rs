//! Media storage on the local filesystem
//!
//! Handles upload, delete, and URL generation for uploaded images.
//! Files are served by the router under the configured public URL.

use std::path::{Component, Path, PathBuf};

use crate::data::{EntityId, ImageRef};
use crate::error::AppError;

/// An uploaded file as received from a multipart form
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Media storage service
///
/// Writes images below `root` and returns references whose URL is
/// `public_url/public_id`.
pub struct MediaStorage {
    /// Directory files are written to
    root: PathBuf,
    /// Public URL base, e.g. "/media" or "https://media.example.com"
    public_url: String,
}

impl MediaStorage {
    /// Create new media storage rooted at the configured directory
    ///
    /// # Errors
    /// Returns error if the directory cannot be created
    pub async fn new(config: &crate::config::MediaStorageConfig) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(&config.path)
            .await
            .map_err(|e| AppError::Storage(format!("Media directory unavailable: {}", e)))?;

        Ok(Self {
            root: config.path.clone(),
            public_url: config.public_url.trim_end_matches('/').to_string(),
        })
    }

    /// Directory the store writes to
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store file contents under `key`
    ///
    /// # Returns
    /// Reference holding the key and its public URL
    pub async fn upload(&self, key: &str, data: &[u8]) -> Result<ImageRef, AppError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Media upload failed: {}", e)))?;
        }
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Media upload failed: {}", e)))?;

        tracing::debug!(key = %key, bytes = data.len(), "Stored media file");

        Ok(ImageRef {
            public_id: key.to_string(),
            url: self.get_public_url(key),
        })
    }

    /// Upload a post image
    ///
    /// Stores in posts/ prefix.
    pub async fn upload_post_image(&self, file: &Upload) -> Result<ImageRef, AppError> {
        let key = format!(
            "posts/{}.{}",
            EntityId::new().0,
            extension_for(file.content_type.as_deref())
        );
        self.upload(&key, &file.bytes).await
    }

    /// Upload a profile picture
    ///
    /// Stores in avatars/ prefix.
    pub async fn upload_avatar(&self, file: &Upload) -> Result<ImageRef, AppError> {
        let key = format!(
            "avatars/{}.{}",
            EntityId::new().0,
            extension_for(file.content_type.as_deref())
        );
        self.upload(&key, &file.bytes).await
    }

    /// Delete media file
    ///
    /// A file that is already gone counts as deleted.
    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(key = %key, "Media file already removed");
                Ok(())
            }
            Err(e) => Err(AppError::Storage(format!("Media delete failed: {}", e))),
        }
    }

    /// Get public URL for a key
    pub fn get_public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(key);
        let safe = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if key.is_empty() || !safe {
            return Err(AppError::Storage(format!("Invalid media key: {}", key)));
        }
        Ok(self.root.join(relative))
    }
}

fn extension_for(content_type: Option<&str>) -> &'static str {
    match content_type {
        Some("image/jpeg") => "jpg",
        Some("image/png") => "png",
        Some("image/webp") => "webp",
        Some("image/gif") => "gif",
        _ => "bin",
    }
}
