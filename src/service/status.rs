//! Status service
//!
//! Posting, fetching and deleting statuses, and media uploads that
//! statuses attach to.

use std::sync::Arc;

use crate::data::{Account, Database, MediaAttachment, MediaId, NewMediaAttachment, StatusId};
use crate::error::AppError;
use crate::metrics::{MEDIA_BYTES_UPLOADED, MEDIA_UPLOADS_TOTAL, STATUSES_CREATED_TOTAL};
use crate::service::timeline::{TimelineItem, hydrate};
use crate::storage::MediaStorage;

/// Maximum image upload size
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Maximum video upload size
pub const MAX_VIDEO_BYTES: usize = 40 * 1024 * 1024;

/// Maximum media attachments per status
pub const MAX_MEDIA_PER_STATUS: usize = 4;

/// Media category derived from a MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Unknown,
}

impl MediaKind {
    /// Classify by the top-level MIME type
    pub fn from_content_type(content_type: &str) -> Self {
        match content_type.split('/').next() {
            Some("image") => MediaKind::Image,
            Some("video") => MediaKind::Video,
            _ => MediaKind::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Unknown => "unknown",
        }
    }

    fn max_bytes(self) -> Option<usize> {
        match self {
            MediaKind::Image => Some(MAX_IMAGE_BYTES),
            MediaKind::Video => Some(MAX_VIDEO_BYTES),
            MediaKind::Unknown => None,
        }
    }
}

/// Status service
pub struct StatusService {
    db: Arc<Database>,
    storage: Arc<MediaStorage>,
}

impl StatusService {
    /// Create new status service
    pub fn new(db: Arc<Database>, storage: Arc<MediaStorage>) -> Self {
        Self { db, storage }
    }

    /// Post a status, attaching previously uploaded media
    ///
    /// # Arguments
    /// * `account` - Author
    /// * `content` - Status text
    /// * `media_ids` - Unattached media owned by `account`
    ///
    /// # Errors
    /// `Validation` if the status is empty or any media id cannot be
    /// attached. Nothing is stored in that case.
    pub async fn create(
        &self,
        account: &Account,
        content: &str,
        media_ids: &[MediaId],
    ) -> Result<TimelineItem, AppError> {
        if content.trim().is_empty() && media_ids.is_empty() {
            return Err(AppError::Validation(
                "status must have content or media".to_string(),
            ));
        }

        if media_ids.len() > MAX_MEDIA_PER_STATUS {
            return Err(AppError::Validation(format!(
                "at most {} media attachments are allowed",
                MAX_MEDIA_PER_STATUS
            )));
        }

        let mut unique_ids = media_ids.to_vec();
        unique_ids.sort_unstable();
        unique_ids.dedup();
        if unique_ids.len() != media_ids.len() {
            return Err(AppError::Validation(
                "duplicate media attachment ids".to_string(),
            ));
        }

        let status = self
            .db
            .insert_status_with_media(account.id, content, media_ids)
            .await?;

        STATUSES_CREATED_TOTAL.inc();
        tracing::info!(
            status_id = status.id,
            account_id = account.id,
            media = media_ids.len(),
            "Status created"
        );

        self.single(status.id).await?.ok_or(AppError::NotFound)
    }

    /// Fetch a status with its author and media
    ///
    /// # Returns
    /// `None` if the status does not exist
    pub async fn get(&self, id: StatusId) -> Result<Option<TimelineItem>, AppError> {
        self.single(id).await
    }

    /// Delete a status
    ///
    /// # Errors
    /// - `NotFound` if the status does not exist
    /// - `Forbidden` if `account` is not the author
    pub async fn delete(&self, account: &Account, id: StatusId) -> Result<(), AppError> {
        let status = self.db.get_status(id).await?.ok_or(AppError::NotFound)?;
        if status.account_id != account.id {
            return Err(AppError::Forbidden);
        }

        if !self.db.delete_status(id, account.id).await? {
            return Err(AppError::NotFound);
        }

        tracing::info!(status_id = id, account_id = account.id, "Status deleted");
        Ok(())
    }

    /// Store an uploaded file and record its metadata
    ///
    /// # Arguments
    /// * `account` - Uploader
    /// * `data` - File contents
    /// * `content_type` - MIME type of the upload
    /// * `description` - Optional alt text
    ///
    /// # Errors
    /// `Validation` for unsupported types, empty files, or files over the
    /// size limit of their kind
    pub async fn upload_media(
        &self,
        account: &Account,
        data: Vec<u8>,
        content_type: &str,
        description: Option<String>,
    ) -> Result<MediaAttachment, AppError> {
        let kind = MediaKind::from_content_type(content_type);
        let Some(max_bytes) = kind.max_bytes() else {
            return Err(AppError::Validation(format!(
                "unsupported media type: {}",
                content_type
            )));
        };

        if data.is_empty() {
            return Err(AppError::Validation("media file is empty".to_string()));
        }

        if data.len() > max_bytes {
            return Err(AppError::Validation(format!(
                "{} exceeds the {} byte limit",
                kind.as_str(),
                max_bytes
            )));
        }

        let size = data.len();
        let file_id = ulid::Ulid::new().to_string().to_lowercase();
        let (storage_key, url) = self
            .storage
            .upload_attachment(&file_id, data, content_type)
            .await?;

        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let inserted = self
            .db
            .insert_media(&NewMediaAttachment {
                account_id: account.id,
                media_type: kind.as_str().to_string(),
                storage_key: storage_key.clone(),
                url,
                description,
                created_at: chrono::Utc::now(),
            })
            .await;

        let media = match inserted {
            Ok(media) => media,
            Err(error) => {
                if let Err(cleanup) = self.storage.delete(&storage_key).await {
                    tracing::warn!(%cleanup, storage_key = %storage_key, "Failed to remove orphaned media file");
                }
                return Err(error);
            }
        };

        MEDIA_UPLOADS_TOTAL
            .with_label_values(&[kind.as_str()])
            .inc();
        MEDIA_BYTES_UPLOADED.inc_by(size as f64);
        tracing::info!(
            media_id = media.id,
            account_id = account.id,
            media_type = kind.as_str(),
            size,
            "Media uploaded"
        );

        Ok(media)
    }

    async fn single(&self, id: StatusId) -> Result<Option<TimelineItem>, AppError> {
        let Some(status) = self.db.get_status(id).await? else {
            return Ok(None);
        };
        Ok(hydrate(&self.db, vec![status]).await?.into_iter().next())
    }
}
