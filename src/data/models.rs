//! Data models
//!
//! Rust structs representing database entities.
//! Rows use SQLite integer ids and chrono timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Account row id
pub type AccountId = i64;

/// Status row id
///
/// Assigned by the database at insert and strictly increasing, so it doubles
/// as the timeline cursor.
pub type StatusId = i64;

/// Media attachment row id
pub type MediaId = i64;

// =============================================================================
// Account
// =============================================================================

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    /// argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: Option<String>,
    pub note: Option<String>,
    /// Avatar image URL
    pub avatar: Option<String>,
    /// Header image URL
    pub header: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new account row
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Profile patch applied by an owner update
///
/// `None` leaves a column untouched; `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<Option<String>>,
    pub note: Option<Option<String>>,
    pub avatar: Option<Option<String>>,
    pub header: Option<Option<String>>,
}

impl ProfileUpdate {
    /// Whether the patch touches no column
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.note.is_none()
            && self.avatar.is_none()
            && self.header.is_none()
    }
}

// =============================================================================
// Status
// =============================================================================

/// A post
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Status {
    pub id: StatusId,
    pub account_id: AccountId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Media Attachment
// =============================================================================

/// Uploaded media file
///
/// The file itself lives in media storage; this row holds its metadata.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MediaAttachment {
    pub id: MediaId,
    /// Uploader, the only account allowed to attach it
    pub account_id: AccountId,
    /// Associated status ID (null if not yet attached)
    pub status_id: Option<StatusId>,
    /// "image" or "video"
    pub media_type: String,
    /// Key of the file inside media storage
    pub storage_key: String,
    pub url: String,
    /// Alt text description
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new media row
#[derive(Debug, Clone)]
pub struct NewMediaAttachment {
    pub account_id: AccountId,
    pub media_type: String,
    pub storage_key: String,
    pub url: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Relations
// =============================================================================

/// Two-sided follow state between a viewer and a target account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RelationWith {
    /// viewer -> target edge exists
    pub following: bool,
    /// target -> viewer edge exists
    pub followed_by: bool,
}
