//! API request and response DTOs
//!
//! Data Transfer Objects for the JSON API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{AccountId, MediaId, RelationWith, StatusId};

// =============================================================================
// Requests
// =============================================================================

/// POST /v1/accounts body
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountRequest {
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /v1/accounts/update_credentials body
///
/// Absent fields are left unchanged; blank fields are cleared.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCredentialsRequest {
    pub display_name: Option<String>,
    pub note: Option<String>,
    pub avatar: Option<String>,
    pub header: Option<String>,
}

/// POST /v1/statuses body
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStatusRequest {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub media_ids: Vec<MediaId>,
}

/// `?limit=` for follower/following lists
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

/// `?username=a,b` for relationship lookups
#[derive(Debug, Default, Deserialize)]
pub struct RelationshipsQuery {
    #[serde(default)]
    pub username: String,
}

// =============================================================================
// Responses
// =============================================================================

/// Account response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: AccountId,
    pub username: String,
    pub display_name: String,
    pub note: String,
    pub url: String,
    pub avatar: Option<String>,
    pub header: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Only present on single-account views
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub following_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statuses_count: Option<i64>,
}

/// Status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub id: StatusId,
    pub url: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub account: AccountResponse,
    pub media_attachments: Vec<MediaAttachmentResponse>,
}

/// Media attachment response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAttachmentResponse {
    pub id: MediaId,
    #[serde(rename = "type")]
    pub media_type: String,
    pub url: String,
    pub description: Option<String>,
}

/// Follow state between the requester and one account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipResponse {
    pub id: AccountId,
    pub username: String,
    #[serde(flatten)]
    pub relation: RelationWith,
}
