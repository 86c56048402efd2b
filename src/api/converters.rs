//! Conversion functions from database models to API DTOs

use crate::api::dto::*;
use crate::config::AppConfig;
use crate::data::{Account, MediaAttachment, RelationWith};
use crate::service::{AccountCounts, TimelineItem};

/// Convert Account to AccountResponse
///
/// Counts are only filled in when `counts` is given.
pub fn account_to_response(
    account: &Account,
    counts: Option<AccountCounts>,
    config: &AppConfig,
) -> AccountResponse {
    AccountResponse {
        id: account.id,
        username: account.username.clone(),
        display_name: account
            .display_name
            .clone()
            .unwrap_or_else(|| account.username.clone()),
        note: account.note.clone().unwrap_or_default(),
        url: format!(
            "{}/v1/accounts/{}",
            config.server.base_url(),
            account.username
        ),
        avatar: account.avatar.clone(),
        header: account.header.clone(),
        created_at: account.created_at,
        followers_count: counts.map(|c| c.followers),
        following_count: counts.map(|c| c.following),
        statuses_count: counts.map(|c| c.statuses),
    }
}

/// Convert MediaAttachment to MediaAttachmentResponse
pub fn media_to_response(media: &MediaAttachment) -> MediaAttachmentResponse {
    MediaAttachmentResponse {
        id: media.id,
        media_type: media.media_type.clone(),
        url: media.url.clone(),
        description: media.description.clone(),
    }
}

/// Convert a hydrated status to StatusResponse
pub fn status_to_response(item: &TimelineItem, config: &AppConfig) -> StatusResponse {
    StatusResponse {
        id: item.status.id,
        url: format!("{}/v1/statuses/{}", config.server.base_url(), item.status.id),
        content: item.status.content.clone(),
        created_at: item.status.created_at,
        account: account_to_response(&item.account, None, config),
        media_attachments: item.media_attachments.iter().map(media_to_response).collect(),
    }
}

/// Build a relationship view of `target`
pub fn relationship_to_response(target: &Account, relation: RelationWith) -> RelationshipResponse {
    RelationshipResponse {
        id: target.id,
        username: target.username.clone(),
        relation,
    }
}
