//! Timeline service
//!
//! Builds public and home timelines from the cursor window and hydrates
//! each status with its author and media.

use std::collections::HashMap;
use std::sync::Arc;

use crate::data::{Account, AccountId, Database, MediaAttachment, Status, StatusId};
use crate::error::AppError;
use crate::pagination::Parameters;

/// Status with everything needed to render it
#[derive(Debug, Clone)]
pub struct TimelineItem {
    pub status: Status,
    pub account: Account,
    pub media_attachments: Vec<MediaAttachment>,
}

/// Timeline service
pub struct TimelineService {
    db: Arc<Database>,
    home_includes_own_statuses: bool,
}

impl TimelineService {
    /// Create new timeline service
    ///
    /// # Arguments
    /// * `db` - Database handle
    /// * `home_includes_own_statuses` - Whether the home timeline also shows
    ///   the requester's own statuses
    pub fn new(db: Arc<Database>, home_includes_own_statuses: bool) -> Self {
        Self {
            db,
            home_includes_own_statuses,
        }
    }

    /// Public timeline: every status inside the window
    pub async fn public_timeline(&self, params: &Parameters) -> Result<Vec<TimelineItem>, AppError> {
        let statuses = self.db.get_public_timeline(params).await?;
        hydrate(&self.db, statuses).await
    }

    /// Home timeline for `account_id`
    ///
    /// Contains statuses by followed accounts, plus the account's own
    /// statuses when configured.
    pub async fn home_timeline(
        &self,
        account_id: AccountId,
        params: &Parameters,
    ) -> Result<Vec<TimelineItem>, AppError> {
        let statuses = self
            .db
            .get_home_timeline(account_id, params, self.home_includes_own_statuses)
            .await?;
        hydrate(&self.db, statuses).await
    }
}

/// Attach authors and media to statuses, preserving their order
///
/// Uses one query per entity kind regardless of page size.
pub async fn hydrate(db: &Database, statuses: Vec<Status>) -> Result<Vec<TimelineItem>, AppError> {
    if statuses.is_empty() {
        return Ok(vec![]);
    }

    let mut account_ids: Vec<AccountId> = statuses.iter().map(|s| s.account_id).collect();
    account_ids.sort_unstable();
    account_ids.dedup();
    let status_ids: Vec<StatusId> = statuses.iter().map(|s| s.id).collect();

    let accounts: HashMap<AccountId, Account> = db
        .get_accounts_by_ids(&account_ids)
        .await?
        .into_iter()
        .map(|account| (account.id, account))
        .collect();

    let mut media: HashMap<StatusId, Vec<MediaAttachment>> = HashMap::new();
    for attachment in db.get_media_by_status_ids(&status_ids).await? {
        if let Some(status_id) = attachment.status_id {
            media.entry(status_id).or_default().push(attachment);
        }
    }

    let mut items = Vec::with_capacity(statuses.len());
    for status in statuses {
        // An author row can only be missing if it was removed mid-request.
        let Some(account) = accounts.get(&status.account_id).cloned() else {
            tracing::warn!(status_id = status.id, "Skipping status without author");
            continue;
        };
        let media_attachments = media.remove(&status.id).unwrap_or_default();
        items.push(TimelineItem {
            status,
            account,
            media_attachments,
        });
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{NewAccount, NewMediaAttachment};
    use tempfile::TempDir;

    async fn setup() -> (Arc<Database>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::connect(&temp_dir.path().join("test.db"))
            .await
            .unwrap();
        (Arc::new(db), temp_dir)
    }

    async fn account(db: &Database, username: &str) -> Account {
        db.insert_account(&NewAccount {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            created_at: chrono::Utc::now(),
        })
        .await
        .unwrap()
    }

    fn ids(items: &[TimelineItem]) -> Vec<StatusId> {
        items.iter().map(|item| item.status.id).collect()
    }

    #[tokio::test]
    async fn public_timeline_hydrates_authors_and_media() {
        let (db, _temp_dir) = setup().await;
        let alice = account(&db, "alice").await;
        let bob = account(&db, "bob").await;

        let media = db
            .insert_media(&NewMediaAttachment {
                account_id: alice.id,
                media_type: "image".to_string(),
                storage_key: "attachments/a.png".to_string(),
                url: "http://media.test/attachments/a.png".to_string(),
                description: None,
                created_at: chrono::Utc::now(),
            })
            .await
            .unwrap();

        let first = db
            .insert_status_with_media(alice.id, "with picture", &[media.id])
            .await
            .unwrap();
        let second = db.insert_status(bob.id, "plain").await.unwrap();

        let service = TimelineService::new(db.clone(), true);
        let items = service
            .public_timeline(&Parameters::default())
            .await
            .unwrap();

        assert_eq!(ids(&items), vec![second.id, first.id]);
        assert_eq!(items[0].account.username, "bob");
        assert!(items[0].media_attachments.is_empty());
        assert_eq!(items[1].account.username, "alice");
        assert_eq!(items[1].media_attachments.len(), 1);
        assert_eq!(items[1].media_attachments[0].id, media.id);
    }

    #[tokio::test]
    async fn home_timeline_respects_own_status_setting() {
        let (db, _temp_dir) = setup().await;
        let alice = account(&db, "alice").await;
        let bob = account(&db, "bob").await;
        let carol = account(&db, "carol").await;

        db.insert_relation(alice.id, bob.id).await.unwrap();
        let own = db.insert_status(alice.id, "mine").await.unwrap();
        let followed = db.insert_status(bob.id, "followed").await.unwrap();
        db.insert_status(carol.id, "stranger").await.unwrap();

        let with_own = TimelineService::new(db.clone(), true)
            .home_timeline(alice.id, &Parameters::default())
            .await
            .unwrap();
        assert_eq!(ids(&with_own), vec![followed.id, own.id]);

        let without_own = TimelineService::new(db.clone(), false)
            .home_timeline(alice.id, &Parameters::default())
            .await
            .unwrap();
        assert_eq!(ids(&without_own), vec![followed.id]);
    }

    #[tokio::test]
    async fn hydrate_empty_page() {
        let (db, _temp_dir) = setup().await;
        assert!(hydrate(&db, vec![]).await.unwrap().is_empty());
    }
}
