//! Relation service
//!
//! Follow graph operations. Each answer is read from the database at call
//! time; relationship views are never cached.

use std::sync::Arc;

use crate::data::{Account, AccountId, Database, RelationWith};
use crate::error::AppError;
use crate::metrics::RELATION_CHANGES_TOTAL;

/// Relation service
pub struct RelationService {
    db: Arc<Database>,
}

impl RelationService {
    /// Create new relation service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Make `follower` follow `target`
    ///
    /// Idempotent: following an already-followed account is a no-op.
    ///
    /// # Returns
    /// The relationship as seen by `follower` after the write
    ///
    /// # Errors
    /// `Validation` if an account tries to follow itself
    pub async fn follow(&self, follower: &Account, target: &Account) -> Result<RelationWith, AppError> {
        if follower.id == target.id {
            return Err(AppError::Validation("cannot follow yourself".to_string()));
        }

        let inserted = self.db.insert_relation(follower.id, target.id).await?;
        if inserted {
            RELATION_CHANGES_TOTAL.with_label_values(&["follow"]).inc();
            tracing::info!(
                follower_id = follower.id,
                target_id = target.id,
                "Follow edge created"
            );
        } else {
            tracing::debug!(
                follower_id = follower.id,
                target_id = target.id,
                "Follow edge already present"
            );
        }

        self.relation_with(follower.id, target.id).await
    }

    /// Make `follower` stop following `target`
    ///
    /// Removing an edge that does not exist is not an error.
    pub async fn unfollow(
        &self,
        follower: &Account,
        target: &Account,
    ) -> Result<RelationWith, AppError> {
        let removed = self.db.delete_relation(follower.id, target.id).await?;
        if removed {
            RELATION_CHANGES_TOTAL.with_label_values(&["unfollow"]).inc();
            tracing::info!(
                follower_id = follower.id,
                target_id = target.id,
                "Follow edge removed"
            );
        }

        self.relation_with(follower.id, target.id).await
    }

    /// Whether `a` follows `b`
    pub async fn is_following(&self, a: AccountId, b: AccountId) -> Result<bool, AppError> {
        self.db.is_following(a, b).await
    }

    /// Two-sided follow state between `viewer` and `target`
    pub async fn relation_with(
        &self,
        viewer: AccountId,
        target: AccountId,
    ) -> Result<RelationWith, AppError> {
        Ok(RelationWith {
            following: self.db.is_following(viewer, target).await?,
            followed_by: self.db.is_following(target, viewer).await?,
        })
    }

    /// Follow state between `viewer` and each of `targets`, in input order
    pub async fn relations_with(
        &self,
        viewer: AccountId,
        targets: &[AccountId],
    ) -> Result<Vec<RelationWith>, AppError> {
        let following = self.db.get_following_among(viewer, targets).await?;
        let followed_by = self.db.get_followers_among(viewer, targets).await?;

        Ok(targets
            .iter()
            .map(|target| RelationWith {
                following: following.contains(target),
                followed_by: followed_by.contains(target),
            })
            .collect())
    }

    /// Accounts `account_id` follows, oldest edge first
    pub async fn following(&self, account_id: AccountId, limit: i64) -> Result<Vec<Account>, AppError> {
        self.db.get_following(account_id, limit).await
    }

    /// Accounts following `account_id`, oldest edge first
    pub async fn followers(&self, account_id: AccountId, limit: i64) -> Result<Vec<Account>, AppError> {
        self.db.get_followers(account_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::NewAccount;
    use tempfile::TempDir;

    async fn setup() -> (RelationService, Arc<Database>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Arc::new(
            Database::connect(&temp_dir.path().join("test.db"))
                .await
                .unwrap(),
        );
        (RelationService::new(db.clone()), db, temp_dir)
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

    #[tokio::test]
    async fn follow_reports_one_sided_relation() {
        let (service, db, _temp_dir) = setup().await;
        let a = account(&db, "a").await;
        let b = account(&db, "b").await;

        let relation = service.follow(&a, &b).await.unwrap();
        assert_eq!(
            relation,
            RelationWith {
                following: true,
                followed_by: false
            }
        );
        assert!(service.is_following(a.id, b.id).await.unwrap());
        assert!(!service.is_following(b.id, a.id).await.unwrap());

        let reverse = service.relation_with(b.id, a.id).await.unwrap();
        assert_eq!(
            reverse,
            RelationWith {
                following: false,
                followed_by: true
            }
        );
    }

    #[tokio::test]
    async fn follow_and_unfollow_are_idempotent() {
        let (service, db, _temp_dir) = setup().await;
        let a = account(&db, "a").await;
        let b = account(&db, "b").await;

        service.follow(&a, &b).await.unwrap();
        service.follow(&a, &b).await.unwrap();
        assert_eq!(db.count_following(a.id).await.unwrap(), 1);
        assert!(service.is_following(a.id, b.id).await.unwrap());

        let relation = service.unfollow(&a, &b).await.unwrap();
        assert!(!relation.following);
        let relation = service.unfollow(&a, &b).await.unwrap();
        assert!(!relation.following);
        assert!(!service.is_following(a.id, b.id).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_follows_create_single_edge() {
        let (service, db, _temp_dir) = setup().await;
        let a = account(&db, "a").await;
        let b = account(&db, "b").await;

        let (first, second) = tokio::join!(service.follow(&a, &b), service.follow(&a, &b));
        assert!(first.unwrap().following);
        assert!(second.unwrap().following);
        assert_eq!(db.count_following(a.id).await.unwrap(), 1);
        assert_eq!(db.count_followers(b.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn self_follow_is_rejected() {
        let (service, db, _temp_dir) = setup().await;
        let a = account(&db, "a").await;

        let error = service.follow(&a, &a).await.unwrap_err();
        assert!(matches!(error, AppError::Validation(_)));
        assert!(!service.is_following(a.id, a.id).await.unwrap());
    }

    #[tokio::test]
    async fn relations_with_preserves_target_order() {
        let (service, db, _temp_dir) = setup().await;
        let a = account(&db, "a").await;
        let b = account(&db, "b").await;
        let c = account(&db, "c").await;

        service.follow(&a, &b).await.unwrap();
        service.follow(&c, &a).await.unwrap();

        let relations = service.relations_with(a.id, &[c.id, b.id]).await.unwrap();
        assert_eq!(
            relations,
            vec![
                RelationWith {
                    following: false,
                    followed_by: true
                },
                RelationWith {
                    following: true,
                    followed_by: false
                },
            ]
        );
    }

    #[tokio::test]
    async fn lists_follow_insertion_order() {
        let (service, db, _temp_dir) = setup().await;
        let a = account(&db, "a").await;
        let b = account(&db, "b").await;
        let c = account(&db, "c").await;

        service.follow(&a, &c).await.unwrap();
        service.follow(&a, &b).await.unwrap();
        service.follow(&b, &c).await.unwrap();

        let following: Vec<_> = service
            .following(a.id, 80)
            .await
            .unwrap()
            .into_iter()
            .map(|account| account.username)
            .collect();
        assert_eq!(following, vec!["c", "b"]);

        let followers: Vec<_> = service
            .followers(c.id, 80)
            .await
            .unwrap()
            .into_iter()
            .map(|account| account.username)
            .collect();
        assert_eq!(followers, vec!["a", "b"]);

        assert_eq!(service.following(a.id, 1).await.unwrap().len(), 1);
    }
}
