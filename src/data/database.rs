//! SQLite database operations
//!
//! All database access goes through this module.
//! Each logical write runs in a single transaction; uniqueness of usernames
//! and follow edges is enforced by table constraints, not by pre-checks.

use chrono::Utc;
use sqlx::{Pool, QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashSet;
use std::path::Path;

use super::models::*;
use crate::error::AppError;
use crate::pagination::Parameters;

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_error) if db_error.is_unique_violation())
}

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    // =========================================================================
    // Connection
    // =========================================================================

    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!(path = %path.display(), "Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Account
    // =========================================================================

    /// Insert a new account
    ///
    /// # Errors
    /// `AppError::Conflict` if the username is already taken
    pub async fn insert_account(&self, account: &NewAccount) -> Result<Account, AppError> {
        let result = sqlx::query(
            "INSERT INTO accounts (username, password_hash, created_at) VALUES (?, ?, ?)",
        )
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.created_at)
        .execute(&self.pool)
        .await;

        let result = match result {
            Ok(result) => result,
            Err(error) if is_unique_violation(&error) => {
                return Err(AppError::Conflict(format!(
                    "username {} is already taken",
                    account.username
                )));
            }
            Err(error) => return Err(error.into()),
        };

        Ok(Account {
            id: result.last_insert_rowid(),
            username: account.username.clone(),
            password_hash: account.password_hash.clone(),
            display_name: None,
            note: None,
            avatar: None,
            header: None,
            created_at: account.created_at,
        })
    }

    /// Get account by username
    ///
    /// # Returns
    /// The account or None if no such username exists
    pub async fn get_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Get account by ID
    pub async fn get_account(&self, id: AccountId) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Get multiple accounts by ID (batch operation to avoid N+1)
    pub async fn get_accounts_by_ids(&self, ids: &[AccountId]) -> Result<Vec<Account>, AppError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut query_builder = QueryBuilder::<Sqlite>::new("SELECT * FROM accounts WHERE id IN (");
        {
            let mut separated = query_builder.separated(", ");
            for id in ids {
                separated.push_bind(*id);
            }
        }
        query_builder.push(")");

        let accounts = query_builder
            .build_query_as::<Account>()
            .fetch_all(&self.pool)
            .await?;

        Ok(accounts)
    }

    /// Get multiple accounts by username (batch operation to avoid N+1)
    pub async fn get_accounts_by_usernames(
        &self,
        usernames: &[&str],
    ) -> Result<Vec<Account>, AppError> {
        if usernames.is_empty() {
            return Ok(vec![]);
        }

        let mut query_builder =
            QueryBuilder::<Sqlite>::new("SELECT * FROM accounts WHERE username IN (");
        {
            let mut separated = query_builder.separated(", ");
            for username in usernames {
                separated.push_bind(username.to_string());
            }
        }
        query_builder.push(")");

        let accounts = query_builder
            .build_query_as::<Account>()
            .fetch_all(&self.pool)
            .await?;

        Ok(accounts)
    }

    /// Patch the profile fields of an account.
    ///
    /// Only columns present in `profile` are written.
    ///
    /// # Returns
    /// `true` if updated, `false` if no matching account row exists.
    pub async fn update_account_profile(
        &self,
        account_id: AccountId,
        profile: &ProfileUpdate,
    ) -> Result<bool, AppError> {
        if profile.is_empty() {
            return Ok(self.get_account(account_id).await?.is_some());
        }

        let mut query_builder = QueryBuilder::<Sqlite>::new("UPDATE accounts SET ");
        {
            let mut separated = query_builder.separated(", ");
            let columns = [
                ("display_name", &profile.display_name),
                ("note", &profile.note),
                ("avatar", &profile.avatar),
                ("header", &profile.header),
            ];
            for (column, value) in columns {
                if let Some(value) = value {
                    separated.push(column);
                    separated.push_unseparated(" = ");
                    separated.push_bind_unseparated(value.clone());
                }
            }
        }
        query_builder.push(" WHERE id = ");
        query_builder.push_bind(account_id);

        let result = query_builder.build().execute(&self.pool).await?;

        Ok(result.rows_affected() == 1)
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Get status by ID
    pub async fn get_status(&self, id: StatusId) -> Result<Option<Status>, AppError> {
        let status = sqlx::query_as::<_, Status>("SELECT * FROM statuses WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(status)
    }

    /// Insert a new status
    ///
    /// # Returns
    /// The stored status with its database-assigned id
    pub async fn insert_status(
        &self,
        account_id: AccountId,
        content: &str,
    ) -> Result<Status, AppError> {
        self.insert_status_with_media(account_id, content, &[])
            .await
    }

    /// Insert a status and attach uploaded media to it atomically.
    ///
    /// Every media id must belong to `account_id` and be unattached;
    /// otherwise nothing is written.
    pub async fn insert_status_with_media(
        &self,
        account_id: AccountId,
        content: &str,
        media_ids: &[MediaId],
    ) -> Result<Status, AppError> {
        let created_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        let status_id = sqlx::query(
            "INSERT INTO statuses (account_id, content, created_at) VALUES (?, ?, ?)",
        )
        .bind(account_id)
        .bind(content)
        .bind(created_at)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for media_id in media_ids {
            let result = sqlx::query(
                "UPDATE media_attachments SET status_id = ? WHERE id = ? AND account_id = ? AND status_id IS NULL",
            )
            .bind(status_id)
            .bind(media_id)
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Dropping `tx` rolls back the status insert.
                return Err(AppError::Validation(format!(
                    "media attachment {} does not exist or cannot be attached",
                    media_id
                )));
            }
        }

        tx.commit().await?;

        Ok(Status {
            id: status_id,
            account_id,
            content: content.to_string(),
            created_at,
        })
    }

    /// Delete a status owned by `account_id`
    ///
    /// # Returns
    /// `true` if a row was removed
    pub async fn delete_status(
        &self,
        id: StatusId,
        account_id: AccountId,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM statuses WHERE id = ? AND account_id = ?")
            .bind(id)
            .bind(account_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count statuses written by an account
    pub async fn count_statuses(&self, account_id: AccountId) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM statuses WHERE account_id = ?")
            .bind(account_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Timelines
    // =========================================================================

    /// All statuses inside the cursor window, newest first
    ///
    /// Returns statuses with `since_id < id <= max_id`, at most `limit`.
    pub async fn get_public_timeline(&self, params: &Parameters) -> Result<Vec<Status>, AppError> {
        let statuses = sqlx::query_as::<_, Status>(
            r#"
            SELECT * FROM statuses
            WHERE id > ? AND id <= ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(params.since_id)
        .bind(params.max_id)
        .bind(params.limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(statuses)
    }

    /// Statuses by accounts `account_id` follows, newest first
    ///
    /// Same window semantics as [`Database::get_public_timeline`]. When
    /// `include_own` is set the account's own statuses are eligible too.
    pub async fn get_home_timeline(
        &self,
        account_id: AccountId,
        params: &Parameters,
        include_own: bool,
    ) -> Result<Vec<Status>, AppError> {
        let statuses = sqlx::query_as::<_, Status>(
            r#"
            SELECT * FROM statuses
            WHERE id > ? AND id <= ?
              AND (
                account_id IN (SELECT following_id FROM relations WHERE follower_id = ?)
                OR (? AND account_id = ?)
              )
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(params.since_id)
        .bind(params.max_id)
        .bind(account_id)
        .bind(include_own)
        .bind(account_id)
        .bind(params.limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(statuses)
    }

    // =========================================================================
    // Media Attachments
    // =========================================================================

    /// Insert media attachment
    pub async fn insert_media(
        &self,
        media: &NewMediaAttachment,
    ) -> Result<MediaAttachment, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO media_attachments (
                account_id, status_id, media_type, storage_key, url, description, created_at
            ) VALUES (?, NULL, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(media.account_id)
        .bind(&media.media_type)
        .bind(&media.storage_key)
        .bind(&media.url)
        .bind(&media.description)
        .bind(media.created_at)
        .execute(&self.pool)
        .await?;

        Ok(MediaAttachment {
            id: result.last_insert_rowid(),
            account_id: media.account_id,
            status_id: None,
            media_type: media.media_type.clone(),
            storage_key: media.storage_key.clone(),
            url: media.url.clone(),
            description: media.description.clone(),
            created_at: media.created_at,
        })
    }

    /// Get media by ID
    pub async fn get_media(&self, id: MediaId) -> Result<Option<MediaAttachment>, AppError> {
        let media =
            sqlx::query_as::<_, MediaAttachment>("SELECT * FROM media_attachments WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(media)
    }

    /// Get media attached to any of the given statuses
    pub async fn get_media_by_status_ids(
        &self,
        status_ids: &[StatusId],
    ) -> Result<Vec<MediaAttachment>, AppError> {
        if status_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut query_builder =
            QueryBuilder::<Sqlite>::new("SELECT * FROM media_attachments WHERE status_id IN (");
        {
            let mut separated = query_builder.separated(", ");
            for id in status_ids {
                separated.push_bind(*id);
            }
        }
        query_builder.push(") ORDER BY id ASC");

        let media = query_builder
            .build_query_as::<MediaAttachment>()
            .fetch_all(&self.pool)
            .await?;

        Ok(media)
    }

    // =========================================================================
    // Follow relationships
    // =========================================================================

    /// Insert follow edge `follower_id -> following_id`.
    ///
    /// Idempotent: a second call hits the `(follower_id, following_id)`
    /// unique constraint and is ignored, so concurrent callers never produce
    /// duplicate edges.
    ///
    /// # Returns
    /// `true` if a new edge was created
    pub async fn insert_relation(
        &self,
        follower_id: AccountId,
        following_id: AccountId,
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO relations (follower_id, following_id, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT (follower_id, following_id) DO NOTHING
            "#,
        )
        .bind(follower_id)
        .bind(following_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete follow edge `follower_id -> following_id`
    ///
    /// # Returns
    /// `true` if an edge was removed; a missing edge is not an error
    pub async fn delete_relation(
        &self,
        follower_id: AccountId,
        following_id: AccountId,
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM relations WHERE follower_id = ? AND following_id = ?")
            .bind(follower_id)
            .bind(following_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether edge `follower_id -> following_id` exists
    pub async fn is_following(
        &self,
        follower_id: AccountId,
        following_id: AccountId,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT 1 FROM relations WHERE follower_id = ? AND following_id = ?",
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(exists.is_some())
    }

    /// Which of `target_ids` the account follows
    pub async fn get_following_among(
        &self,
        follower_id: AccountId,
        target_ids: &[AccountId],
    ) -> Result<HashSet<AccountId>, AppError> {
        if target_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let mut query_builder =
            QueryBuilder::<Sqlite>::new("SELECT following_id FROM relations WHERE follower_id = ");
        query_builder.push_bind(follower_id);
        query_builder.push(" AND following_id IN (");
        {
            let mut separated = query_builder.separated(", ");
            for id in target_ids {
                separated.push_bind(*id);
            }
        }
        query_builder.push(")");

        let ids = query_builder
            .build_query_scalar::<i64>()
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }

    /// Which of `source_ids` follow the account
    pub async fn get_followers_among(
        &self,
        following_id: AccountId,
        source_ids: &[AccountId],
    ) -> Result<HashSet<AccountId>, AppError> {
        if source_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let mut query_builder =
            QueryBuilder::<Sqlite>::new("SELECT follower_id FROM relations WHERE following_id = ");
        query_builder.push_bind(following_id);
        query_builder.push(" AND follower_id IN (");
        {
            let mut separated = query_builder.separated(", ");
            for id in source_ids {
                separated.push_bind(*id);
            }
        }
        query_builder.push(")");

        let ids = query_builder
            .build_query_scalar::<i64>()
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }

    /// Accounts `account_id` follows, in the order the edges were created
    pub async fn get_following(
        &self,
        account_id: AccountId,
        limit: i64,
    ) -> Result<Vec<Account>, AppError> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT a.* FROM relations r
            JOIN accounts a ON a.id = r.following_id
            WHERE r.follower_id = ?
            ORDER BY r.id ASC
            LIMIT ?
            "#,
        )
        .bind(account_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    /// Accounts following `account_id`, in the order the edges were created
    pub async fn get_followers(
        &self,
        account_id: AccountId,
        limit: i64,
    ) -> Result<Vec<Account>, AppError> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT a.* FROM relations r
            JOIN accounts a ON a.id = r.follower_id
            WHERE r.following_id = ?
            ORDER BY r.id ASC
            LIMIT ?
            "#,
        )
        .bind(account_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    /// Count accounts `account_id` follows
    pub async fn count_following(&self, account_id: AccountId) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM relations WHERE follower_id = ?")
                .bind(account_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count accounts following `account_id`
    pub async fn count_followers(&self, account_id: AccountId) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM relations WHERE following_id = ?")
                .bind(account_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
