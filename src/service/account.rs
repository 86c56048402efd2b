//! Account service
//!
//! Handles registration, lookup and owner profile updates.

use std::collections::HashMap;
use std::sync::Arc;

use crate::data::{Account, AccountId, Database, NewAccount, ProfileUpdate};
use crate::error::AppError;

const MAX_USERNAME_LEN: usize = 30;

fn normalize_optional_text(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn validate_username(username: &str) -> Result<(), AppError> {
    if username.is_empty() {
        return Err(AppError::Validation("username cannot be empty".to_string()));
    }

    if username.len() > MAX_USERNAME_LEN {
        return Err(AppError::Validation(format!(
            "username must be at most {} characters long",
            MAX_USERNAME_LEN
        )));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::Validation(
            "username must only contain alphanumeric characters and underscores".to_string(),
        ));
    }

    Ok(())
}

fn hash_password(password: &str) -> Result<String, anyhow::Error> {
    use argon2::{
        Argon2, PasswordHasher,
        password_hash::{SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Account service
pub struct AccountService {
    db: Arc<Database>,
}

impl AccountService {
    /// Create new account service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Register a new account
    ///
    /// # Errors
    /// - `Validation` for an empty or malformed username
    /// - `Conflict` if the username is already taken
    pub async fn create(&self, username: &str, password: &str) -> Result<Account, AppError> {
        let username = username.trim();
        validate_username(username)?;

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(e.into()))?
            .map_err(AppError::Internal)?;

        let account = self
            .db
            .insert_account(&NewAccount {
                username: username.to_string(),
                password_hash,
                created_at: chrono::Utc::now(),
            })
            .await?;

        crate::metrics::ACCOUNTS_CREATED_TOTAL.inc();
        tracing::info!(account_id = account.id, username = %account.username, "Account created");

        Ok(account)
    }

    /// Look up an account by username
    ///
    /// # Returns
    /// `None` if no account has that username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AppError> {
        self.db.get_account_by_username(username).await
    }

    /// Look up an account by username, treating absence as `NotFound`
    pub async fn get_by_username(&self, username: &str) -> Result<Account, AppError> {
        self.find_by_username(username)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Look up several accounts in one query
    ///
    /// Results follow the order of `usernames`; unknown names are skipped
    /// and repeated names appear once.
    pub async fn find_many_by_usernames(
        &self,
        usernames: &[&str],
    ) -> Result<Vec<Account>, AppError> {
        let mut by_username: HashMap<String, Account> = self
            .db
            .get_accounts_by_usernames(usernames)
            .await?
            .into_iter()
            .map(|account| (account.username.clone(), account))
            .collect();

        Ok(usernames
            .iter()
            .filter_map(|username| by_username.remove(*username))
            .collect())
    }

    /// Update the owner's profile
    ///
    /// Fields absent from `update` keep their stored value; blank values
    /// clear the field.
    pub async fn update_profile(
        &self,
        account: &Account,
        update: ProfileUpdate,
    ) -> Result<Account, AppError> {
        let update = ProfileUpdate {
            display_name: update.display_name.map(normalize_optional_text),
            note: update.note.map(normalize_optional_text),
            avatar: update.avatar.map(normalize_optional_text),
            header: update.header.map(normalize_optional_text),
        };
        if update.is_empty() {
            return Ok(account.clone());
        }

        let updated = self.db.update_account_profile(account.id, &update).await?;
        if !updated {
            return Err(AppError::NotFound);
        }

        tracing::info!(account_id = account.id, "Profile updated");

        let mut account = account.clone();
        if let Some(display_name) = update.display_name {
            account.display_name = display_name;
        }
        if let Some(note) = update.note {
            account.note = note;
        }
        if let Some(avatar) = update.avatar {
            account.avatar = avatar;
        }
        if let Some(header) = update.header {
            account.header = header;
        }
        Ok(account)
    }

    /// Followers, following and status counts for an account view
    pub async fn counts(&self, account_id: AccountId) -> Result<AccountCounts, AppError> {
        Ok(AccountCounts {
            followers: self.db.count_followers(account_id).await?,
            following: self.db.count_following(account_id).await?,
            statuses: self.db.count_statuses(account_id).await?,
        })
    }
}

/// Aggregate counters shown with an account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountCounts {
    pub followers: i64,
    pub following: i64,
    pub statuses: i64,
}
