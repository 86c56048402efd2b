//! Authentication extractor
//!
//! Resolves the acting account for protected routes.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
};

use crate::AppState;
use crate::data::Account;
use crate::error::AppError;

/// Header carrying the acting username
pub const AUTHENTICATION_HEADER: &str = "Authentication";

const USERNAME_SCHEME: &str = "username";

fn extract_username_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHENTICATION_HEADER)?.to_str().ok()?;
    let (scheme, username) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(USERNAME_SCHEME) {
        return None;
    }

    let username = username.trim();
    if username.is_empty() {
        None
    } else {
        Some(username.to_owned())
    }
}

/// Extractor for the authenticated account
///
/// Rejects with `Unauthorized` when the header is missing, malformed,
/// or names an unknown account.
///
/// # Usage
/// ```ignore
/// async fn handler(
///     CurrentUser(account): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}", account.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Account);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(account) = parts.extensions.get::<Account>().cloned() {
            return Ok(CurrentUser(account));
        }

        let state = AppState::from_ref(state);
        let username =
            extract_username_from_headers(&parts.headers).ok_or(AppError::Unauthorized)?;
        let account = state
            .db
            .get_account_by_username(&username)
            .await?
            .ok_or_else(|| {
                tracing::debug!(username = %username, "Authentication for unknown account");
                AppError::Unauthorized
            })?;

        parts.extensions.insert(account.clone());
        Ok(CurrentUser(account))
    }
}
