//! Account endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::AppState;
use crate::api::converters::{account_to_response, relationship_to_response};
use crate::api::dto::{
    AccountResponse, CreateAccountRequest, ListQuery, RelationshipResponse, RelationshipsQuery,
    UpdateCredentialsRequest,
};
use crate::auth::CurrentUser;
use crate::data::ProfileUpdate;
use crate::error::AppError;
use crate::metrics::{
    DB_QUERIES_TOTAL, DB_QUERY_DURATION_SECONDS, HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL,
};
use crate::pagination::Parameters;
use crate::service::{AccountService, RelationService};

/// POST /v1/accounts
pub async fn create_account(
    State(state): State<AppState>,
    Json(req): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/v1/accounts"])
        .start_timer();

    let account_service = AccountService::new(state.db.clone());
    let db_timer = DB_QUERY_DURATION_SECONDS
        .with_label_values(&["INSERT", "accounts"])
        .start_timer();
    let account = account_service.create(&req.username, &req.password).await?;
    DB_QUERIES_TOTAL
        .with_label_values(&["INSERT", "accounts"])
        .inc();
    db_timer.observe_duration();

    let counts = account_service.counts(account.id).await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/v1/accounts", "201"])
        .inc();

    Ok((
        StatusCode::CREATED,
        Json(account_to_response(&account, Some(counts), &state.config)),
    ))
}

/// GET /v1/accounts/:username
pub async fn get_account(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<AccountResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/v1/accounts/:username"])
        .start_timer();

    let account_service = AccountService::new(state.db.clone());
    let db_timer = DB_QUERY_DURATION_SECONDS
        .with_label_values(&["SELECT", "accounts"])
        .start_timer();
    let account = account_service.get_by_username(&username).await?;
    let counts = account_service.counts(account.id).await?;
    DB_QUERIES_TOTAL
        .with_label_values(&["SELECT", "accounts"])
        .inc();
    db_timer.observe_duration();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/v1/accounts/:username", "200"])
        .inc();

    Ok(Json(account_to_response(&account, Some(counts), &state.config)))
}

/// POST /v1/accounts/update_credentials
pub async fn update_credentials(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Json(req): Json<UpdateCredentialsRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/v1/accounts/update_credentials"])
        .start_timer();

    let account_service = AccountService::new(state.db.clone());
    let updated = account_service
        .update_profile(
            &account,
            ProfileUpdate {
                display_name: req.display_name.map(Some),
                note: req.note.map(Some),
                avatar: req.avatar.map(Some),
                header: req.header.map(Some),
            },
        )
        .await?;
    let counts = account_service.counts(updated.id).await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/v1/accounts/update_credentials", "200"])
        .inc();

    Ok(Json(account_to_response(&updated, Some(counts), &state.config)))
}

/// GET /v1/accounts/relationships?username=a,b
///
/// Unknown usernames are left out of the response.
pub async fn relationships(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    Query(query): Query<RelationshipsQuery>,
) -> Result<Json<Vec<RelationshipResponse>>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/v1/accounts/relationships"])
        .start_timer();

    let usernames: Vec<&str> = query
        .username
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();
    let targets = AccountService::new(state.db.clone())
        .find_many_by_usernames(&usernames)
        .await?;

    let target_ids: Vec<_> = targets.iter().map(|account| account.id).collect();
    let relations = RelationService::new(state.db.clone())
        .relations_with(viewer.id, &target_ids)
        .await?;

    let responses = targets
        .iter()
        .zip(relations)
        .map(|(target, relation)| relationship_to_response(target, relation))
        .collect();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/v1/accounts/relationships", "200"])
        .inc();

    Ok(Json(responses))
}

/// POST /v1/accounts/:username/follow
pub async fn follow_account(
    State(state): State<AppState>,
    CurrentUser(follower): CurrentUser,
    Path(username): Path<String>,
) -> Result<Json<RelationshipResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/v1/accounts/:username/follow"])
        .start_timer();

    let target = AccountService::new(state.db.clone())
        .get_by_username(&username)
        .await?;

    let db_timer = DB_QUERY_DURATION_SECONDS
        .with_label_values(&["INSERT", "relations"])
        .start_timer();
    let relation = RelationService::new(state.db.clone())
        .follow(&follower, &target)
        .await?;
    DB_QUERIES_TOTAL
        .with_label_values(&["INSERT", "relations"])
        .inc();
    db_timer.observe_duration();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/v1/accounts/:username/follow", "200"])
        .inc();

    Ok(Json(relationship_to_response(&target, relation)))
}

/// POST /v1/accounts/:username/unfollow
pub async fn unfollow_account(
    State(state): State<AppState>,
    CurrentUser(follower): CurrentUser,
    Path(username): Path<String>,
) -> Result<Json<RelationshipResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/v1/accounts/:username/unfollow"])
        .start_timer();

    let target = AccountService::new(state.db.clone())
        .get_by_username(&username)
        .await?;

    let db_timer = DB_QUERY_DURATION_SECONDS
        .with_label_values(&["DELETE", "relations"])
        .start_timer();
    let relation = RelationService::new(state.db.clone())
        .unfollow(&follower, &target)
        .await?;
    DB_QUERIES_TOTAL
        .with_label_values(&["DELETE", "relations"])
        .inc();
    db_timer.observe_duration();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/v1/accounts/:username/unfollow", "200"])
        .inc();

    Ok(Json(relationship_to_response(&target, relation)))
}

/// GET /v1/accounts/:username/following
pub async fn get_following(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/v1/accounts/:username/following"])
        .start_timer();

    let limit = Parameters::new(None, None, query.limit)?.limit;
    let account = AccountService::new(state.db.clone())
        .get_by_username(&username)
        .await?;
    let following = RelationService::new(state.db.clone())
        .following(account.id, limit)
        .await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/v1/accounts/:username/following", "200"])
        .inc();

    Ok(Json(
        following
            .iter()
            .map(|account| account_to_response(account, None, &state.config))
            .collect(),
    ))
}

/// GET /v1/accounts/:username/followers
pub async fn get_followers(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/v1/accounts/:username/followers"])
        .start_timer();

    let limit = Parameters::new(None, None, query.limit)?.limit;
    let account = AccountService::new(state.db.clone())
        .get_by_username(&username)
        .await?;
    let followers = RelationService::new(state.db.clone())
        .followers(account.id, limit)
        .await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/v1/accounts/:username/followers", "200"])
        .inc();

    Ok(Json(
        followers
            .iter()
            .map(|account| account_to_response(account, None, &state.config))
            .collect(),
    ))
}
