//! Status endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::AppState;
use crate::api::converters::status_to_response;
use crate::api::dto::{CreateStatusRequest, StatusResponse};
use crate::auth::CurrentUser;
use crate::data::StatusId;
use crate::error::AppError;
use crate::metrics::{
    DB_QUERIES_TOTAL, DB_QUERY_DURATION_SECONDS, HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL,
};
use crate::service::StatusService;

/// POST /v1/statuses
pub async fn create_status(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Json(req): Json<CreateStatusRequest>,
) -> Result<(StatusCode, Json<StatusResponse>), AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/v1/statuses"])
        .start_timer();

    let status_service = StatusService::new(state.db.clone(), state.storage.clone());
    let db_timer = DB_QUERY_DURATION_SECONDS
        .with_label_values(&["INSERT", "statuses"])
        .start_timer();
    let item = status_service
        .create(&account, &req.status, &req.media_ids)
        .await?;
    DB_QUERIES_TOTAL
        .with_label_values(&["INSERT", "statuses"])
        .inc();
    db_timer.observe_duration();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/v1/statuses", "201"])
        .inc();

    Ok((
        StatusCode::CREATED,
        Json(status_to_response(&item, &state.config)),
    ))
}

/// GET /v1/statuses/:id
pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<StatusId>,
) -> Result<Json<StatusResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/v1/statuses/:id"])
        .start_timer();

    let status_service = StatusService::new(state.db.clone(), state.storage.clone());
    let item = status_service.get(id).await?.ok_or(AppError::NotFound)?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/v1/statuses/:id", "200"])
        .inc();

    Ok(Json(status_to_response(&item, &state.config)))
}

/// DELETE /v1/statuses/:id
pub async fn delete_status(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Path(id): Path<StatusId>,
) -> Result<StatusCode, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["DELETE", "/v1/statuses/:id"])
        .start_timer();

    let status_service = StatusService::new(state.db.clone(), state.storage.clone());
    let db_timer = DB_QUERY_DURATION_SECONDS
        .with_label_values(&["DELETE", "statuses"])
        .start_timer();
    status_service.delete(&account, id).await?;
    DB_QUERIES_TOTAL
        .with_label_values(&["DELETE", "statuses"])
        .inc();
    db_timer.observe_duration();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["DELETE", "/v1/statuses/:id", "204"])
        .inc();

    Ok(StatusCode::NO_CONTENT)
}
