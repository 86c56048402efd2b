//! Timeline endpoints

use axum::{
    extract::{Query, State},
    response::Json,
};

use crate::AppState;
use crate::api::converters::status_to_response;
use crate::api::dto::StatusResponse;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::metrics::{
    DB_QUERIES_TOTAL, DB_QUERY_DURATION_SECONDS, HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL,
};
use crate::pagination::{PaginationQuery, Parameters};
use crate::service::TimelineService;

fn timeline_service(state: &AppState) -> TimelineService {
    TimelineService::new(
        state.db.clone(),
        state.config.timeline.home_includes_own_statuses,
    )
}

/// GET /v1/timelines/home
pub async fn home_timeline(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<Vec<StatusResponse>>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/v1/timelines/home"])
        .start_timer();

    // Reject bad bounds before touching the database
    let params = Parameters::try_from(query)?;

    let db_timer = DB_QUERY_DURATION_SECONDS
        .with_label_values(&["SELECT", "statuses"])
        .start_timer();
    let items = timeline_service(&state)
        .home_timeline(account.id, &params)
        .await?;
    DB_QUERIES_TOTAL
        .with_label_values(&["SELECT", "statuses"])
        .inc();
    db_timer.observe_duration();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/v1/timelines/home", "200"])
        .inc();

    Ok(Json(
        items
            .iter()
            .map(|item| status_to_response(item, &state.config))
            .collect(),
    ))
}

/// GET /v1/timelines/public
pub async fn public_timeline(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<Vec<StatusResponse>>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/v1/timelines/public"])
        .start_timer();

    let params = Parameters::try_from(query)?;

    let db_timer = DB_QUERY_DURATION_SECONDS
        .with_label_values(&["SELECT", "statuses"])
        .start_timer();
    let items = timeline_service(&state).public_timeline(&params).await?;
    DB_QUERIES_TOTAL
        .with_label_values(&["SELECT", "statuses"])
        .inc();
    db_timer.observe_duration();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/v1/timelines/public", "200"])
        .inc();

    Ok(Json(
        items
            .iter()
            .map(|item| status_to_response(item, &state.config))
            .collect(),
    ))
}
