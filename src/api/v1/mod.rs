//! Version 1 JSON API
//!
//! Routes are split into public and authenticated endpoints. Authenticated
//! handlers take a `CurrentUser`, so unauthenticated calls get a 401.

use std::convert::Infallible;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::AppState;
use crate::service::MAX_VIDEO_BYTES;

pub mod accounts;
pub mod media;
pub mod statuses;
pub mod timelines;

/// Room for multipart framing and the description field
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Create the `/v1` router
pub fn v1_router() -> Router<AppState> {
    let public_routes = Router::new()
        .route("/accounts", post(accounts::create_account))
        .route("/accounts/:username", get(accounts::get_account))
        .route("/accounts/:username/following", get(accounts::get_following))
        .route("/accounts/:username/followers", get(accounts::get_followers))
        .route("/statuses/:id", get(statuses::get_status))
        .route("/timelines/public", get(timelines::public_timeline));

    let authenticated_routes = Router::new()
        .route(
            "/accounts/update_credentials",
            post(accounts::update_credentials),
        )
        .route("/accounts/relationships", get(accounts::relationships))
        .route("/accounts/:username/follow", post(accounts::follow_account))
        .route(
            "/accounts/:username/unfollow",
            post(accounts::unfollow_account),
        )
        .route("/statuses", post(statuses::create_status))
        .route("/statuses/:id", delete(statuses::delete_status))
        .route("/timelines/home", get(timelines::home_timeline))
        .route(
            "/media",
            post(media::upload_media)
                .layer::<_, Infallible>(DefaultBodyLimit::disable())
                .layer::<_, Infallible>(RequestBodyLimitLayer::new(
                    MAX_VIDEO_BYTES + MULTIPART_OVERHEAD_BYTES,
                )),
        );

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
}
