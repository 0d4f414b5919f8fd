use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::ServiceError;
use crate::handlers::common::{no_content_response, success_response};
use crate::AppState;

/// Creates the router for notification endpoints
pub fn notifications_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/:id/read", post(mark_read))
        .route("/read-all", post(mark_all_read))
}

async fn list_notifications(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = state
        .services
        .notifications
        .list(user.user_id)
        .await?;
    Ok(success_response(rows))
}

#[derive(Debug, Serialize)]
struct UnreadCount {
    unread: u64,
}

async fn unread_count(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ServiceError> {
    let unread = state
        .services
        .notifications
        .unread_count(user.user_id)
        .await?;
    Ok(success_response(UnreadCount { unread }))
}

async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .notifications
        .mark_read(user.user_id, id)
        .await?;
    Ok(no_content_response())
}

async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .notifications
        .mark_all_read(user.user_id)
        .await?;
    Ok(no_content_response())
}
