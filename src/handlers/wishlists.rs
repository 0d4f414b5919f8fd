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
use crate::handlers::common::success_response;
use crate::AppState;

/// Creates the router for wishlist endpoints
pub fn wishlists_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_wishlist))
        .route("/:product_id/toggle", post(toggle_item))
}

async fn list_wishlist(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ServiceError> {
    let items = state.services.wishlists.list(user.user_id).await?;
    Ok(success_response(items))
}

#[derive(Debug, Serialize)]
struct ToggleResult {
    product_id: Uuid,
    in_wishlist: bool,
}

async fn toggle_item(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ServiceError> {
    let in_wishlist = state
        .services
        .wishlists
        .toggle(user.user_id, product_id)
        .await?;
    Ok(success_response(ToggleResult {
        product_id,
        in_wishlist,
    }))
}
