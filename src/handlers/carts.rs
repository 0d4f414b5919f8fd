use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::ServiceError;
use crate::handlers::common::{no_content_response, success_response};
use crate::AppState;

/// Creates the router for session cart endpoints
pub fn carts_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(view_cart))
        .route("/items", post(add_item))
        .route("/items/:product_id", put(update_item))
        .route("/items/:product_id", delete(remove_item))
        .route("/clear", post(clear_cart))
        .route("/coupon", post(apply_coupon))
        .route("/coupon", delete(remove_coupon))
}

/// Current cart priced against the catalog
async fn view_cart(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ServiceError> {
    let view = state.services.carts.view(user.user_id).await?;
    Ok(success_response(view))
}

#[derive(Debug, Deserialize)]
struct AddItemRequest {
    product_id: Uuid,
    #[serde(default = "default_quantity")]
    quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

async fn add_item(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(payload): Json<AddItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let view = state
        .services
        .carts
        .add_item(user.user_id, payload.product_id, payload.quantity)
        .await?;
    Ok(success_response(view))
}

#[derive(Debug, Deserialize)]
struct UpdateQuantityRequest {
    quantity: i32,
}

async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
    user: CurrentUser,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let view = state
        .services
        .carts
        .set_quantity(user.user_id, product_id, payload.quantity)
        .await?;
    Ok(success_response(view))
}

async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .carts
        .remove_item(user.user_id, product_id)
        .await?;
    Ok(no_content_response())
}

async fn clear_cart(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.carts.clear(user.user_id).await?;
    Ok(no_content_response())
}

#[derive(Debug, Deserialize)]
struct ApplyCouponRequest {
    code: String,
}

/// Explicit coupon application; unknown and invalid codes are distinct
/// errors on this path.
async fn apply_coupon(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(payload): Json<ApplyCouponRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let view = state
        .services
        .carts
        .apply_coupon(user.user_id, &payload.code)
        .await?;
    Ok(success_response(view))
}

async fn remove_coupon(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ServiceError> {
    let view = state.services.carts.remove_coupon(user.user_id).await?;
    Ok(success_response(view))
}
