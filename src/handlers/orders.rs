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
use crate::entities::order::OrderStatus;
use crate::entities::{OrderItemModel, OrderModel};
use crate::errors::ServiceError;
use crate::handlers::common::success_response;
use crate::AppState;

/// Creates the router for order history endpoints
pub fn orders_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_orders))
        .route("/:id", get(get_order))
        .route("/:id/cancel", post(cancel_order))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ServiceError> {
    let orders = state.services.orders.list_for_user(user.user_id).await?;
    Ok(success_response(orders))
}

#[derive(Debug, Serialize)]
struct OrderDetail {
    #[serde(flatten)]
    order: OrderModel,
    items: Vec<OrderItemModel>,
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ServiceError> {
    let (order, items) = state
        .services
        .orders
        .get_order_with_items(user.user_id, id)
        .await?;
    Ok(success_response(OrderDetail { order, items }))
}

async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .services
        .orders
        .transition(user.user_id, id, OrderStatus::Cancelled)
        .await?;
    Ok(success_response(order))
}
