use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::entities::order::{OrderStatus, PaymentMethod};
use crate::entities::OrderModel;
use crate::errors::ServiceError;
use crate::handlers::common::created_response;
use crate::services::checkout::ShippingInfo;
use crate::AppState;

/// Creates the router for checkout
pub fn checkout_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", post(place_order))
}

#[derive(Debug, Deserialize)]
struct PlaceOrderRequest {
    full_name: String,
    address: String,
    city: String,
    phone: String,
    payment_method: PaymentMethod,
}

#[derive(Debug, Serialize)]
struct OrderPlacedResponse {
    order_id: Uuid,
    status: OrderStatus,
    subtotal: Decimal,
    discount: Decimal,
    total: Decimal,
    /// Set for gateway orders: the caller should create a payment intent
    /// and redirect the buyer to the gateway.
    requires_payment: bool,
}

impl From<OrderModel> for OrderPlacedResponse {
    fn from(order: OrderModel) -> Self {
        Self {
            order_id: order.id,
            status: order.status,
            subtotal: order.subtotal,
            discount: order.discount,
            total: order.total,
            requires_payment: order.status == OrderStatus::AwaitingPayment,
        }
    }
}

/// Converts the session cart into a durable order. The coupon applied to
/// the session rides along; if it is no longer valid the order simply
/// carries no discount.
async fn place_order(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let session = state.sessions.load(user.user_id).await?;

    let shipping = ShippingInfo {
        full_name: payload.full_name,
        address: payload.address,
        city: payload.city,
        phone: payload.phone,
    };

    let order = state
        .services
        .checkout
        .place_order(
            user.user_id,
            &session.cart,
            shipping,
            payload.payment_method,
            session.coupon_code.as_deref(),
        )
        .await?;

    Ok(created_response(OrderPlacedResponse::from(order)))
}
