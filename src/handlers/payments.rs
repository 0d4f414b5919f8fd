use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::ServiceError;
use crate::handlers::common::success_response;
use crate::services::payments::CallbackOutcome;
use crate::AppState;

/// Creates the router for the simulated payment gateway endpoints
pub fn payments_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/:order_id/intent", post(create_intent))
        .route("/:order_id/success", post(payment_success))
        .route("/:order_id/failure", post(payment_failure))
}

async fn create_intent(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ServiceError> {
    let intent = state
        .services
        .payments
        .create_intent(user.user_id, order_id)
        .await?;
    Ok(success_response(intent))
}

#[derive(Debug, Serialize)]
struct CallbackResponse {
    order_id: Uuid,
    applied: bool,
}

async fn payment_success(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state
        .services
        .payments
        .confirm_success(user.user_id, order_id)
        .await?;
    Ok(success_response(CallbackResponse {
        order_id,
        applied: outcome == CallbackOutcome::Applied,
    }))
}

async fn payment_failure(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = state
        .services
        .payments
        .confirm_failure(user.user_id, order_id)
        .await?;
    Ok(success_response(CallbackResponse {
        order_id,
        applied: outcome == CallbackOutcome::Applied,
    }))
}
