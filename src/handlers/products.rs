use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::entities::{ProductModel, ReviewModel};
use crate::errors::ServiceError;
use crate::handlers::common::{created_response, success_response, validate_input};
use crate::services::catalog::RatingSummary;
use crate::AppState;

/// Creates the router for catalog endpoints
pub fn products_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products))
        .route("/categories", get(list_categories))
        .route("/:id", get(get_product))
        .route("/:id/reviews", get(list_reviews))
        .route("/:id/reviews", post(create_review))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    search: Option<String>,
    category: Option<Uuid>,
}

async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state
        .services
        .catalog
        .list_products(query.search.as_deref(), query.category)
        .await?;
    Ok(success_response(products))
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    let categories = state.services.catalog.list_categories().await?;
    Ok(success_response(categories))
}

/// Product detail with its review summary
#[derive(Debug, Serialize)]
struct ProductDetail {
    #[serde(flatten)]
    product: ProductModel,
    rating: RatingSummary,
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.catalog.get_product(id).await?;
    let rating = state.services.catalog.rating_summary(id).await?;
    Ok(success_response(ProductDetail { product, rating }))
}

async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ReviewModel>>, ServiceError> {
    let reviews = state.services.reviews.list_for_product(id).await?;
    Ok(Json(reviews))
}

#[derive(Debug, Deserialize, Validate)]
struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    rating: i32,
    #[validate(length(min = 1))]
    comment: String,
}

async fn create_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    user: CurrentUser,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let review = state
        .services
        .reviews
        .create_review(user.user_id, id, payload.rating, payload.comment)
        .await?;
    Ok(created_response(review))
}
