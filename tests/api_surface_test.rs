//! Request-level tests over the assembled router: routing, identity
//! extraction, and the JSON error envelope.

mod common;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use common::TestHarness;
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

#[tokio::test]
async fn status_endpoint_reports_service_name() {
    let h = TestHarness::new().await;
    let response = h
        .router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["service"], "storefront-api");
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn product_listing_and_detail_round_trip() {
    let h = TestHarness::new().await;
    let product = h.seed_product("Gaming Mouse", dec!(49)).await;

    let response = h
        .router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/products?search=gaming")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let response = h
        .router()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/products/{}", product.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;
    assert_eq!(detail["name"], "Gaming Mouse");
    assert_eq!(detail["rating"]["count"], 0);
}

#[tokio::test]
async fn unknown_product_returns_not_found_envelope() {
    let h = TestHarness::new().await;
    let response = h
        .router()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/products/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert!(json["error"].is_string());
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn order_history_requires_identity_header() {
    let h = TestHarness::new().await;
    let response = h
        .router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/orders")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn order_history_is_empty_for_new_user() {
    let h = TestHarness::new().await;
    let response = h
        .router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/orders")
                .header("x-user-id", Uuid::new_v4().to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}
