//! Gateway callback idempotency: success and failure callbacks apply
//! exactly once, and anything after settlement is an acknowledged no-op.

mod common;

use assert_matches::assert_matches;
use common::TestHarness;
use rust_decimal_macros::dec;
use uuid::Uuid;

use storefront_api::cart::Cart;
use storefront_api::entities::order::{OrderStatus, PaymentMethod};
use storefront_api::errors::ServiceError;
use storefront_api::events::Event;
use storefront_api::services::checkout::ShippingInfo;
use storefront_api::services::payments::CallbackOutcome;

fn shipping() -> ShippingInfo {
    ShippingInfo {
        full_name: "Grace Hopper".to_string(),
        address: "1 Harbor Dr".to_string(),
        city: "Arlington".to_string(),
        phone: "555-0199".to_string(),
    }
}

async fn place_gateway_order(h: &TestHarness, user: Uuid) -> Uuid {
    let product = h.seed_product("Laptop", dec!(500)).await;
    let mut cart = Cart::new();
    cart.add(product.id, 1);
    let order = h
        .services
        .checkout
        .place_order(user, &cart, shipping(), PaymentMethod::Gateway, None)
        .await
        .expect("gateway checkout should succeed");
    assert_eq!(order.status, OrderStatus::AwaitingPayment);
    order.id
}

#[tokio::test]
async fn concurrent_intent_requests_agree_on_one_id() {
    let h = TestHarness::new().await;
    let user = Uuid::new_v4();
    let order_id = place_gateway_order(&h, user).await;

    let (a, b) = tokio::join!(
        h.services.payments.create_intent(user, order_id),
        h.services.payments.create_intent(user, order_id),
    );
    let a = a.unwrap();
    let b = b.unwrap();
    assert_eq!(a.preference_id, b.preference_id);

    let order = h.services.orders.get_order(user, order_id).await.unwrap();
    assert_eq!(order.gateway_preference_id.as_deref(), Some(a.preference_id.as_str()));
}

#[tokio::test]
async fn concurrent_success_callbacks_settle_exactly_once() {
    let mut h = TestHarness::new().await;
    let user = Uuid::new_v4();
    let order_id = place_gateway_order(&h, user).await;

    let (a, b) = tokio::join!(
        h.services.payments.confirm_success(user, order_id),
        h.services.payments.confirm_success(user, order_id),
    );
    let outcomes = [a.unwrap(), b.unwrap()];
    let applied = outcomes
        .iter()
        .filter(|o| **o == CallbackOutcome::Applied)
        .count();
    assert_eq!(applied, 1);

    let order = h.services.orders.get_order(user, order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Paid);

    // One notification event, not two.
    assert_matches!(h.events.try_recv(), Ok(Event::PaymentReceived { .. }));
    assert!(h.events.try_recv().is_err());
}

#[tokio::test]
async fn intent_creation_is_stable_across_calls() {
    let h = TestHarness::new().await;
    let user = Uuid::new_v4();
    let order_id = place_gateway_order(&h, user).await;

    let first = h
        .services
        .payments
        .create_intent(user, order_id)
        .await
        .unwrap();
    let second = h
        .services
        .payments
        .create_intent(user, order_id)
        .await
        .unwrap();

    assert!(first.preference_id.starts_with("PREF-"));
    assert_eq!(first.preference_id, second.preference_id);
}

#[tokio::test]
async fn intent_requires_gateway_payment_method() {
    let h = TestHarness::new().await;
    let user = Uuid::new_v4();
    let product = h.seed_product("Cable", dec!(10)).await;

    let mut cart = Cart::new();
    cart.add(product.id, 1);
    let order = h
        .services
        .checkout
        .place_order(user, &cart, shipping(), PaymentMethod::Cash, None)
        .await
        .unwrap();

    let result = h.services.payments.create_intent(user, order.id).await;
    assert_matches!(result, Err(ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn success_callback_applies_once() {
    let mut h = TestHarness::new().await;
    let user = Uuid::new_v4();
    let order_id = place_gateway_order(&h, user).await;

    let outcome = h
        .services
        .payments
        .confirm_success(user, order_id)
        .await
        .unwrap();
    assert_eq!(outcome, CallbackOutcome::Applied);

    let order = h.services.orders.get_order(user, order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
    assert!(order.gateway_payment_id.is_some());

    let event = h.events.try_recv().expect("payment event expected");
    assert_matches!(event, Event::PaymentReceived { order_id: id, .. } if id == order_id);

    // Duplicate delivery acknowledges without side effects.
    let replay = h
        .services
        .payments
        .confirm_success(user, order_id)
        .await
        .unwrap();
    assert_eq!(replay, CallbackOutcome::AlreadySettled);
    assert!(h.events.try_recv().is_err());
}

#[tokio::test]
async fn failure_callback_cancels_once() {
    let mut h = TestHarness::new().await;
    let user = Uuid::new_v4();
    let order_id = place_gateway_order(&h, user).await;

    let outcome = h
        .services
        .payments
        .confirm_failure(user, order_id)
        .await
        .unwrap();
    assert_eq!(outcome, CallbackOutcome::Applied);

    let order = h.services.orders.get_order(user, order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);

    let event = h.events.try_recv().expect("failure event expected");
    assert_matches!(event, Event::PaymentFailed { order_id: id, .. } if id == order_id);

    // A late success for a cancelled order must not resurrect it.
    let late = h
        .services
        .payments
        .confirm_success(user, order_id)
        .await
        .unwrap();
    assert_eq!(late, CallbackOutcome::AlreadySettled);
    let order = h.services.orders.get_order(user, order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn callback_for_unknown_order_is_acknowledged() {
    let h = TestHarness::new().await;
    let outcome = h
        .services
        .payments
        .confirm_success(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(outcome, CallbackOutcome::AlreadySettled);
}

#[tokio::test]
async fn callbacks_enforce_ownership() {
    let h = TestHarness::new().await;
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let order_id = place_gateway_order(&h, owner).await;

    let result = h.services.payments.confirm_success(stranger, order_id).await;
    assert_matches!(result, Err(ServiceError::Forbidden(_)));
}
