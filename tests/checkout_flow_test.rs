//! End-to-end checkout flows against an in-memory database: coupon
//! application, silent degradation, and the immediate vs gateway payment
//! split.

mod common;

use assert_matches::assert_matches;
use common::TestHarness;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

use storefront_api::cart::Cart;
use storefront_api::entities::coupon::DiscountKind;
use storefront_api::entities::order::{OrderStatus, PaymentMethod};
use storefront_api::entities::{product, Coupon, OrderItem};
use storefront_api::errors::ServiceError;
use storefront_api::events::Event;
use storefront_api::services::checkout::ShippingInfo;

fn shipping() -> ShippingInfo {
    ShippingInfo {
        full_name: "Ada Lovelace".to_string(),
        address: "1 Analytical Way".to_string(),
        city: "London".to_string(),
        phone: "555-0100".to_string(),
    }
}

#[tokio::test]
async fn cash_checkout_confirms_and_snapshots_prices() {
    let mut h = TestHarness::new().await;
    let user = Uuid::new_v4();
    let product = h.seed_product("Keyboard", dec!(100)).await;

    let mut cart = Cart::new();
    cart.add(product.id, 2);

    let order = h
        .services
        .checkout
        .place_order(user, &cart, shipping(), PaymentMethod::Cash, None)
        .await
        .expect("checkout should succeed");

    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.subtotal, dec!(200));
    assert_eq!(order.discount, dec!(0));
    assert_eq!(order.total, dec!(200));

    let items = OrderItem::find().all(&*h.db).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].order_id, order.id);
    assert_eq!(items[0].unit_price, dec!(100));
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].product_name, "Keyboard");

    // Confirmation event was emitted after the commit.
    let event = h.events.try_recv().expect("confirmation event expected");
    assert_matches!(event, Event::OrderConfirmed { order_id, .. } if order_id == order.id);
}

#[tokio::test]
async fn percent_coupon_discounts_and_consumes_a_use() {
    let mut h = TestHarness::new().await;
    let user = Uuid::new_v4();
    let product = h.seed_product("Monitor", dec!(130)).await;
    let coupon = h
        .seed_coupon("PERCENT10", DiscountKind::Percent, dec!(10), dec!(50), 5)
        .await;

    let mut cart = Cart::new();
    cart.add(product.id, 1);

    let order = h
        .services
        .checkout
        .place_order(user, &cart, shipping(), PaymentMethod::Card, Some("percent10"))
        .await
        .unwrap();

    assert_eq!(order.subtotal, dec!(130));
    assert_eq!(order.discount, dec!(13));
    assert_eq!(order.total, dec!(117));
    assert_eq!(order.coupon_id, Some(coupon.id));

    let stored = Coupon::find_by_id(coupon.id)
        .one(&*h.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.times_used, 1);

    let _ = h.events.try_recv().expect("confirmation event expected");
}

#[tokio::test]
async fn coupon_below_minimum_degrades_to_full_price() {
    let h = TestHarness::new().await;
    let user = Uuid::new_v4();
    let product = h.seed_product("Mouse", dec!(20)).await;
    let coupon = h
        .seed_coupon("FIXED5", DiscountKind::Fixed, dec!(5), dec!(50), 5)
        .await;

    let mut cart = Cart::new();
    cart.add(product.id, 1);

    let order = h
        .services
        .checkout
        .place_order(user, &cart, shipping(), PaymentMethod::Cash, Some("FIXED5"))
        .await
        .unwrap();

    // No discount, no coupon reference, no usage consumed.
    assert_eq!(order.discount, dec!(0));
    assert_eq!(order.total, dec!(20));
    assert_eq!(order.coupon_id, None);

    let stored = Coupon::find_by_id(coupon.id)
        .one(&*h.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.times_used, 0);
}

#[tokio::test]
async fn unknown_coupon_code_is_ignored_at_checkout() {
    let h = TestHarness::new().await;
    let user = Uuid::new_v4();
    let product = h.seed_product("Webcam", dec!(60)).await;

    let mut cart = Cart::new();
    cart.add(product.id, 1);

    let order = h
        .services
        .checkout
        .place_order(user, &cart, shipping(), PaymentMethod::Cash, Some("NOPE"))
        .await
        .unwrap();

    assert_eq!(order.discount, dec!(0));
    assert_eq!(order.total, dec!(60));
}

#[tokio::test]
async fn exhausted_coupon_degrades_instead_of_failing() {
    let h = TestHarness::new().await;
    let user = Uuid::new_v4();
    let product = h.seed_product("Desk", dec!(100)).await;
    let coupon = h
        .seed_coupon("LAST1", DiscountKind::Fixed, dec!(10), dec!(0), 1)
        .await;

    let mut cart = Cart::new();
    cart.add(product.id, 1);

    let first = h
        .services
        .checkout
        .place_order(user, &cart, shipping(), PaymentMethod::Cash, Some("LAST1"))
        .await
        .unwrap();
    assert_eq!(first.discount, dec!(10));

    let second = h
        .services
        .checkout
        .place_order(user, &cart, shipping(), PaymentMethod::Cash, Some("LAST1"))
        .await
        .unwrap();
    assert_eq!(second.discount, dec!(0));
    assert_eq!(second.coupon_id, None);

    let stored = Coupon::find_by_id(coupon.id)
        .one(&*h.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.times_used, 1);
}

#[tokio::test]
async fn order_totals_survive_later_price_changes() {
    let h = TestHarness::new().await;
    let user = Uuid::new_v4();
    let product = h.seed_product("Camera", dec!(250)).await;

    let mut cart = Cart::new();
    cart.add(product.id, 2);

    let order = h
        .services
        .checkout
        .place_order(user, &cart, shipping(), PaymentMethod::Cash, None)
        .await
        .unwrap();
    assert_eq!(order.total, dec!(500));

    let mut repriced: product::ActiveModel = product.into();
    repriced.price = Set(dec!(999));
    repriced.update(&*h.db).await.unwrap();

    let (stored, items) = h
        .services
        .orders
        .get_order_with_items(user, order.id)
        .await
        .unwrap();
    assert_eq!(stored.subtotal, dec!(500));
    assert_eq!(stored.total, dec!(500));
    assert_eq!(items[0].unit_price, dec!(250));
}

#[tokio::test]
async fn racing_checkouts_never_exceed_the_coupon_cap() {
    let h = TestHarness::new().await;
    let product = h.seed_product("Tablet", dec!(100)).await;
    let coupon = h
        .seed_coupon("RACE", DiscountKind::Fixed, dec!(10), dec!(0), 2)
        .await;

    let mut cart = Cart::new();
    cart.add(product.id, 1);

    let run = |user: Uuid| {
        h.services.checkout.place_order(
            user,
            &cart,
            shipping(),
            PaymentMethod::Cash,
            Some("RACE"),
        )
    };
    let (a, b, c, d) = tokio::join!(
        run(Uuid::new_v4()),
        run(Uuid::new_v4()),
        run(Uuid::new_v4()),
        run(Uuid::new_v4()),
    );

    let orders = [a.unwrap(), b.unwrap(), c.unwrap(), d.unwrap()];
    let discounted = orders.iter().filter(|o| o.discount == dec!(10)).count();
    let full_price = orders.iter().filter(|o| o.discount == dec!(0)).count();
    assert_eq!(discounted, 2);
    assert_eq!(full_price, 2);

    let stored = Coupon::find_by_id(coupon.id)
        .one(&*h.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.times_used, stored.max_uses);
}

#[tokio::test]
async fn empty_cart_is_rejected() {
    let h = TestHarness::new().await;
    let result = h
        .services
        .checkout
        .place_order(
            Uuid::new_v4(),
            &Cart::new(),
            shipping(),
            PaymentMethod::Cash,
            None,
        )
        .await;
    assert_matches!(result, Err(ServiceError::EmptyCart));
}

#[tokio::test]
async fn vanished_product_fails_the_whole_checkout() {
    let h = TestHarness::new().await;
    let missing = Uuid::new_v4();

    let mut cart = Cart::new();
    cart.add(missing, 1);

    let result = h
        .services
        .checkout
        .place_order(
            Uuid::new_v4(),
            &cart,
            shipping(),
            PaymentMethod::Cash,
            None,
        )
        .await;
    assert_matches!(result, Err(ServiceError::ProductNotFound(id)) if id == missing);
}

#[tokio::test]
async fn gateway_checkout_awaits_payment_without_confirmation() {
    let mut h = TestHarness::new().await;
    let user = Uuid::new_v4();
    let product = h.seed_product("Chair", dec!(80)).await;

    let mut cart = Cart::new();
    cart.add(product.id, 1);

    let order = h
        .services
        .checkout
        .place_order(user, &cart, shipping(), PaymentMethod::Gateway, None)
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::AwaitingPayment);
    // No confirmation side effects until the gateway callback lands.
    assert!(h.events.try_recv().is_err());
}
