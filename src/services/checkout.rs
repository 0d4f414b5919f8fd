use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::cart::{Cart, SessionStore};
use crate::entities::{
    order::{self, OrderStatus, PaymentMethod},
    order_item, CouponModel, OrderModel, ProductModel,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::catalog::CatalogService;
use crate::services::coupons::CouponService;

/// Checkout orchestrator: turns a session cart into a durable order,
/// exactly once. The order row, its line items, and the coupon usage
/// increment commit as a single transaction; notifications and the
/// cart-clear happen strictly after the commit and can never undo it.
#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    sessions: SessionStore,
    catalog: Arc<CatalogService>,
    coupons: Arc<CouponService>,
}

/// Shipping snapshot collected at checkout. Copied verbatim onto the
/// order; later profile edits never touch placed orders.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ShippingInfo {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(length(min = 1, max = 300))]
    pub address: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 50))]
    pub phone: String,
}

struct CartSnapshot {
    lines: Vec<(ProductModel, i32)>,
    subtotal: Decimal,
}

impl CheckoutService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        sessions: SessionStore,
        catalog: Arc<CatalogService>,
        coupons: Arc<CouponService>,
    ) -> Self {
        Self {
            db,
            event_sender,
            sessions,
            catalog,
            coupons,
        }
    }

    /// Places an order from an explicit cart. Fails fast on an empty cart
    /// or a cart line whose product no longer exists; a missing or
    /// invalid coupon is not an error here, it simply applies no
    /// discount. Gateway orders come back in `awaiting_payment` with the
    /// cart intact; all other payment methods confirm immediately, emit
    /// the confirmation event, and clear the session.
    #[instrument(skip(self, cart, shipping), fields(user_id = %user_id))]
    pub async fn place_order(
        &self,
        user_id: Uuid,
        cart: &Cart,
        shipping: ShippingInfo,
        payment_method: PaymentMethod,
        coupon_code: Option<&str>,
    ) -> Result<OrderModel, ServiceError> {
        if cart.is_empty() {
            return Err(ServiceError::EmptyCart);
        }
        shipping.validate()?;

        // Snapshot unit prices before anything durable happens.
        let snapshot = self.snapshot_cart(cart).await?;

        let txn = self.db.begin().await?;

        // Resolve and consume the coupon inside the transaction. The
        // conditional increment serializes racing checkouts on the same
        // code; losing the race degrades to full price, never an error.
        let applied_coupon = self
            .consume_coupon(&txn, coupon_code, snapshot.subtotal)
            .await?;

        let discount = applied_coupon
            .as_ref()
            .map(|c| c.discount_for(snapshot.subtotal))
            .unwrap_or(Decimal::ZERO);
        let total = snapshot.subtotal - discount;

        let order = self
            .insert_order(
                &txn,
                user_id,
                &snapshot,
                shipping,
                payment_method,
                applied_coupon.as_ref().map(|c| c.id),
                discount,
                total,
            )
            .await?;

        txn.commit().await?;

        // Post-commit side effects only from here on.
        if order.status == OrderStatus::Confirmed {
            self.event_sender
                .send_or_log(Event::OrderConfirmed {
                    order_id: order.id,
                    user_id,
                    total: order.total,
                })
                .await;

            if let Err(e) = self.sessions.clear(user_id).await {
                warn!("order {} placed but session clear failed: {}", order.id, e);
            }
        }

        info!(
            "order {} placed by {}: subtotal=${} discount=${} total=${} ({})",
            order.id,
            user_id,
            order.subtotal,
            order.discount,
            order.total,
            order.status.as_str()
        );
        Ok(order)
    }

    /// Resolves every cart line to `(product, quantity)` at its current
    /// price and sums the subtotal.
    async fn snapshot_cart(&self, cart: &Cart) -> Result<CartSnapshot, ServiceError> {
        let mut lines = Vec::with_capacity(cart.len());
        let mut subtotal = Decimal::ZERO;
        for (product_id, quantity) in cart.lines() {
            let product = self.catalog.get_product(product_id).await?;
            subtotal += product.price * Decimal::from(quantity);
            lines.push((product, quantity));
        }
        Ok(CartSnapshot { lines, subtotal })
    }

    /// Returns the coupon that was actually consumed, if any. Every
    /// degradation path (unknown code, invalid, below minimum, exhausted
    /// under contention) yields `None`.
    async fn consume_coupon(
        &self,
        txn: &DatabaseTransaction,
        coupon_code: Option<&str>,
        subtotal: Decimal,
    ) -> Result<Option<CouponModel>, ServiceError> {
        let Some(code) = coupon_code else {
            return Ok(None);
        };

        let Some(coupon) = self.coupons.find_by_code_on(txn, code).await? else {
            warn!("checkout with unknown coupon code {:?}, ignoring", code);
            return Ok(None);
        };

        if !coupon.is_valid(Utc::now()) || subtotal < coupon.min_purchase {
            return Ok(None);
        }

        if self.coupons.try_consume(txn, &coupon).await? {
            Ok(Some(coupon))
        } else {
            Ok(None)
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert_order(
        &self,
        txn: &DatabaseTransaction,
        user_id: Uuid,
        snapshot: &CartSnapshot,
        shipping: ShippingInfo,
        payment_method: PaymentMethod,
        coupon_id: Option<Uuid>,
        discount: Decimal,
        total: Decimal,
    ) -> Result<OrderModel, ServiceError> {
        let order_id = Uuid::new_v4();
        let now = Utc::now();

        // Orders are born pending and move through the transition table
        // even inside the creating transaction.
        let initial = OrderStatus::Pending;
        let target = if payment_method.is_immediate() {
            OrderStatus::Confirmed
        } else {
            OrderStatus::AwaitingPayment
        };
        debug_assert!(initial.can_transition_to(target));

        let order = order::ActiveModel {
            id: Set(order_id),
            user_id: Set(user_id),
            status: Set(target),
            full_name: Set(shipping.full_name),
            address: Set(shipping.address),
            city: Set(shipping.city),
            phone: Set(shipping.phone),
            payment_method: Set(payment_method),
            gateway_preference_id: Set(None),
            gateway_payment_id: Set(None),
            coupon_id: Set(coupon_id),
            discount: Set(discount),
            subtotal: Set(snapshot.subtotal),
            total: Set(total),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let order = order.insert(txn).await?;

        for (product, quantity) in &snapshot.lines {
            let item = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(product.id),
                product_name: Set(product.name.clone()),
                quantity: Set(*quantity),
                unit_price: Set(product.price),
            };
            item.insert(txn).await?;
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipping_info_rejects_blank_fields() {
        let shipping = ShippingInfo {
            full_name: "".to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            phone: "555-0100".to_string(),
        };
        assert!(shipping.validate().is_err());
    }

    #[test]
    fn shipping_info_accepts_complete_input() {
        let shipping = ShippingInfo {
            full_name: "Ada Lovelace".to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            phone: "555-0100".to_string(),
        };
        assert!(shipping.validate().is_ok());
    }
}
