use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::cart::{CartSession, SessionStore};
use crate::errors::ServiceError;
use crate::services::catalog::CatalogService;
use crate::services::coupons::CouponService;

/// Session cart operations. The cart itself is an ephemeral value object
/// in the session store; every read prices it fresh against the catalog.
#[derive(Clone)]
pub struct CartService {
    sessions: SessionStore,
    catalog: Arc<CatalogService>,
    coupons: Arc<CouponService>,
}

impl CartService {
    pub fn new(
        sessions: SessionStore,
        catalog: Arc<CatalogService>,
        coupons: Arc<CouponService>,
    ) -> Self {
        Self {
            sessions,
            catalog,
            coupons,
        }
    }

    /// Adds quantity to a cart line, creating it if needed. The product
    /// must exist in the catalog.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartView, ServiceError> {
        if quantity < 1 {
            return Err(ServiceError::ValidationError(
                "quantity must be at least 1".to_string(),
            ));
        }
        self.catalog.get_product(product_id).await?;

        let mut session = self.sessions.load(user_id).await?;
        session.cart.add(product_id, quantity);
        self.sessions.save(user_id, &session).await?;

        info!("added {}x {} to cart of {}", quantity, product_id, user_id);
        self.price(&session).await
    }

    /// Sets an absolute quantity; zero or negative removes the line.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartView, ServiceError> {
        let mut session = self.sessions.load(user_id).await?;
        session.cart.set_quantity(product_id, quantity);
        self.sessions.save(user_id, &session).await?;
        self.price(&session).await
    }

    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<CartView, ServiceError> {
        let mut session = self.sessions.load(user_id).await?;
        session.cart.remove(product_id);
        self.sessions.save(user_id, &session).await?;
        self.price(&session).await
    }

    /// Empties the cart and drops any applied coupon.
    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: Uuid) -> Result<(), ServiceError> {
        self.sessions.clear(user_id).await
    }

    /// Prices the cart, applying the session coupon read-only.
    pub async fn view(&self, user_id: Uuid) -> Result<CartView, ServiceError> {
        let session = self.sessions.load(user_id).await?;
        self.price(&session).await
    }

    /// Explicit coupon application. Unlike checkout, this path reports
    /// `CouponNotFound` / `CouponInvalid` to the caller.
    #[instrument(skip(self))]
    pub async fn apply_coupon(&self, user_id: Uuid, code: &str) -> Result<CartView, ServiceError> {
        let mut session = self.sessions.load(user_id).await?;
        if session.cart.is_empty() {
            return Err(ServiceError::EmptyCart);
        }

        let coupon = self.coupons.resolve_for_apply(code).await?;
        session.coupon_code = Some(coupon.code.clone());
        self.sessions.save(user_id, &session).await?;

        info!("coupon {} applied for {}", coupon.code, user_id);
        self.price(&session).await
    }

    #[instrument(skip(self))]
    pub async fn remove_coupon(&self, user_id: Uuid) -> Result<CartView, ServiceError> {
        let mut session = self.sessions.load(user_id).await?;
        session.coupon_code = None;
        self.sessions.save(user_id, &session).await?;
        self.price(&session).await
    }

    /// Resolves every line against the catalog and computes totals. The
    /// coupon degrades silently here: missing, invalid, or below-minimum
    /// coupons contribute zero discount and are reported as not applied.
    async fn price(&self, session: &CartSession) -> Result<CartView, ServiceError> {
        let mut lines = Vec::with_capacity(session.cart.len());
        let mut subtotal = Decimal::ZERO;

        for (product_id, quantity) in session.cart.lines() {
            let product = self.catalog.get_product(product_id).await?;
            let line_subtotal = product.price * Decimal::from(quantity);
            subtotal += line_subtotal;
            lines.push(CartLine {
                product_id,
                product_name: product.name,
                unit_price: product.price,
                quantity,
                subtotal: line_subtotal,
            });
        }

        let mut discount = Decimal::ZERO;
        let mut applied_coupon = None;
        if let Some(code) = session.coupon_code.as_deref() {
            if let Some(coupon) = self.coupons.find_by_code(code).await? {
                if coupon.is_valid(Utc::now()) && subtotal >= coupon.min_purchase {
                    discount = coupon.discount_for(subtotal);
                    applied_coupon = Some(coupon.code);
                }
            }
        }

        Ok(CartView {
            lines,
            subtotal,
            coupon_code: applied_coupon,
            discount,
            total: subtotal - discount,
        })
    }
}

/// Cart priced against the current catalog.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub subtotal: Decimal,
    pub coupon_code: Option<String>,
    pub discount: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CartLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub subtotal: Decimal,
}
