use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Session lifetime for abandoned carts, in seconds (30 days).
const SESSION_TTL_SECS: usize = 30 * 24 * 60 * 60;

/// Ephemeral shopping cart: product id -> quantity. Never persisted in the
/// durable store; the checkout orchestrator receives it as an explicit
/// input. Prices are not kept here, they are looked up against the catalog
/// on every read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: BTreeMap<Uuid, i32>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates quantity onto an existing line. Non-positive results
    /// remove the line entirely.
    pub fn add(&mut self, product_id: Uuid, quantity: i32) {
        let next = self.items.get(&product_id).copied().unwrap_or(0) + quantity;
        self.set_quantity(product_id, next);
    }

    /// Sets a line to an absolute quantity; zero or negative removes it.
    pub fn set_quantity(&mut self, product_id: Uuid, quantity: i32) {
        if quantity > 0 {
            self.items.insert(product_id, quantity);
        } else {
            self.items.remove(&product_id);
        }
    }

    pub fn remove(&mut self, product_id: Uuid) {
        self.items.remove(&product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// (product id, quantity) pairs in stable order.
    pub fn lines(&self) -> impl Iterator<Item = (Uuid, i32)> + '_ {
        self.items.iter().map(|(id, qty)| (*id, *qty))
    }
}

/// Everything the storefront keeps per session: the cart and the coupon
/// code applied to it, if any.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartSession {
    pub cart: Cart,
    pub coupon_code: Option<String>,
}

/// Redis-backed store for [`CartSession`] blobs, keyed by user id. The
/// durable database never sees cart state.
#[derive(Clone)]
pub struct SessionStore {
    redis: Arc<redis::Client>,
}

impl SessionStore {
    pub fn new(redis: Arc<redis::Client>) -> Self {
        Self { redis }
    }

    fn key(user_id: Uuid) -> String {
        format!("storefront:session:{}", user_id)
    }

    #[instrument(skip(self))]
    pub async fn load(&self, user_id: Uuid) -> Result<CartSession, ServiceError> {
        let mut conn = self.redis.get_tokio_connection_manager().await?;
        let raw: Option<String> = conn.get(Self::key(user_id)).await?;
        match raw {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| ServiceError::CacheError(format!("corrupt session blob: {}", e))),
            None => Ok(CartSession::default()),
        }
    }

    #[instrument(skip(self, session))]
    pub async fn save(&self, user_id: Uuid, session: &CartSession) -> Result<(), ServiceError> {
        let mut conn = self.redis.get_tokio_connection_manager().await?;
        let json = serde_json::to_string(session)
            .map_err(|e| ServiceError::CacheError(format!("serialize session: {}", e)))?;
        conn.set_ex::<_, _, ()>(Self::key(user_id), json, SESSION_TTL_SECS)
            .await?;
        Ok(())
    }

    /// Drops the whole session (cart and applied coupon). Idempotent, so a
    /// repeated payment callback can call it again harmlessly.
    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: Uuid) -> Result<(), ServiceError> {
        let mut conn = self.redis.get_tokio_connection_manager().await?;
        conn.del::<_, ()>(Self::key(user_id)).await?;
        Ok(())
    }
}
