use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entities::{
    order::{self, OrderStatus},
    Order, OrderItem, OrderItemModel, OrderModel,
};
use crate::errors::ServiceError;

/// Order access and lifecycle transitions. Every user-facing operation
/// checks ownership before touching the order.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Fetches an order, enforcing ownership.
    pub async fn get_order(&self, user_id: Uuid, order_id: Uuid) -> Result<OrderModel, ServiceError> {
        let order = Order::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if order.user_id != user_id {
            return Err(ServiceError::Forbidden(
                "order belongs to another user".to_string(),
            ));
        }
        Ok(order)
    }

    pub async fn get_order_with_items(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<(OrderModel, Vec<OrderItemModel>), ServiceError> {
        let order = self.get_order(user_id, order_id).await?;
        let items = order.find_related(OrderItem).all(&*self.db).await?;
        Ok((order, items))
    }

    /// Order history, newest first.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderModel>, ServiceError> {
        Ok(Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    /// Applies a status transition, rejecting anything outside the
    /// transition table. Ownership is checked first.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn transition(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        next: OrderStatus,
    ) -> Result<OrderModel, ServiceError> {
        let txn = self.db.begin().await?;

        let order = Order::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if order.user_id != user_id {
            return Err(ServiceError::Forbidden(
                "order belongs to another user".to_string(),
            ));
        }

        let current = order.status;
        if !current.can_transition_to(next) {
            return Err(ServiceError::InvalidTransition {
                from: current.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        let mut active: order::ActiveModel = order.into();
        active.status = Set(next);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            "order {} moved from '{}' to '{}'",
            order_id,
            current.as_str(),
            next.as_str()
        );
        Ok(updated)
    }
}
