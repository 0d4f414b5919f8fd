use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::entities::{wishlist, Product, Wishlist, WishlistModel};
use crate::errors::ServiceError;

/// Per-user wishlist with toggle semantics.
#[derive(Clone)]
pub struct WishlistService {
    db: Arc<DatabaseConnection>,
}

impl WishlistService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Adds the product if absent, removes it if present. Returns whether
    /// the product ended up on the list.
    #[instrument(skip(self))]
    pub async fn toggle(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, ServiceError> {
        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or(ServiceError::ProductNotFound(product_id))?;

        let existing = Wishlist::find()
            .filter(wishlist::Column::UserId.eq(user_id))
            .filter(wishlist::Column::ProductId.eq(product_id))
            .one(&*self.db)
            .await?;

        match existing {
            Some(entry) => {
                entry.delete(&*self.db).await?;
                Ok(false)
            }
            None => {
                let row = wishlist::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    product_id: Set(product_id),
                    added_at: Set(Utc::now()),
                };
                row.insert(&*self.db).await?;
                Ok(true)
            }
        }
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<WishlistModel>, ServiceError> {
        Ok(Wishlist::find()
            .filter(wishlist::Column::UserId.eq(user_id))
            .order_by_desc(wishlist::Column::AddedAt)
            .all(&*self.db)
            .await?)
    }
}
