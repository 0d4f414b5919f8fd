use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::entities::{
    notification::{self, NotificationCategory},
    Notification, NotificationModel,
};
use crate::errors::ServiceError;

/// Most recent notifications returned per listing.
const LIST_LIMIT: u64 = 20;

/// Append-only notification sink. Writes happen from the event processing
/// loop, strictly after the transaction that triggered them committed.
#[derive(Clone)]
pub struct NotificationService {
    db: Arc<DatabaseConnection>,
}

impl NotificationService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Appends a notification. Callers treat failure as non-fatal.
    #[instrument(skip(self, title, message))]
    pub async fn notify(
        &self,
        user_id: Uuid,
        category: NotificationCategory,
        title: String,
        message: String,
    ) -> Result<NotificationModel, ServiceError> {
        let row = notification::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            category: Set(category),
            title: Set(title),
            message: Set(message),
            read: Set(false),
            created_at: Set(Utc::now()),
        };
        Ok(row.insert(&*self.db).await?)
    }

    /// Latest notifications for a user, newest first.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<NotificationModel>, ServiceError> {
        Ok(Notification::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .limit(LIST_LIMIT)
            .all(&*self.db)
            .await?)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        Ok(Notification::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::Read.eq(false))
            .count(&*self.db)
            .await?)
    }

    /// Marks one notification read. Owner-only; marking an already-read
    /// notification is a no-op.
    #[instrument(skip(self))]
    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<(), ServiceError> {
        let row = Notification::find_by_id(notification_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Notification {} not found", notification_id))
            })?;

        if row.user_id != user_id {
            return Err(ServiceError::Forbidden(
                "notification belongs to another user".to_string(),
            ));
        }

        if row.read {
            return Ok(());
        }

        let mut active: notification::ActiveModel = row.into();
        active.read = Set(true);
        active.update(&*self.db).await?;
        Ok(())
    }

    /// Marks everything read for a user. Idempotent by construction.
    #[instrument(skip(self))]
    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<(), ServiceError> {
        Notification::update_many()
            .col_expr(notification::Column::Read, Expr::value(true))
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::Read.eq(false))
            .exec(&*self.db)
            .await?;
        Ok(())
    }
}
