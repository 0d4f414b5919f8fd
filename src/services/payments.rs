use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::cart::SessionStore;
use crate::entities::{
    order::{self, OrderStatus, PaymentMethod},
    Order, OrderModel,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Simulated payment gateway collaborator. Creates payment intents for
/// orders awaiting payment and applies the gateway's asynchronous
/// success/failure callbacks. Both callbacks are idempotent: repeated
/// delivery, or delivery for an order already past `awaiting_payment`,
/// acknowledges without re-applying side effects.
#[derive(Clone)]
pub struct PaymentService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    sessions: SessionStore,
}

#[derive(Debug, Serialize)]
pub struct PaymentIntent {
    pub order_id: Uuid,
    pub preference_id: String,
}

/// Outcome of a callback; `Applied` means this delivery performed the
/// transition, `AlreadySettled` means it was a duplicate or late.
#[derive(Debug, PartialEq, Eq)]
pub enum CallbackOutcome {
    Applied,
    AlreadySettled,
}

impl PaymentService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        sessions: SessionStore,
    ) -> Self {
        Self {
            db,
            event_sender,
            sessions,
        }
    }

    /// Creates (or returns the existing) gateway payment intent for an
    /// order awaiting payment.
    #[instrument(skip(self))]
    pub async fn create_intent(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<PaymentIntent, ServiceError> {
        let order = self.owned_order(user_id, order_id).await?;

        if order.payment_method != PaymentMethod::Gateway {
            return Err(ServiceError::InvalidOperation(
                "order is not a gateway payment".to_string(),
            ));
        }
        if order.status != OrderStatus::AwaitingPayment {
            return Err(ServiceError::InvalidOperation(format!(
                "order is '{}', not awaiting payment",
                order.status.as_str()
            )));
        }

        if let Some(existing) = order.gateway_preference_id.clone() {
            return Ok(PaymentIntent {
                order_id,
                preference_id: existing,
            });
        }

        // Set the preference id only while the column is still empty, so
        // racing intent requests agree on a single id.
        let preference_id = format!("PREF-{}-{}", order_id.simple(), Utc::now().timestamp());
        let result = Order::update_many()
            .col_expr(
                order::Column::GatewayPreferenceId,
                Expr::value(preference_id.clone()),
            )
            .col_expr(order::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::GatewayPreferenceId.is_null())
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            let current = self.owned_order(user_id, order_id).await?;
            return current
                .gateway_preference_id
                .map(|existing| PaymentIntent {
                    order_id,
                    preference_id: existing,
                })
                .ok_or_else(|| {
                    ServiceError::InternalError(format!(
                        "order {} lost its payment intent",
                        order_id
                    ))
                });
        }

        info!("payment intent {} created for order {}", preference_id, order_id);
        Ok(PaymentIntent {
            order_id,
            preference_id,
        })
    }

    /// Gateway success callback: `awaiting_payment -> paid`, records the
    /// payment reference, emits the payment-received event, clears the
    /// session cart. Duplicate deliveries are acknowledged no-ops.
    #[instrument(skip(self))]
    pub async fn confirm_success(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<CallbackOutcome, ServiceError> {
        let txn = self.db.begin().await?;

        // Callbacks for orders we do not know are acknowledged, never
        // errored, so the gateway stops redelivering.
        let Some(order) = Order::find_by_id(order_id).one(&txn).await? else {
            warn!("success callback for unknown order {}, ignoring", order_id);
            return Ok(CallbackOutcome::AlreadySettled);
        };
        if order.user_id != user_id {
            return Err(ServiceError::Forbidden(
                "order belongs to another user".to_string(),
            ));
        }

        if order.status != OrderStatus::AwaitingPayment {
            // Duplicate or late callback; never re-apply side effects.
            info!(
                "success callback for order {} in state '{}', ignoring",
                order_id,
                order.status.as_str()
            );
            return Ok(CallbackOutcome::AlreadySettled);
        }

        // Conditional transition: concurrent deliveries serialize on this
        // statement and exactly one of them settles the order.
        let result = Order::update_many()
            .col_expr(order::Column::Status, Expr::value(OrderStatus::Paid))
            .col_expr(
                order::Column::GatewayPaymentId,
                Expr::value(format!("PAY-{}", Utc::now().timestamp_millis())),
            )
            .col_expr(order::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::Status.eq(OrderStatus::AwaitingPayment))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            info!(
                "success callback for order {} lost the settlement race, ignoring",
                order_id
            );
            return Ok(CallbackOutcome::AlreadySettled);
        }

        let user_id = order.user_id;
        let total = order.total;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::PaymentReceived {
                order_id,
                user_id,
                total,
            })
            .await;

        if let Err(e) = self.sessions.clear(user_id).await {
            warn!("order {} paid but session clear failed: {}", order_id, e);
        }

        info!("order {} paid", order_id);
        Ok(CallbackOutcome::Applied)
    }

    /// Gateway failure callback: `awaiting_payment -> cancelled`. Coupon
    /// usage is deliberately not rolled back (non-refundable attempt).
    #[instrument(skip(self))]
    pub async fn confirm_failure(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<CallbackOutcome, ServiceError> {
        let txn = self.db.begin().await?;

        let Some(order) = Order::find_by_id(order_id).one(&txn).await? else {
            warn!("failure callback for unknown order {}, ignoring", order_id);
            return Ok(CallbackOutcome::AlreadySettled);
        };
        if order.user_id != user_id {
            return Err(ServiceError::Forbidden(
                "order belongs to another user".to_string(),
            ));
        }

        if order.status != OrderStatus::AwaitingPayment {
            info!(
                "failure callback for order {} in state '{}', ignoring",
                order_id,
                order.status.as_str()
            );
            return Ok(CallbackOutcome::AlreadySettled);
        }

        let result = Order::update_many()
            .col_expr(order::Column::Status, Expr::value(OrderStatus::Cancelled))
            .col_expr(order::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::Status.eq(OrderStatus::AwaitingPayment))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            info!(
                "failure callback for order {} lost the settlement race, ignoring",
                order_id
            );
            return Ok(CallbackOutcome::AlreadySettled);
        }

        let user_id = order.user_id;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::PaymentFailed { order_id, user_id })
            .await;

        info!("order {} cancelled after payment failure", order_id);
        Ok(CallbackOutcome::Applied)
    }

    async fn owned_order(&self, user_id: Uuid, order_id: Uuid) -> Result<OrderModel, ServiceError> {
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
}
