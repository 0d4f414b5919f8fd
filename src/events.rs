use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

use crate::entities::notification::NotificationCategory;
use crate::services::notifications::NotificationService;

/// Events emitted after durable writes commit. The processing loop turns
/// them into notifications; a failure there is logged and never propagates
/// back into the transaction that produced the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderConfirmed {
        order_id: Uuid,
        user_id: Uuid,
        total: Decimal,
    },
    PaymentReceived {
        order_id: Uuid,
        user_id: Uuid,
        total: Decimal,
    },
    PaymentFailed {
        order_id: Uuid,
        user_id: Uuid,
    },
    ReviewPosted {
        product_id: Uuid,
        user_id: Uuid,
        rating: i32,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Fire-and-forget send. Event delivery is best effort; a full or
    /// closed channel must not fail the caller's request.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            error!("event dropped: {}", e);
        }
    }
}

/// Event processing loop, spawned once from `main`. Runs until every
/// `EventSender` is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, notifications: Arc<NotificationService>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        let result = match &event {
            Event::OrderConfirmed {
                order_id,
                user_id,
                total,
            } => {
                notifications
                    .notify(
                        *user_id,
                        NotificationCategory::Order,
                        format!("Order {} confirmed", short_ref(order_id)),
                        format!("Your order for ${} has been confirmed. Thank you for your purchase!", total),
                    )
                    .await
            }
            Event::PaymentReceived {
                order_id,
                user_id,
                total,
            } => {
                notifications
                    .notify(
                        *user_id,
                        NotificationCategory::Order,
                        format!("Payment received - order {}", short_ref(order_id)),
                        format!("Your payment of ${} was processed successfully.", total),
                    )
                    .await
            }
            Event::PaymentFailed { order_id, user_id } => {
                notifications
                    .notify(
                        *user_id,
                        NotificationCategory::Order,
                        format!("Payment failed - order {}", short_ref(order_id)),
                        "The payment was rejected. Please try again.".to_string(),
                    )
                    .await
            }
            Event::ReviewPosted {
                product_id,
                user_id,
                rating,
            } => {
                notifications
                    .notify(
                        *user_id,
                        NotificationCategory::Review,
                        "Thanks for your review!".to_string(),
                        format!("Your {}-star review of product {} is now live.", rating, short_ref(product_id)),
                    )
                    .await
            }
        };

        // Notification failure is non-fatal: the order already stands.
        if let Err(e) = result {
            error!("failed to process event {:?}: {}", event, e);
        }
    }

    info!("Event processing loop stopped");
}

fn short_ref(id: &Uuid) -> String {
    id.to_string()[..8].to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_or_log_does_not_fail_on_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        // Must not panic or error out of the caller.
        sender
            .send_or_log(Event::PaymentFailed {
                order_id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
            })
            .await;
    }

    #[test]
    fn short_ref_is_uppercase_prefix() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(short_ref(&id), "550E8400");
    }
}
