pub mod carts;
pub mod catalog;
pub mod checkout;
pub mod coupons;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod reviews;
pub mod wishlists;

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::cart::SessionStore;
use crate::events::EventSender;

/// Aggregated services shared through `AppState` with the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<catalog::CatalogService>,
    pub carts: Arc<carts::CartService>,
    pub coupons: Arc<coupons::CouponService>,
    pub checkout: Arc<checkout::CheckoutService>,
    pub orders: Arc<orders::OrderService>,
    pub payments: Arc<payments::PaymentService>,
    pub notifications: Arc<notifications::NotificationService>,
    pub reviews: Arc<reviews::ReviewService>,
    pub wishlists: Arc<wishlists::WishlistService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        sessions: SessionStore,
    ) -> Self {
        let catalog = Arc::new(catalog::CatalogService::new(db.clone()));
        let coupons = Arc::new(coupons::CouponService::new(db.clone()));
        let notifications = Arc::new(notifications::NotificationService::new(db.clone()));
        let carts = Arc::new(carts::CartService::new(
            sessions.clone(),
            catalog.clone(),
            coupons.clone(),
        ));
        let checkout = Arc::new(checkout::CheckoutService::new(
            db.clone(),
            event_sender.clone(),
            sessions.clone(),
            catalog.clone(),
            coupons.clone(),
        ));
        let orders = Arc::new(orders::OrderService::new(db.clone()));
        let payments = Arc::new(payments::PaymentService::new(
            db.clone(),
            event_sender.clone(),
            sessions,
        ));
        let reviews = Arc::new(reviews::ReviewService::new(db.clone(), event_sender));
        let wishlists = Arc::new(wishlists::WishlistService::new(db));

        Self {
            catalog,
            carts,
            coupons,
            checkout,
            orders,
            payments,
            notifications,
            reviews,
            wishlists,
        }
    }
}
