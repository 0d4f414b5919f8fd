#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use tokio::sync::mpsc;
use uuid::Uuid;

use axum::Router;
use storefront_api::cart::SessionStore;
use storefront_api::config::AppConfig;
use storefront_api::entities::coupon::{self, DiscountKind};
use storefront_api::entities::{product, CouponModel, ProductModel};
use storefront_api::events::{Event, EventSender};
use storefront_api::migrator::Migrator;
use storefront_api::services::AppServices;
use storefront_api::AppState;

/// Test harness backed by an in-memory SQLite database. Redis is never
/// reachable in this environment; session writes fail soft, which the
/// flows under test treat as non-fatal.
pub struct TestHarness {
    pub db: Arc<DatabaseConnection>,
    pub services: AppServices,
    pub events: mpsc::Receiver<Event>,
    event_sender: Arc<EventSender>,
    sessions: SessionStore,
    redis: Arc<redis::Client>,
}

impl TestHarness {
    pub async fn new() -> Self {
        // A single connection keeps the in-memory database alive and
        // shared across the whole test.
        let mut options = ConnectOptions::new("sqlite::memory:".to_string());
        options
            .max_connections(1)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(5))
            .sqlx_logging(false);

        let db = Database::connect(options)
            .await
            .expect("failed to open test database");
        Migrator::up(&db, None)
            .await
            .expect("failed to run migrations in tests");

        let db = Arc::new(db);
        let redis = Arc::new(
            redis::Client::open("redis://127.0.0.1:6379").expect("redis client construction"),
        );
        let sessions = SessionStore::new(redis.clone());

        let (tx, rx) = mpsc::channel(64);
        let event_sender = Arc::new(EventSender::new(tx));

        let services = AppServices::new(db.clone(), event_sender.clone(), sessions.clone());

        Self {
            db,
            services,
            events: rx,
            event_sender,
            sessions,
            redis,
        }
    }

    /// The full v1 API router over this harness's state, for
    /// request-level tests driven with `tower::ServiceExt::oneshot`.
    pub fn router(&self) -> Router {
        let config = AppConfig {
            database_url: "sqlite::memory:".to_string(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            log_level: "debug".to_string(),
            log_json: false,
            auto_migrate: false,
            cors_allowed_origins: None,
        };
        let state = Arc::new(AppState {
            db: self.db.clone(),
            config,
            event_sender: self.event_sender.clone(),
            services: self.services.clone(),
            sessions: self.sessions.clone(),
            redis: self.redis.clone(),
        });
        Router::new()
            .nest("/api/v1", storefront_api::api_v1_routes())
            .with_state(state)
    }

    pub async fn seed_product(&self, name: &str, price: Decimal) -> ProductModel {
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(format!("{} description", name)),
            price: Set(price),
            image_url: Set(None),
            category_id: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed product")
    }

    pub async fn seed_coupon(
        &self,
        code: &str,
        kind: DiscountKind,
        value: Decimal,
        min_purchase: Decimal,
        max_uses: i32,
    ) -> CouponModel {
        let now = Utc::now();
        coupon::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.to_string()),
            kind: Set(kind),
            value: Set(value),
            min_purchase: Set(min_purchase),
            max_uses: Set(max_uses),
            times_used: Set(0),
            valid_from: Set(now - ChronoDuration::days(1)),
            valid_until: Set(now + ChronoDuration::days(30)),
            active: Set(true),
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed coupon")
    }
}
