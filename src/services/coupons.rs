use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::entities::{coupon, Coupon, CouponModel};
use crate::errors::ServiceError;

/// Coupon lookup and consumption. Validity and discount math live on
/// [`coupon::Model`] as pure functions; this service owns the durable
/// side: code resolution and the transactional usage increment.
#[derive(Clone)]
pub struct CouponService {
    db: Arc<DatabaseConnection>,
}

impl CouponService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Case-insensitive lookup; returns `None` for unknown codes.
    #[instrument(skip(self))]
    pub async fn find_by_code(&self, code: &str) -> Result<Option<CouponModel>, ServiceError> {
        self.find_by_code_on(&*self.db, code).await
    }

    /// Lookup on an arbitrary connection so the checkout transaction can
    /// resolve the coupon inside its own isolation scope.
    pub async fn find_by_code_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        code: &str,
    ) -> Result<Option<CouponModel>, ServiceError> {
        let normalized = normalize_code(code);
        Ok(Coupon::find()
            .filter(coupon::Column::Code.eq(normalized))
            .one(conn)
            .await?)
    }

    /// Explicit "apply coupon" entry point: unknown codes and invalid
    /// coupons are distinct errors here, unlike during checkout where both
    /// silently degrade to zero discount.
    #[instrument(skip(self))]
    pub async fn resolve_for_apply(&self, code: &str) -> Result<CouponModel, ServiceError> {
        let normalized = normalize_code(code);
        let coupon = self
            .find_by_code(&normalized)
            .await?
            .ok_or_else(|| ServiceError::CouponNotFound(normalized.clone()))?;

        if !coupon.is_valid(Utc::now()) {
            return Err(ServiceError::CouponInvalid(normalized));
        }
        Ok(coupon)
    }

    /// Consumes one use of the coupon with a conditional UPDATE:
    /// `times_used` is incremented only while it is still below
    /// `max_uses`. Racing checkouts serialize on this statement, so the
    /// cap can never be exceeded; a zero-row result means the coupon was
    /// exhausted by a concurrent checkout and the caller must degrade to
    /// no discount.
    pub async fn try_consume<C: ConnectionTrait>(
        &self,
        conn: &C,
        coupon: &CouponModel,
    ) -> Result<bool, ServiceError> {
        let result = Coupon::update_many()
            .col_expr(
                coupon::Column::TimesUsed,
                Expr::col(coupon::Column::TimesUsed).add(1),
            )
            .filter(coupon::Column::Id.eq(coupon.id))
            .filter(coupon::Column::TimesUsed.lt(coupon.max_uses))
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            debug!("coupon {} exhausted under contention", coupon.code);
        }
        Ok(result.rows_affected > 0)
    }
}

/// Codes are stored uppercase; match them case-insensitively.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
