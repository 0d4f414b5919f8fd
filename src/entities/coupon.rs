use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discount coupon. Codes are stored uppercase and matched
/// case-insensitively by normalizing at lookup.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub kind: DiscountKind,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub min_purchase: Decimal,
    pub max_uses: i32,
    pub times_used: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub active: bool,
}

impl Model {
    /// A coupon is valid iff it is active, has uses left, and `now` falls
    /// inside its validity window. Pure check; consumption happens inside
    /// the checkout transaction.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.active
            && self.times_used < self.max_uses
            && self.valid_from <= now
            && now <= self.valid_until
    }

    /// Discount amount for a given subtotal. Zero below the minimum
    /// purchase; both kinds are capped at the subtotal so totals can
    /// never go negative.
    pub fn discount_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal < self.min_purchase {
            return Decimal::ZERO;
        }
        match self.kind {
            DiscountKind::Percent => (subtotal * self.value / Decimal::from(100)).min(subtotal),
            DiscountKind::Fixed => self.value.min(subtotal),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    #[sea_orm(string_value = "percent")]
    Percent,
    #[sea_orm(string_value = "fixed")]
    Fixed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn coupon(kind: DiscountKind, value: Decimal, min_purchase: Decimal) -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4(),
            code: "TEST".to_string(),
            kind,
            value,
            min_purchase,
            max_uses: 100,
            times_used: 0,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            active: true,
        }
    }

    #[test]
    fn percent_discount_on_qualifying_subtotal() {
        // Cart {A: 2 @ $50, B: 1 @ $30} -> $130; 10% off with $100 minimum
        let c = coupon(DiscountKind::Percent, dec!(10), dec!(100));
        assert_eq!(c.discount_for(dec!(130)), dec!(13));
    }

    #[test]
    fn fixed_discount_on_qualifying_subtotal() {
        let c = coupon(DiscountKind::Fixed, dec!(5), Decimal::ZERO);
        assert_eq!(c.discount_for(dec!(130)), dec!(5));
    }

    #[test]
    fn below_minimum_purchase_is_zero_for_both_kinds() {
        let pct = coupon(DiscountKind::Percent, dec!(10), dec!(100));
        let fixed = coupon(DiscountKind::Fixed, dec!(5), dec!(100));
        assert_eq!(pct.discount_for(dec!(99.99)), Decimal::ZERO);
        assert_eq!(fixed.discount_for(dec!(99.99)), Decimal::ZERO);
    }

    #[test]
    fn fixed_discount_never_exceeds_subtotal() {
        let c = coupon(DiscountKind::Fixed, dec!(50), Decimal::ZERO);
        assert_eq!(c.discount_for(dec!(20)), dec!(20));
    }

    #[test]
    fn percent_discount_never_exceeds_subtotal() {
        let c = coupon(DiscountKind::Percent, dec!(150), Decimal::ZERO);
        assert_eq!(c.discount_for(dec!(100)), dec!(100));
    }

    #[test]
    fn invalid_when_inactive() {
        let mut c = coupon(DiscountKind::Percent, dec!(10), Decimal::ZERO);
        c.active = false;
        assert!(!c.is_valid(Utc::now()));
    }

    #[test]
    fn invalid_when_usage_cap_reached() {
        let mut c = coupon(DiscountKind::Percent, dec!(10), Decimal::ZERO);
        c.times_used = c.max_uses;
        assert!(!c.is_valid(Utc::now()));
    }

    #[test]
    fn invalid_outside_window() {
        let c = coupon(DiscountKind::Percent, dec!(10), Decimal::ZERO);
        assert!(!c.is_valid(Utc::now() - Duration::days(2)));
        assert!(!c.is_valid(Utc::now() + Duration::days(2)));
        assert!(c.is_valid(Utc::now()));
    }
}
