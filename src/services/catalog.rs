use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::entities::{
    category, product, review, Category, CategoryModel, Product, ProductModel, Review,
};
use crate::errors::ServiceError;

/// Read-only product catalog. Cart pricing and checkout snapshotting both
/// resolve products through here.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Resolves a product or fails with `ProductNotFound` naming the id.
    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductModel, ServiceError> {
        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or(ServiceError::ProductNotFound(product_id))
    }

    /// Lists products, optionally filtered by category and by a
    /// case-insensitive name/description substring.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        search: Option<&str>,
        category_id: Option<Uuid>,
    ) -> Result<Vec<ProductModel>, ServiceError> {
        let mut query = Product::find().order_by_asc(product::Column::Name);

        if let Some(category_id) = category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term);
            query = query.filter(
                Condition::any()
                    .add(product::Column::Name.like(pattern.clone()))
                    .add(product::Column::Description.like(pattern)),
            );
        }

        Ok(query.all(&*self.db).await?)
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryModel>, ServiceError> {
        Ok(Category::find()
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?)
    }

    /// Average rating (one decimal place) and review count for a product.
    pub async fn rating_summary(&self, product_id: Uuid) -> Result<RatingSummary, ServiceError> {
        let reviews = Review::find()
            .filter(review::Column::ProductId.eq(product_id))
            .all(&*self.db)
            .await?;

        Ok(RatingSummary::from_ratings(
            reviews.iter().map(|r| r.rating),
        ))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RatingSummary {
    pub average: Decimal,
    pub count: u64,
}

impl RatingSummary {
    pub fn from_ratings(ratings: impl Iterator<Item = i32>) -> Self {
        let mut sum = 0i64;
        let mut count = 0u64;
        for rating in ratings {
            sum += i64::from(rating);
            count += 1;
        }
        if count == 0 {
            return Self {
                average: Decimal::ZERO,
                count: 0,
            };
        }
        let average = (Decimal::from(sum) / Decimal::from(count)).round_dp(1);
        Self { average, count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rating_summary_rounds_to_one_decimal() {
        let summary = RatingSummary::from_ratings([5, 4, 4].into_iter());
        assert_eq!(summary.average, dec!(4.3));
        assert_eq!(summary.count, 3);
    }

    #[test]
    fn rating_summary_empty_is_zero() {
        let summary = RatingSummary::from_ratings(std::iter::empty());
        assert_eq!(summary.average, Decimal::ZERO);
        assert_eq!(summary.count, 0);
    }
}
