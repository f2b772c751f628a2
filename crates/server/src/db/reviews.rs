//! Review repository.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use local_crust_core::{BakerId, ProductId, Rating, ReviewId, UserId};

use super::{Page, RepositoryError};
use crate::models::Review;

const REVIEW_COLUMNS: &str =
    "id, user_id, product_id, baker_id, rating, comment, baker_reply, reply_at, created_at";

/// Result of writing a review.
#[derive(Debug, sqlx::FromRow)]
pub struct UpsertedReview {
    #[sqlx(flatten)]
    pub review: Review,
    /// `false` when an existing review was overwritten.
    pub inserted: bool,
}

/// A review as shown on a product page.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductReview {
    pub id: ReviewId,
    pub user_name: String,
    pub rating: i16,
    pub comment: String,
    pub baker_reply: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reply_at: Option<DateTime<Utc>>,
}

/// A review as shown on the baker's dashboard.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ShopReview {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub product_name: String,
    pub customer_name: String,
    pub customer_email: String,
    pub rating: i16,
    pub comment: String,
    pub baker_reply: Option<String>,
    pub reply_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A review in the admin moderation listing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ModerationReview {
    pub id: ReviewId,
    pub user_name: String,
    pub product_name: String,
    pub baker_name: String,
    pub rating: i16,
    pub comment: String,
    pub baker_reply: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Rating summary for one shop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewStats {
    pub total_reviews: i64,
    pub average_rating: f64,
    pub pending_replies: i64,
    /// Review count per star, keyed `1` through `5`.
    pub rating_distribution: BTreeMap<u8, i64>,
}

impl ReviewStats {
    /// Build stats from `(rating, count)` pairs and the unreplied count.
    #[must_use]
    pub fn from_counts(counts: &[(i16, i64)], pending_replies: i64) -> Self {
        let mut distribution: BTreeMap<u8, i64> = (1..=5).map(|star| (star, 0)).collect();
        let mut total = 0_i64;
        let mut sum = 0_i64;
        for &(rating, count) in counts {
            if let Some(slot) = u8::try_from(rating)
                .ok()
                .and_then(|star| distribution.get_mut(&star))
            {
                *slot += count;
                total += count;
                sum += i64::from(rating) * count;
            }
        }

        Self {
            total_reviews: total,
            average_rating: average_rating(sum, total),
            pending_replies,
            rating_distribution: distribution,
        }
    }
}

/// Mean rating rounded to one decimal place, `0.0` when there are no reviews.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_rating(sum: i64, count: i64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    ((sum as f64 / count as f64) * 10.0).round() / 10.0
}

/// Repository for review operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a review, or overwrite the rating and comment of the caller's
    /// existing review of the same product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    pub async fn upsert(
        &self,
        user_id: UserId,
        product_id: ProductId,
        baker_id: BakerId,
        rating: Rating,
        comment: &str,
    ) -> Result<UpsertedReview, RepositoryError> {
        let row = sqlx::query_as::<_, UpsertedReview>(&format!(
            r"
            INSERT INTO reviews (user_id, product_id, baker_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, product_id) DO UPDATE
                SET rating = EXCLUDED.rating, comment = EXCLUDED.comment
            RETURNING {REVIEW_COLUMNS}, (xmax = 0) AS inserted
            "
        ))
        .bind(user_id)
        .bind(product_id)
        .bind(baker_id)
        .bind(i16::from(rating))
        .bind(comment)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(review)
    }

    /// Reviews of one product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductReview>, RepositoryError> {
        let reviews = sqlx::query_as::<_, ProductReview>(
            r"
            SELECT r.id, u.name AS user_name, r.rating, r.comment, r.baker_reply,
                   r.created_at, r.reply_at
            FROM reviews r
            JOIN users u ON u.id = r.user_id
            WHERE r.product_id = $1
            ORDER BY r.created_at DESC
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(reviews)
    }

    /// Reviews of every product a shop sells, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_baker(
        &self,
        baker_id: BakerId,
    ) -> Result<Vec<ShopReview>, RepositoryError> {
        let reviews = sqlx::query_as::<_, ShopReview>(
            r"
            SELECT r.id, r.product_id, p.name AS product_name,
                   u.name AS customer_name, u.email AS customer_email,
                   r.rating, r.comment, r.baker_reply, r.reply_at, r.created_at
            FROM reviews r
            JOIN products p ON p.id = r.product_id
            JOIN users u ON u.id = r.user_id
            WHERE r.baker_id = $1
            ORDER BY r.created_at DESC
            ",
        )
        .bind(baker_id)
        .fetch_all(self.pool)
        .await?;

        Ok(reviews)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn stats_for_baker(&self, baker_id: BakerId) -> Result<ReviewStats, RepositoryError> {
        let counts: Vec<(i16, i64)> = sqlx::query_as(
            "SELECT rating, COUNT(*) FROM reviews WHERE baker_id = $1 GROUP BY rating",
        )
        .bind(baker_id)
        .fetch_all(self.pool)
        .await?;

        let pending: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reviews WHERE baker_id = $1 AND baker_reply IS NULL",
        )
        .bind(baker_id)
        .fetch_one(self.pool)
        .await?;

        Ok(ReviewStats::from_counts(&counts, pending))
    }

    /// Store the shop's reply, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    pub async fn set_reply(&self, id: ReviewId, reply: &str) -> Result<Review, RepositoryError> {
        sqlx::query_as::<_, Review>(&format!(
            r"
            UPDATE reviews SET baker_reply = $2, reply_at = NOW()
            WHERE id = $1
            RETURNING {REVIEW_COLUMNS}
            "
        ))
        .bind(id)
        .bind(reply)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Paged moderation listing, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(
        &self,
        page: Page,
    ) -> Result<(Vec<ModerationReview>, i64), RepositoryError> {
        let reviews = sqlx::query_as::<_, ModerationReview>(
            r"
            SELECT r.id, u.name AS user_name, p.name AS product_name, b.shop_name AS baker_name,
                   r.rating, r.comment, r.baker_reply, r.created_at
            FROM reviews r
            JOIN users u ON u.id = r.user_id
            JOIN products p ON p.id = r.product_id
            JOIN bakers b ON b.id = r.baker_id
            ORDER BY r.created_at DESC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
            .fetch_one(self.pool)
            .await?;

        Ok((reviews, total))
    }

    /// Most recent reviews across the marketplace.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_from_counts() {
        let stats = ReviewStats::from_counts(&[(5, 3), (4, 1), (1, 1)], 2);
        assert_eq!(stats.total_reviews, 5);
        assert_eq!(
            stats.rating_distribution.values().copied().collect::<Vec<_>>(),
            [1, 0, 0, 1, 3]
        );
        // (15 + 4 + 1) / 5
        assert!((stats.average_rating - 4.0).abs() < f64::EPSILON);
        assert_eq!(stats.pending_replies, 2);
    }

    #[test]
    fn test_stats_empty() {
        let stats = ReviewStats::from_counts(&[], 0);
        assert_eq!(stats.total_reviews, 0);
        assert!(stats.average_rating.abs() < f64::EPSILON);
        assert_eq!(stats.rating_distribution.len(), 5);
        assert!(stats.rating_distribution.values().all(|&n| n == 0));
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        assert!((average_rating(14, 3) - 4.7).abs() < 1e-9);
        assert!((average_rating(9, 2) - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_ratings_are_ignored() {
        let stats = ReviewStats::from_counts(&[(0, 4), (6, 1), (3, 2)], 0);
        assert_eq!(stats.total_reviews, 2);
        assert_eq!(stats.rating_distribution.get(&3), Some(&2));
        assert_eq!(stats.rating_distribution.len(), 5);
    }
}
