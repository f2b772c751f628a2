//! Wishlist repository.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use local_crust_core::{ProductId, UserId, WishlistItemId};

use super::RepositoryError;
use crate::models::product::ShopRef;
use crate::models::{Product, ProductWithBaker};

#[derive(Debug, sqlx::FromRow)]
struct WishlistRow {
    wishlist_id: WishlistItemId,
    added_at: DateTime<Utc>,
    #[sqlx(flatten)]
    product: Product,
    shop_name: String,
    shop_city: String,
    shop_verified: bool,
}

/// A saved product with its shop.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistEntry {
    pub id: WishlistItemId,
    pub product_id: ProductId,
    pub product: ProductWithBaker,
    pub created_at: DateTime<Utc>,
}

impl From<WishlistRow> for WishlistEntry {
    fn from(row: WishlistRow) -> Self {
        Self {
            id: row.wishlist_id,
            product_id: row.product.id,
            created_at: row.added_at,
            product: ProductWithBaker {
                baker: ShopRef {
                    id: row.product.baker_id,
                    shop_name: row.shop_name,
                    city: row.shop_city,
                    verified: row.shop_verified,
                },
                product: row.product,
            },
        }
    }
}

/// Outcome of saving a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistAdd {
    Added(WishlistItemId),
    AlreadyPresent,
}

/// Repository for wishlist operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's saved products, most recently saved first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<WishlistEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistRow>(
            r"
            SELECT w.id AS wishlist_id, w.created_at AS added_at,
                   p.id, p.baker_id, p.name, p.category, p.price, p.description,
                   p.image_url, p.in_stock, p.created_at,
                   b.shop_name, b.city AS shop_city, b.verified AS shop_verified
            FROM wishlists w
            JOIN products p ON p.id = w.product_id
            JOIN bakers b ON b.id = p.baker_id
            WHERE w.user_id = $1
            ORDER BY w.created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Save a product. Saving the same product twice is not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistAdd, RepositoryError> {
        let id: Option<WishlistItemId> = sqlx::query_scalar(
            r"
            INSERT INTO wishlists (user_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, product_id) DO NOTHING
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(id.map_or(WishlistAdd::AlreadyPresent, WishlistAdd::Added))
    }

    /// Returns `false` if the product was not saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM wishlists WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
