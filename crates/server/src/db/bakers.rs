//! Baker shop repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use local_crust_core::{BakerId, Email, UserId, UserType};

use super::{Page, RepositoryError, conflict_on_unique};
use crate::models::{Baker, BakerCard, NewBaker, NewProduct, User};

const BAKER_COLUMNS: &str = "id, user_id, shop_name, owner_name, phone, business_license, tax_id, \
     shop_address, city, state, zip_code, license_document, shop_description, verified, created_at";

/// Row in the admin shop listing.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct BakerListing {
    pub id: BakerId,
    pub shop_name: String,
    pub owner_name: String,
    pub phone: String,
    pub city: String,
    pub state: String,
    pub verified: bool,
    pub total_products: i64,
    pub created_at: DateTime<Utc>,
}

/// Verification counts for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
pub struct BakerCounts {
    pub total: i64,
    pub verified: i64,
}

/// Repository for baker shop operations.
pub struct BakerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BakerRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a baker account, its shop and its starting catalogue in one
    /// transaction.
    ///
    /// The account name is the shop owner's name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    /// Returns `RepositoryError::Database` for other database errors; nothing
    /// is written in that case.
    pub async fn create_with_account(
        &self,
        email: &Email,
        password_hash: &str,
        shop: &NewBaker,
        products: &[NewProduct],
        verified: bool,
    ) -> Result<(User, Baker), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (email, name, password_hash, user_type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, user_type, saved_address, created_at
            ",
        )
        .bind(email)
        .bind(&shop.owner_name)
        .bind(password_hash)
        .bind(UserType::Baker)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "Email already registered"))?;

        let baker = sqlx::query_as::<_, Baker>(&format!(
            r"
            INSERT INTO bakers (user_id, shop_name, owner_name, phone, business_license, tax_id,
                                shop_address, city, state, zip_code, license_document,
                                shop_description, verified)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {BAKER_COLUMNS}
            "
        ))
        .bind(user.id)
        .bind(&shop.shop_name)
        .bind(&shop.owner_name)
        .bind(&shop.phone)
        .bind(&shop.business_license)
        .bind(&shop.tax_id)
        .bind(&shop.shop_address)
        .bind(&shop.city)
        .bind(&shop.state)
        .bind(&shop.zip_code)
        .bind(shop.license_document.as_deref())
        .bind(&shop.shop_description)
        .bind(verified)
        .fetch_one(&mut *tx)
        .await?;

        for product in products {
            sqlx::query(
                r"
                INSERT INTO products (baker_id, name, category, price, description, image_url)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(baker.id)
            .bind(&product.name)
            .bind(&product.category)
            .bind(product.price)
            .bind(product.description.as_deref())
            .bind(product.image_url.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok((user, baker))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: BakerId) -> Result<Option<Baker>, RepositoryError> {
        let baker = sqlx::query_as::<_, Baker>(&format!(
            "SELECT {BAKER_COLUMNS} FROM bakers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(baker)
    }

    /// Shop owned by a baker account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user_id(&self, user_id: UserId) -> Result<Option<Baker>, RepositoryError> {
        let baker = sqlx::query_as::<_, Baker>(&format!(
            "SELECT {BAKER_COLUMNS} FROM bakers WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(baker)
    }

    /// Verified shops with their catalogue size, for the public directory.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_verified(&self) -> Result<Vec<BakerCard>, RepositoryError> {
        let cards = sqlx::query_as::<_, BakerCard>(
            r"
            SELECT b.id, b.shop_name, b.shop_description, b.city, b.state,
                   COUNT(p.id) AS product_count
            FROM bakers b
            LEFT JOIN products p ON p.baker_id = b.id
            WHERE b.verified
            GROUP BY b.id
            ORDER BY b.shop_name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(cards)
    }

    /// Paged admin listing, optionally filtered by verification state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        verified: Option<bool>,
        page: Page,
    ) -> Result<(Vec<BakerListing>, i64), RepositoryError> {
        let rows = sqlx::query_as::<_, BakerListing>(
            r"
            SELECT b.id, b.shop_name, b.owner_name, b.phone, b.city, b.state, b.verified,
                   COUNT(p.id) AS total_products, b.created_at
            FROM bakers b
            LEFT JOIN products p ON p.baker_id = b.id
            WHERE $1::BOOLEAN IS NULL OR b.verified = $1
            GROUP BY b.id
            ORDER BY b.id
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(verified)
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bakers WHERE $1::BOOLEAN IS NULL OR verified = $1",
        )
        .bind(verified)
        .fetch_one(self.pool)
        .await?;

        Ok((rows, total))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn counts(&self) -> Result<BakerCounts, RepositoryError> {
        let counts = sqlx::query_as::<_, BakerCounts>(
            "SELECT COUNT(*) AS total, COUNT(*) FILTER (WHERE verified) AS verified FROM bakers",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(counts)
    }

    /// Number of products and reviews attached to a shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn catalogue_counts(&self, id: BakerId) -> Result<(i64, i64), RepositoryError> {
        let counts: (i64, i64) = sqlx::query_as(
            r"
            SELECT
                (SELECT COUNT(*) FROM products WHERE baker_id = $1),
                (SELECT COUNT(*) FROM reviews WHERE baker_id = $1)
            ",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(counts)
    }

    /// Set the verification flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shop does not exist.
    pub async fn set_verified(&self, id: BakerId, verified: bool) -> Result<Baker, RepositoryError> {
        sqlx::query_as::<_, Baker>(&format!(
            "UPDATE bakers SET verified = $2 WHERE id = $1 RETURNING {BAKER_COLUMNS}"
        ))
        .bind(id)
        .bind(verified)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a shop together with its owning account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shop does not exist.
    pub async fn delete_with_account(&self, id: BakerId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user_id: Option<UserId> =
            sqlx::query_scalar("DELETE FROM bakers WHERE id = $1 RETURNING user_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let user_id = user_id.ok_or(RepositoryError::NotFound)?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
