//! Product catalogue repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use local_crust_core::{BakerId, ProductId};

use super::{Page, RepositoryError};
use crate::models::product::ShopRef;
use crate::models::{NewProduct, Product, ProductUpdate, ProductWithBaker};

const PRODUCT_COLUMNS: &str =
    "p.id, p.baker_id, p.name, p.category, p.price, p.description, p.image_url, p.in_stock, p.created_at";

/// Product row joined with its shop.
#[derive(Debug, sqlx::FromRow)]
struct ProductShopRow {
    #[sqlx(flatten)]
    product: Product,
    shop_name: String,
    shop_city: String,
    shop_verified: bool,
}

impl From<ProductShopRow> for ProductWithBaker {
    fn from(row: ProductShopRow) -> Self {
        Self {
            baker: ShopRef {
                id: row.product.baker_id,
                shop_name: row.shop_name,
                city: row.shop_city,
                verified: row.shop_verified,
            },
            product: row.product,
        }
    }
}

/// Row in the admin product listing.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct ProductListing {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub baker_id: BakerId,
    pub baker_name: String,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
}

/// Repository for catalogue operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// In-stock products from verified shops.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_marketplace(&self) -> Result<Vec<ProductWithBaker>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductShopRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}, b.shop_name, b.city AS shop_city, b.verified AS shop_verified
            FROM products p
            JOIN bakers b ON b.id = p.baker_id
            WHERE b.verified AND p.in_stock
            ORDER BY p.created_at DESC
            "
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Look up several products with their shops, keyed by ID.
    ///
    /// Unknown IDs are simply absent from the result. Products of unverified
    /// shops are included; callers check `baker.verified`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many_with_baker(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<ProductWithBaker>, RepositoryError> {
        let raw: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let rows = sqlx::query_as::<_, ProductShopRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}, b.shop_name, b.city AS shop_city, b.verified AS shop_verified
            FROM products p
            JOIN bakers b ON b.id = p.baker_id
            WHERE p.id = ANY($1)
            "
        ))
        .bind(raw)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// A shop's full catalogue, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_baker(&self, baker_id: BakerId) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.baker_id = $1 ORDER BY p.created_at DESC"
        ))
        .bind(baker_id)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        baker_id: BakerId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            INSERT INTO products (baker_id, name, category, price, description, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, baker_id, name, category, price, description, image_url, in_stock, created_at
            ",
        )
        .bind(baker_id)
        .bind(product.name.trim())
        .bind(product.category.trim())
        .bind(product.price)
        .bind(product.description.as_deref())
        .bind(product.image_url.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Apply a partial update. Absent fields keep their current value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(
            r"
            UPDATE products SET
                name = COALESCE($2, name),
                category = COALESCE($3, category),
                price = COALESCE($4, price),
                description = COALESCE($5, description),
                image_url = COALESCE($6, image_url),
                in_stock = COALESCE($7, in_stock)
            WHERE id = $1
            RETURNING id, baker_id, name, category, price, description, image_url, in_stock, created_at
            ",
        )
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.category.as_deref().map(str::trim))
        .bind(update.price)
        .bind(update.description.as_deref())
        .bind(update.image_url.as_deref())
        .bind(update.in_stock)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Paged admin listing across every shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self, page: Page) -> Result<(Vec<ProductListing>, i64), RepositoryError> {
        let rows = sqlx::query_as::<_, ProductListing>(
            r"
            SELECT p.id, p.name, p.category, p.price, p.baker_id,
                   b.shop_name AS baker_name, p.in_stock, p.created_at
            FROM products p
            JOIN bakers b ON b.id = p.baker_id
            ORDER BY p.id
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        let total = self.count().await?;

        Ok((rows, total))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;

        Ok(total)
    }
}
