//! Sales aggregates for the baker dashboard.
//!
//! Revenue figures only count lines sold by the requesting shop and only
//! orders whose payment completed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use local_crust_core::{BakerId, Email, ProductId};

use super::RepositoryError;

/// Revenue for one calendar month.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MonthlyRevenue {
    pub month: DateTime<Utc>,
    pub revenue: Decimal,
    pub orders: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopProduct {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub total_sales: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    pub order_count: i64,
}

/// Completed orders placed in one hour of the day (UTC).
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct HourlyOrders {
    pub hour: i32,
    pub order_count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategorySales {
    pub category: String,
    pub total_sales: i64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopCustomer {
    pub name: String,
    pub email: Email,
    pub order_count: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_spent: Decimal,
}

/// Repeat-purchase summary for one shop.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct CustomerTotals {
    pub total_customers: i64,
    pub repeat_customers: i64,
    pub avg_order_value: Decimal,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InventoryLine {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub in_stock: bool,
    pub weekly_sales: i64,
    pub created_at: DateTime<Utc>,
}

/// Headline numbers for the baker dashboard.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: i64,
    pub total_products: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    pub pending_orders: i64,
}

/// Repository for dashboard aggregates.
pub struct AnalyticsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalyticsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn dashboard(&self, baker_id: BakerId) -> Result<DashboardStats, RepositoryError> {
        let stats = sqlx::query_as::<_, DashboardStats>(
            r"
            WITH shop_orders AS (
                SELECT o.id, o.status, o.payment_status,
                       SUM(i.price * i.quantity) AS subtotal
                FROM orders o
                JOIN order_items i ON i.order_id = o.id
                WHERE i.baker_id = $1
                GROUP BY o.id
            )
            SELECT
                (SELECT COUNT(*) FROM shop_orders) AS total_orders,
                (SELECT COUNT(*) FROM products WHERE baker_id = $1) AS total_products,
                (SELECT COALESCE(SUM(subtotal), 0) FROM shop_orders
                  WHERE payment_status = 'completed') AS total_revenue,
                (SELECT COUNT(*) FROM shop_orders
                  WHERE status IN ('pending', 'confirmed', 'preparing')) AS pending_orders
            ",
        )
        .bind(baker_id)
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }

    /// Monthly revenue since `since`, oldest month first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn revenue_by_month(
        &self,
        baker_id: BakerId,
        since: DateTime<Utc>,
    ) -> Result<Vec<MonthlyRevenue>, RepositoryError> {
        let rows = sqlx::query_as::<_, MonthlyRevenue>(
            r"
            SELECT date_trunc('month', o.created_at) AS month,
                   SUM(i.price * i.quantity) AS revenue,
                   COUNT(DISTINCT o.id) AS orders
            FROM orders o
            JOIN order_items i ON i.order_id = o.id
            WHERE i.baker_id = $1
              AND o.payment_status = 'completed'
              AND o.created_at >= $2
            GROUP BY 1
            ORDER BY 1
            ",
        )
        .bind(baker_id)
        .bind(since)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Best sellers by revenue.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_products(
        &self,
        baker_id: BakerId,
        limit: i64,
    ) -> Result<Vec<TopProduct>, RepositoryError> {
        let rows = sqlx::query_as::<_, TopProduct>(
            r"
            SELECT p.id, p.name, p.category, p.price,
                   SUM(i.quantity) AS total_sales,
                   SUM(i.price * i.quantity) AS total_revenue,
                   COUNT(DISTINCT o.id) AS order_count
            FROM products p
            JOIN order_items i ON i.product_id = p.id
            JOIN orders o ON o.id = i.order_id
            WHERE p.baker_id = $1 AND o.payment_status = 'completed'
            GROUP BY p.id
            ORDER BY total_revenue DESC
            LIMIT $2
            ",
        )
        .bind(baker_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn orders_by_hour(
        &self,
        baker_id: BakerId,
    ) -> Result<Vec<HourlyOrders>, RepositoryError> {
        let rows = sqlx::query_as::<_, HourlyOrders>(
            r"
            SELECT EXTRACT(HOUR FROM o.created_at AT TIME ZONE 'UTC')::INT AS hour,
                   COUNT(DISTINCT o.id) AS order_count
            FROM orders o
            JOIN order_items i ON i.order_id = o.id
            WHERE i.baker_id = $1 AND o.payment_status = 'completed'
            GROUP BY 1
            ORDER BY 1
            ",
        )
        .bind(baker_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sales_by_category(
        &self,
        baker_id: BakerId,
    ) -> Result<Vec<CategorySales>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategorySales>(
            r"
            SELECT p.category,
                   SUM(i.quantity) AS total_sales,
                   SUM(i.price * i.quantity) AS total_revenue
            FROM products p
            JOIN order_items i ON i.product_id = p.id
            JOIN orders o ON o.id = i.order_id
            WHERE p.baker_id = $1 AND o.payment_status = 'completed'
            GROUP BY p.category
            ORDER BY total_revenue DESC
            ",
        )
        .bind(baker_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Customer counts and the average per-order spend at this shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn customer_totals(
        &self,
        baker_id: BakerId,
    ) -> Result<CustomerTotals, RepositoryError> {
        let totals = sqlx::query_as::<_, CustomerTotals>(
            r"
            WITH shop_orders AS (
                SELECT o.id, o.user_id, SUM(i.price * i.quantity) AS subtotal
                FROM orders o
                JOIN order_items i ON i.order_id = o.id
                WHERE i.baker_id = $1 AND o.payment_status = 'completed'
                GROUP BY o.id
            ),
            per_customer AS (
                SELECT user_id, COUNT(*) AS order_count FROM shop_orders GROUP BY user_id
            )
            SELECT
                (SELECT COUNT(*) FROM per_customer) AS total_customers,
                (SELECT COUNT(*) FROM per_customer WHERE order_count > 1) AS repeat_customers,
                (SELECT COALESCE(ROUND(AVG(subtotal), 2), 0) FROM shop_orders) AS avg_order_value
            ",
        )
        .bind(baker_id)
        .fetch_one(self.pool)
        .await?;

        Ok(totals)
    }

    /// Biggest spenders at this shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_customers(
        &self,
        baker_id: BakerId,
        limit: i64,
    ) -> Result<Vec<TopCustomer>, RepositoryError> {
        let rows = sqlx::query_as::<_, TopCustomer>(
            r"
            SELECT u.name, u.email,
                   COUNT(DISTINCT o.id) AS order_count,
                   SUM(i.price * i.quantity) AS total_spent
            FROM users u
            JOIN orders o ON o.user_id = u.id
            JOIN order_items i ON i.order_id = o.id
            WHERE i.baker_id = $1 AND o.payment_status = 'completed'
            GROUP BY u.id
            ORDER BY total_spent DESC
            LIMIT $2
            ",
        )
        .bind(baker_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Catalogue with units sold since `since`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn inventory(
        &self,
        baker_id: BakerId,
        since: DateTime<Utc>,
    ) -> Result<Vec<InventoryLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, InventoryLine>(
            r"
            SELECT p.id, p.name, p.category, p.price, p.in_stock, p.created_at,
                   COALESCE((
                       SELECT SUM(i.quantity)
                       FROM order_items i
                       JOIN orders o ON o.id = i.order_id
                       WHERE i.product_id = p.id
                         AND o.payment_status = 'completed'
                         AND o.created_at >= $2
                   ), 0) AS weekly_sales
            FROM products p
            WHERE p.baker_id = $1
            ORDER BY p.name
            ",
        )
        .bind(baker_id)
        .bind(since)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}
