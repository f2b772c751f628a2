//! Order repository.
//!
//! Orders and their line items are written in one transaction. Line items
//! keep their own copy of the product name, shop name and unit price.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use local_crust_core::{BakerId, OrderId, OrderStatus, PaymentStatus, UserId};

use super::{Page, RepositoryError};
use crate::models::{NewOrderItem, Order, OrderItem};

const ORDER_COLUMNS: &str = "o.id, o.order_number, o.user_id, o.total_amount, o.status, \
     o.payment_status, o.payment_id, o.razorpay_order_id, o.delivery_address, o.created_at, o.updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, baker_id, product_name, baker_name, quantity, price";

/// An order joined with the customer who placed it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerOrder {
    #[sqlx(flatten)]
    pub order: Order,
    pub customer_name: String,
    pub customer_email: String,
}

/// Filters for a shop's order history.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

/// Orders per status, for the admin dashboard.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

/// Repository for order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Write an order and all of its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is
    /// written in that case.
    pub async fn create(
        &self,
        user_id: UserId,
        order_number: &str,
        total_amount: Decimal,
        delivery_address: &serde_json::Value,
        items: &[NewOrderItem],
    ) -> Result<(Order, Vec<OrderItem>), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(
            r"
            INSERT INTO orders (order_number, user_id, total_amount, delivery_address)
            VALUES ($1, $2, $3, $4)
            RETURNING id, order_number, user_id, total_amount, status, payment_status,
                      payment_id, razorpay_order_id, delivery_address, created_at, updated_at
            ",
        )
        .bind(order_number)
        .bind(user_id)
        .bind(total_amount)
        .bind(delivery_address)
        .fetch_one(&mut *tx)
        .await?;

        let mut written = Vec::with_capacity(items.len());
        for item in items {
            let row = sqlx::query_as::<_, OrderItem>(&format!(
                r"
                INSERT INTO order_items (order_id, product_id, baker_id, product_name,
                                         baker_name, quantity, price)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING {ITEM_COLUMNS}
                "
            ))
            .bind(order.id)
            .bind(item.product_id)
            .bind(item.baker_id)
            .bind(&item.product_name)
            .bind(&item.baker_name)
            .bind(item.quantity)
            .bind(item.price)
            .fetch_one(&mut *tx)
            .await?;
            written.push(row);
        }

        tx.commit().await?;

        Ok((order, written))
    }

    /// Record the gateway order created for this order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_razorpay_order_id(
        &self,
        id: OrderId,
        razorpay_order_id: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE orders SET razorpay_order_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(razorpay_order_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// An order with its customer's name and email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_customer(
        &self,
        id: OrderId,
    ) -> Result<Option<CustomerOrder>, RepositoryError> {
        let order = sqlx::query_as::<_, CustomerOrder>(&format!(
            r"
            SELECT {ORDER_COLUMNS}, u.name AS customer_name, u.email AS customer_email
            FROM orders o
            JOIN users u ON u.id = o.user_id
            WHERE o.id = $1
            "
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id"
        ))
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Lines for several orders at once, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_for_orders(
        &self,
        order_ids: &[OrderId],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        let raw: Vec<i32> = order_ids.iter().map(OrderId::as_i32).collect();
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY id"
        ))
        .bind(raw)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// A customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.user_id = $1 ORDER BY o.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Orders containing at least one line from this shop, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_baker(
        &self,
        baker_id: BakerId,
        filter: &OrderFilter,
    ) -> Result<Vec<CustomerOrder>, RepositoryError> {
        let orders = sqlx::query_as::<_, CustomerOrder>(&format!(
            r"
            SELECT {ORDER_COLUMNS}, u.name AS customer_name, u.email AS customer_email
            FROM orders o
            JOIN users u ON u.id = o.user_id
            WHERE EXISTS (
                SELECT 1 FROM order_items i WHERE i.order_id = o.id AND i.baker_id = $1
            )
              AND ($2::order_status IS NULL OR o.status = $2)
              AND ($3::TIMESTAMPTZ IS NULL OR o.created_at >= $3)
              AND ($4::TIMESTAMPTZ IS NULL OR o.created_at <= $4)
            ORDER BY o.created_at DESC
            "
        ))
        .bind(baker_id)
        .bind(filter.status)
        .bind(filter.from)
        .bind(filter.until)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Whether the order has any line sold by this shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn contains_baker_items(
        &self,
        order_id: OrderId,
        baker_id: BakerId,
    ) -> Result<bool, RepositoryError> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM order_items WHERE order_id = $1 AND baker_id = $2)",
        )
        .bind(order_id)
        .bind(baker_id)
        .fetch_one(self.pool)
        .await?;

        Ok(found)
    }

    /// Record a payment outcome. A completed payment confirms the order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn record_payment(
        &self,
        id: OrderId,
        payment_id: Option<&str>,
        payment_status: PaymentStatus,
    ) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(
            r"
            UPDATE orders SET
                payment_id = $2,
                payment_status = $3,
                status = CASE WHEN $3 = 'completed'::payment_status
                              THEN 'confirmed'::order_status
                              ELSE status END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, order_number, user_id, total_amount, status, payment_status,
                      payment_id, razorpay_order_id, delivery_address, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(payment_id)
        .bind(payment_status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(
            r"
            UPDATE orders SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, order_number, user_id, total_amount, status, payment_status,
                      payment_id, razorpay_order_id, delivery_address, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Paged admin listing, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(
        &self,
        status: Option<OrderStatus>,
        page: Page,
    ) -> Result<(Vec<CustomerOrder>, i64), RepositoryError> {
        let orders = sqlx::query_as::<_, CustomerOrder>(&format!(
            r"
            SELECT {ORDER_COLUMNS}, u.name AS customer_name, u.email AS customer_email
            FROM orders o
            JOIN users u ON u.id = o.user_id
            WHERE $1::order_status IS NULL OR o.status = $1
            ORDER BY o.created_at DESC
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(status)
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE $1::order_status IS NULL OR status = $1",
        )
        .bind(status)
        .fetch_one(self.pool)
        .await?;

        Ok((orders, total))
    }

    /// Most recent orders across the marketplace.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o ORDER BY o.created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn status_counts(&self) -> Result<Vec<StatusCount>, RepositoryError> {
        let counts = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM orders GROUP BY status ORDER BY status",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(counts)
    }

    /// Order count and revenue from completed payments across the marketplace.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn totals(&self) -> Result<(i64, Decimal), RepositoryError> {
        let totals: (i64, Decimal) = sqlx::query_as(
            r"
            SELECT COUNT(*),
                   COALESCE(SUM(total_amount) FILTER (WHERE payment_status = 'completed'), 0)
            FROM orders
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(totals)
    }
}
