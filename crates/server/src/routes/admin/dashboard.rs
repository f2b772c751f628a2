//! Marketplace-wide headline numbers.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use local_crust_core::{OrderId, OrderStatus, ProductId, ReviewId, UserId, UserType};

use crate::db::orders::StatusCount;
use crate::db::{BakerRepository, OrderRepository, ProductRepository, ReviewRepository, UserRepository};
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{Order, Review};
use crate::state::AppState;

const RECENT: i64 = 5;

#[derive(Debug, Serialize)]
pub struct RecentOrder {
    pub id: OrderId,
    pub order_id: String,
    pub user_id: UserId,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for RecentOrder {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            order_id: order.order_number,
            user_id: order.user_id,
            total_amount: order.total_amount,
            status: order.status,
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecentReview {
    pub id: ReviewId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for RecentReview {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            user_id: review.user_id,
            product_id: review.product_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    /// Customer accounts only.
    pub total_users: i64,
    pub total_bakers: i64,
    pub verified_bakers: i64,
    pub unverified_bakers: i64,
    pub total_products: i64,
    pub total_orders: i64,
    /// Sum of orders with a completed payment.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    pub order_statuses: Vec<StatusCount>,
    pub recent_orders: Vec<RecentOrder>,
    pub recent_reviews: Vec<RecentReview>,
}

/// GET /api/admin/dashboard/stats
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<DashboardStats>> {
    let pool = state.pool();
    let orders = OrderRepository::new(pool);

    let total_users = UserRepository::new(pool)
        .count_by_type(UserType::Customer)
        .await?;
    let bakers = BakerRepository::new(pool).counts().await?;
    let total_products = ProductRepository::new(pool).count().await?;
    let (total_orders, total_revenue) = orders.totals().await?;
    let order_statuses = orders.status_counts().await?;
    let recent_orders = orders.recent(RECENT).await?;
    let recent_reviews = ReviewRepository::new(pool).recent(RECENT).await?;

    Ok(Json(DashboardStats {
        total_users,
        total_bakers: bakers.total,
        verified_bakers: bakers.verified,
        unverified_bakers: bakers.total - bakers.verified,
        total_products,
        total_orders,
        total_revenue,
        order_statuses,
        recent_orders: recent_orders.into_iter().map(Into::into).collect(),
        recent_reviews: recent_reviews.into_iter().map(Into::into).collect(),
    }))
}
