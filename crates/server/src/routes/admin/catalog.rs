//! Moderation of products, orders and reviews across every shop.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use local_crust_core::{OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId, ReviewId, UserId};

use super::{PageQuery, Paged};
use crate::db::orders::CustomerOrder;
use crate::db::products::ProductListing;
use crate::db::reviews::ModerationReview;
use crate::db::{OrderRepository, Page, ProductRepository, RepositoryError, ReviewRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::OrderItem;
use crate::routes::Message;
use crate::state::AppState;

/// Map a missing row to a 404 with `message`.
fn not_found(message: &'static str) -> impl FnOnce(RepositoryError) -> AppError {
    move |e| match e {
        RepositoryError::NotFound => AppError::NotFound(message.into()),
        other => other.into(),
    }
}

// ============================================================================
// Products
// ============================================================================

#[derive(Debug, Serialize)]
pub struct Products {
    pub products: Vec<ProductListing>,
}

/// GET /api/admin/products?page&per_page
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn products(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paged<Products>>> {
    let page = query.page();
    let (products, total) = ProductRepository::new(state.pool()).list_all(page).await?;
    Ok(Json(Paged::new(Products { products }, total, page)))
}

/// DELETE /api/admin/products/{id}
///
/// # Errors
///
/// Returns 404 if the product does not exist.
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<Message>> {
    ProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(not_found("Product not found"))?;
    tracing::info!(admin_id = %admin.id, product_id = %id, "Admin removed product");

    Ok(Json(Message::new("Product deleted successfully")))
}

// ============================================================================
// Orders
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct OrderRow {
    pub id: OrderId,
    pub order_id: String,
    pub user_id: UserId,
    pub user_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl From<CustomerOrder> for OrderRow {
    fn from(row: CustomerOrder) -> Self {
        Self {
            id: row.order.id,
            order_id: row.order.order_number,
            user_id: row.order.user_id,
            user_name: row.customer_name,
            total_amount: row.order.total_amount,
            status: row.order.status,
            payment_status: row.order.payment_status,
            created_at: row.order.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Orders {
    pub orders: Vec<OrderRow>,
}

/// GET /api/admin/orders?status&page&per_page
///
/// # Errors
///
/// Returns 400 for an unknown status.
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Paged<Orders>>> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let page = Page::new(query.page, query.per_page);

    let (orders, total) = OrderRepository::new(state.pool())
        .list_all(status, page)
        .await?;

    Ok(Json(Paged::new(
        Orders {
            orders: orders.into_iter().map(Into::into).collect(),
        },
        total,
        page,
    )))
}

#[derive(Debug, Serialize)]
pub struct Customer {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct Line {
    pub id: OrderItemId,
    pub product_name: String,
    pub baker_name: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl From<OrderItem> for Line {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id,
            product_name: item.product_name,
            baker_name: item.baker_name,
            quantity: item.quantity,
            price: item.price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub id: OrderId,
    pub order_id: String,
    pub user: Customer,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub delivery_address: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<Line>,
}

/// GET /api/admin/orders/{id}
///
/// # Errors
///
/// Returns 404 if the order does not exist.
pub async fn order(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    let repo = OrderRepository::new(state.pool());
    let CustomerOrder {
        order,
        customer_name,
        customer_email,
    } = repo
        .get_with_customer(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;
    let items = repo.items(id).await?;

    Ok(Json(OrderDetail {
        id: order.id,
        order_id: order.order_number,
        user: Customer {
            id: order.user_id,
            name: customer_name,
            email: customer_email,
        },
        total_amount: order.total_amount,
        status: order.status,
        payment_status: order.payment_status,
        payment_id: order.payment_id,
        delivery_address: order.delivery_address,
        created_at: order.created_at,
        updated_at: order.updated_at,
        items: items.into_iter().map(Into::into).collect(),
    }))
}

// ============================================================================
// Reviews
// ============================================================================

#[derive(Debug, Serialize)]
pub struct Reviews {
    pub reviews: Vec<ModerationReview>,
}

/// GET /api/admin/reviews?page&per_page
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn reviews(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paged<Reviews>>> {
    let page = query.page();
    let (reviews, total) = ReviewRepository::new(state.pool()).list_all(page).await?;
    Ok(Json(Paged::new(Reviews { reviews }, total, page)))
}

/// DELETE /api/admin/reviews/{id}
///
/// # Errors
///
/// Returns 404 if the review does not exist.
pub async fn delete_review(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ReviewId>,
) -> Result<Json<Message>> {
    ReviewRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(not_found("Review not found"))?;
    tracing::info!(admin_id = %admin.id, review_id = %id, "Admin removed review");

    Ok(Json(Message::new("Review deleted successfully")))
}
