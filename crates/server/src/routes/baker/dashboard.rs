//! Dashboard headline numbers and the shop's incoming orders.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use local_crust_core::{OrderId, OrderStatus, PaymentStatus, ProductId};

use super::{Currency, shop_lines};
use crate::db::analytics::DashboardStats;
use crate::db::orders::OrderFilter;
use crate::db::{AnalyticsRepository, OrderRepository};
use crate::error::Result;
use crate::middleware::RequireBaker;
use crate::routes::orders::group_items;
use crate::state::AppState;

/// GET /api/baker/dashboard/stats
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn stats(
    State(state): State<AppState>,
    RequireBaker { baker, .. }: RequireBaker,
) -> Result<Json<DashboardStats>> {
    let stats = AnalyticsRepository::new(state.pool())
        .dashboard(baker.id)
        .await?;
    Ok(Json(stats))
}

#[derive(Debug, Serialize)]
pub struct ShopLine {
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// One order as the shop sees it: only its own lines and their subtotal.
#[derive(Debug, Serialize)]
pub struct ShopOrder {
    pub id: OrderId,
    pub order_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub items: Vec<ShopLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub delivery_address: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ShopOrders {
    pub orders: Vec<ShopOrder>,
    #[serde(flatten)]
    pub currency: Currency,
}

/// Orders containing at least one of the caller's products, newest first.
///
/// GET /api/baker/orders
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn orders(
    State(state): State<AppState>,
    RequireBaker { baker, .. }: RequireBaker,
) -> Result<Json<ShopOrders>> {
    let repo = OrderRepository::new(state.pool());
    let orders = repo
        .list_for_baker(baker.id, &OrderFilter::default())
        .await?;
    let ids: Vec<OrderId> = orders.iter().map(|o| o.order.id).collect();
    let mut items = group_items(shop_lines(repo.items_for_orders(&ids).await?, baker.id));

    let orders = orders
        .into_iter()
        .map(|row| {
            let lines = items.remove(&row.order.id).unwrap_or_default();
            let total_amount = lines.iter().map(|l| l.line_total()).sum();
            ShopOrder {
                id: row.order.id,
                customer_phone: row.order.delivery_phone().to_owned(),
                order_id: row.order.order_number,
                customer_name: row.customer_name,
                customer_email: row.customer_email,
                items: lines
                    .into_iter()
                    .map(|l| ShopLine {
                        product_id: l.product_id,
                        product_name: l.product_name,
                        quantity: l.quantity,
                        price: l.price,
                    })
                    .collect(),
                total_amount,
                status: row.order.status,
                payment_status: row.order.payment_status,
                delivery_address: row.order.delivery_address,
                created_at: row.order.created_at,
            }
        })
        .collect();

    Ok(Json(ShopOrders {
        orders,
        currency: Currency::default(),
    }))
}
