//! Sales analytics for the baker dashboard.
//!
//! Only orders with a completed payment count towards revenue, sales and
//! customer figures. Hours are reported in UTC.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use local_crust_core::humanize::{hour_label, time_ago};
use local_crust_core::{OrderId, OrderStatus, PaymentStatus};

use super::{Currency, shop_lines};
use crate::db::analytics::{InventoryLine, TopCustomer, TopProduct};
use crate::db::orders::OrderFilter;
use crate::db::{AnalyticsRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireBaker;
use crate::routes::orders::group_items;
use crate::state::AppState;

/// Chart colours for category slices, reused in order.
const CATEGORY_COLORS: [&str; 6] = [
    "#D35400", "#E67E22", "#F39C12", "#F1C40F", "#52B788", "#8E24AA",
];

// ============================================================================
// Revenue
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub months: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MonthPoint {
    /// e.g. `Mar 2025`
    pub month: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    pub orders: i64,
}

#[derive(Debug, Serialize)]
pub struct RevenueTrends {
    pub revenue_trends: Vec<MonthPoint>,
    #[serde(flatten)]
    pub currency: Currency,
}

/// Monthly revenue over the last `months` months (30-day months).
///
/// GET /api/baker/analytics/revenue-trends?months=6
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn revenue_trends(
    State(state): State<AppState>,
    RequireBaker { baker, .. }: RequireBaker,
    Query(query): Query<TrendQuery>,
) -> Result<Json<RevenueTrends>> {
    let months = query.months.unwrap_or(6).clamp(1, 36);
    let since = Utc::now() - Duration::days(30 * months);

    let revenue_trends = AnalyticsRepository::new(state.pool())
        .revenue_by_month(baker.id, since)
        .await?
        .into_iter()
        .map(|row| MonthPoint {
            month: row.month.format("%b %Y").to_string(),
            revenue: row.revenue,
            orders: row.orders,
        })
        .collect();

    Ok(Json(RevenueTrends {
        revenue_trends,
        currency: Currency::default(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct TopProductsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TopProducts {
    pub top_products: Vec<TopProduct>,
    #[serde(flatten)]
    pub currency: Currency,
}

/// GET /api/baker/analytics/top-products?limit=10
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn top_products(
    State(state): State<AppState>,
    RequireBaker { baker, .. }: RequireBaker,
    Query(query): Query<TopProductsQuery>,
) -> Result<Json<TopProducts>> {
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let top_products = AnalyticsRepository::new(state.pool())
        .top_products(baker.id, limit)
        .await?;

    Ok(Json(TopProducts {
        top_products,
        currency: Currency::default(),
    }))
}

// ============================================================================
// Timing and mix
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HourPoint {
    /// 12-hour label, e.g. `3 PM`.
    pub hour: String,
    pub order_count: i64,
}

#[derive(Debug, Serialize)]
pub struct PeakHours {
    pub peak_hours: Vec<HourPoint>,
}

/// GET /api/baker/analytics/peak-hours
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn peak_hours(
    State(state): State<AppState>,
    RequireBaker { baker, .. }: RequireBaker,
) -> Result<Json<PeakHours>> {
    let peak_hours = AnalyticsRepository::new(state.pool())
        .orders_by_hour(baker.id)
        .await?
        .into_iter()
        .map(|row| HourPoint {
            hour: hour_label(u32::try_from(row.hour).unwrap_or_default()),
            order_count: row.order_count,
        })
        .collect();

    Ok(Json(PeakHours { peak_hours }))
}

#[derive(Debug, Serialize)]
pub struct CategorySlice {
    pub name: String,
    /// Revenue from this category.
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    /// Units sold.
    pub sales: i64,
    pub color: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CategoryDistribution {
    pub category_distribution: Vec<CategorySlice>,
    #[serde(flatten)]
    pub currency: Currency,
}

/// GET /api/baker/analytics/category-distribution
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn category_distribution(
    State(state): State<AppState>,
    RequireBaker { baker, .. }: RequireBaker,
) -> Result<Json<CategoryDistribution>> {
    let category_distribution = AnalyticsRepository::new(state.pool())
        .sales_by_category(baker.id)
        .await?
        .into_iter()
        .zip(CATEGORY_COLORS.iter().cycle())
        .map(|(row, &color)| CategorySlice {
            name: row.category,
            value: row.total_revenue,
            sales: row.total_sales,
            color,
        })
        .collect();

    Ok(Json(CategoryDistribution {
        category_distribution,
        currency: Currency::default(),
    }))
}

// ============================================================================
// Customers
// ============================================================================

/// Share of customers with more than one order, as a percentage to one
/// decimal place.
#[allow(clippy::cast_precision_loss)]
fn repeat_rate(repeat: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (repeat as f64 / total as f64 * 1000.0).round() / 10.0
}

#[derive(Debug, Serialize)]
pub struct Insights {
    pub total_customers: i64,
    pub repeat_customers: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_order_value: Decimal,
    pub repeat_rate: f64,
    pub top_customers: Vec<TopCustomer>,
}

#[derive(Debug, Serialize)]
pub struct CustomerInsights {
    pub customer_insights: Insights,
    #[serde(flatten)]
    pub currency: Currency,
}

/// GET /api/baker/analytics/customer-insights
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn customer_insights(
    State(state): State<AppState>,
    RequireBaker { baker, .. }: RequireBaker,
) -> Result<Json<CustomerInsights>> {
    let repo = AnalyticsRepository::new(state.pool());
    let totals = repo.customer_totals(baker.id).await?;
    let top_customers = repo.top_customers(baker.id, 5).await?;

    Ok(Json(CustomerInsights {
        customer_insights: Insights {
            repeat_rate: repeat_rate(totals.repeat_customers, totals.total_customers),
            total_customers: totals.total_customers,
            repeat_customers: totals.repeat_customers,
            avg_order_value: totals.avg_order_value,
            top_customers,
        },
        currency: Currency::default(),
    }))
}

// ============================================================================
// Inventory and history
// ============================================================================

#[derive(Debug, Serialize)]
pub struct Inventory {
    pub inventory: Vec<InventoryLine>,
    pub total_products: usize,
    pub in_stock_count: usize,
    pub out_of_stock_count: usize,
    #[serde(flatten)]
    pub currency: Currency,
}

/// Every product in the shop with units sold over the last seven days.
///
/// GET /api/baker/inventory
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn inventory(
    State(state): State<AppState>,
    RequireBaker { baker, .. }: RequireBaker,
) -> Result<Json<Inventory>> {
    let inventory = AnalyticsRepository::new(state.pool())
        .inventory(baker.id, Utc::now() - Duration::days(7))
        .await?;
    let in_stock_count = inventory.iter().filter(|p| p.in_stock).count();

    Ok(Json(Inventory {
        total_products: inventory.len(),
        out_of_stock_count: inventory.len() - in_stock_count,
        in_stock_count,
        inventory,
        currency: Currency::default(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Parse a filter date. Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS`
/// timestamp (taken as UTC) or a bare `YYYY-MM-DD` (midnight UTC).
fn parse_filter_date(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| AppError::BadRequest(format!("Invalid date: {raw}")))
}

impl HistoryQuery {
    fn filter(&self) -> Result<OrderFilter> {
        let status = self
            .status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::parse::<OrderStatus>)
            .transpose()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        Ok(OrderFilter {
            status,
            from: self.start_date.as_deref().map(parse_filter_date).transpose()?,
            until: self.end_date.as_deref().map(parse_filter_date).transpose()?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryLine {
    pub product_name: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

#[derive(Debug, Serialize)]
pub struct HistoryOrder {
    pub id: OrderId,
    pub order_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub items: Vec<HistoryLine>,
    /// Whole-order total, as charged to the customer.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub time_ago: String,
}

#[derive(Debug, Serialize)]
pub struct OrderHistory {
    pub orders: Vec<HistoryOrder>,
    pub total_orders: usize,
    #[serde(flatten)]
    pub currency: Currency,
}

/// GET /api/baker/order-history?status&start_date&end_date
///
/// # Errors
///
/// Returns 400 for an unknown status or an unparseable date.
pub async fn order_history(
    State(state): State<AppState>,
    RequireBaker { baker, .. }: RequireBaker,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<OrderHistory>> {
    let filter = query.filter()?;
    let repo = OrderRepository::new(state.pool());
    let rows = repo.list_for_baker(baker.id, &filter).await?;
    let ids: Vec<OrderId> = rows.iter().map(|r| r.order.id).collect();
    let mut items = group_items(shop_lines(repo.items_for_orders(&ids).await?, baker.id));

    let now = Utc::now();
    let orders: Vec<HistoryOrder> = rows
        .into_iter()
        .map(|row| HistoryOrder {
            id: row.order.id,
            items: items
                .remove(&row.order.id)
                .unwrap_or_default()
                .into_iter()
                .map(|l| HistoryLine {
                    product_name: l.product_name,
                    quantity: l.quantity,
                    price: l.price,
                })
                .collect(),
            order_id: row.order.order_number,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            total_amount: row.order.total_amount,
            status: row.order.status,
            payment_status: row.order.payment_status,
            time_ago: time_ago(now, row.order.created_at),
            created_at: row.order.created_at,
        })
        .collect();

    Ok(Json(OrderHistory {
        total_orders: orders.len(),
        orders,
        currency: Currency::default(),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_repeat_rate() {
        assert!((repeat_rate(1, 3) - 33.3).abs() < 1e-9);
        assert!((repeat_rate(2, 2) - 100.0).abs() < 1e-9);
        assert!(repeat_rate(0, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_filter_date_formats() {
        let midnight = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_filter_date("2025-03-01").unwrap(), midnight);
        assert_eq!(parse_filter_date("2025-03-01T00:00:00").unwrap(), midnight);
        assert_eq!(
            parse_filter_date("2025-03-01T05:30:00+05:30").unwrap(),
            midnight
        );
        assert!(parse_filter_date("March 1st").is_err());
    }

    #[test]
    fn test_history_filter_rejects_unknown_status() {
        let query = HistoryQuery {
            status: Some("shipped".into()),
            start_date: None,
            end_date: None,
        };
        assert!(query.filter().is_err());

        let query = HistoryQuery {
            status: Some("delivered".into()),
            start_date: Some("2025-01-01".into()),
            end_date: None,
        };
        let filter = query.filter().unwrap();
        assert_eq!(filter.status, Some(OrderStatus::Delivered));
        assert!(filter.from.is_some());
        assert!(filter.until.is_none());
    }

    #[test]
    fn test_category_colors_cycle() {
        let colors: Vec<_> = (0..8)
            .zip(CATEGORY_COLORS.iter().cycle())
            .map(|(_, &c)| c)
            .collect();
        assert_eq!(colors[0], "#D35400");
        assert_eq!(colors[6], "#D35400");
        assert_eq!(colors[7], "#E67E22");
    }
}
