//! Order fulfilment by the shop.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use local_crust_core::{NotificationKind, OrderId, OrderStatus};

use crate::db::orders::CustomerOrder;
use crate::db::{NotificationRepository, OrderRepository};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::ApiJson;
use crate::middleware::RequireBaker;
use crate::models::{Baker, NewNotification, Order};
use crate::services::notify::Recipient;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: Option<String>,
    /// Free text such as "30-45 minutes", passed on to the delivery notice.
    pub estimated_delivery_time: Option<String>,
}

/// Parse a requested status, listing the valid spellings on failure.
fn parse_status(raw: Option<&str>) -> Result<OrderStatus> {
    let raw = raw
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Status is required".into()))?;
    raw.parse().map_err(|_| {
        AppError::BadRequest(format!(
            "Invalid status: {raw}. Valid statuses are: {}",
            OrderStatus::valid_values()
        ))
    })
}

/// In-app notice for the customer, or `None` when the status is not announced.
fn status_notification(order: &Order, status: OrderStatus) -> Option<NewNotification> {
    let message = status.customer_message()?;
    Some(NewNotification {
        user_id: order.user_id,
        title: format!("Order {} Updated", order.order_number),
        message: message.to_owned(),
        kind: if status == OrderStatus::Delivered {
            NotificationKind::Success
        } else {
            NotificationKind::Info
        },
        related_review_id: None,
    })
}

#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub id: OrderId,
    pub order_id: String,
    pub status: OrderStatus,
    pub previous_status: OrderStatus,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdated {
    pub message: &'static str,
    pub order: StatusBody,
}

/// Move an order to a new status and tell the customer.
///
/// PUT /api/baker/orders/{order_id}/status
///
/// # Errors
///
/// Returns 400 for a missing or unknown status, 404 for an unknown order and
/// 403 when the order has none of the caller's products.
pub async fn update_status(
    State(state): State<AppState>,
    RequireBaker { baker, .. }: RequireBaker,
    Path(id): Path<OrderId>,
    ApiJson(req): ApiJson<StatusChange>,
) -> Result<Json<StatusUpdated>> {
    let status = parse_status(req.status.as_deref())?;

    let orders = OrderRepository::new(state.pool());
    let current = orders
        .get_with_customer(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;
    if !orders.contains_baker_items(id, baker.id).await? {
        return Err(AppError::Forbidden(
            "Unauthorized - order does not contain your products".into(),
        ));
    }

    let previous_status = current.order.status;
    let order = orders.update_status(id, status).await?;

    tracing::info!(
        order_number = %order.order_number,
        baker_id = %baker.id,
        from = %previous_status,
        to = %status,
        "Order status updated"
    );
    add_breadcrumb(
        "orders",
        "Order status updated",
        Some(&[("order_number", order.order_number.as_str()), ("status", status.as_str())]),
    );

    if let Some(notification) = status_notification(&order, status)
        && let Err(e) = NotificationRepository::new(state.pool())
            .create(&notification)
            .await
    {
        tracing::warn!(order_number = %order.order_number, error = %e, "Failed to store status notification");
    }

    notify_status_change(
        &state,
        &baker,
        CustomerOrder {
            order: order.clone(),
            ..current
        },
        req.estimated_delivery_time,
    );

    Ok(Json(StatusUpdated {
        message: "Order status updated successfully",
        order: StatusBody {
            id: order.id,
            order_id: order.order_number,
            status: order.status,
            previous_status,
        },
    }))
}

/// Publish the status update, and the delivery notice when the order leaves
/// the shop, in the background.
fn notify_status_change(
    state: &AppState,
    baker: &Baker,
    row: CustomerOrder,
    estimated_delivery_time: Option<String>,
) {
    let notifier = state.notifier().clone();
    let shop_name = baker.shop_name.clone();
    tokio::spawn(async move {
        let recipient = Recipient {
            name: &row.customer_name,
            email: &row.customer_email,
        };
        notifier
            .publish_order_status_update(
                &row.order.order_number,
                recipient,
                row.order.status,
                Some(&shop_name),
            )
            .await;

        if row.order.status == OrderStatus::OutForDelivery {
            notifier
                .publish_delivery_notification(
                    &row.order,
                    recipient,
                    estimated_delivery_time.as_deref(),
                )
                .await;
        }
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use local_crust_core::{PaymentStatus, UserId};

    use super::*;

    fn order() -> Order {
        Order {
            id: OrderId::new(4),
            order_number: "LC20250301120000123".into(),
            user_id: UserId::new(9),
            total_amount: Decimal::new(450, 0),
            status: OrderStatus::Confirmed,
            payment_status: PaymentStatus::Completed,
            payment_id: None,
            razorpay_order_id: None,
            delivery_address: serde_json::json!({"phone": "9999999999"}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(Some("ready")).unwrap(), OrderStatus::Ready);

        let missing = parse_status(None).unwrap_err();
        assert_eq!(missing.client_message(), "Status is required");

        let invalid = parse_status(Some("shipped")).unwrap_err();
        assert_eq!(
            invalid.client_message(),
            "Invalid status: shipped. Valid statuses are: pending, confirmed, preparing, \
             ready, out_for_delivery, delivered, cancelled"
        );
    }

    #[test]
    fn test_status_notification() {
        let delivered = status_notification(&order(), OrderStatus::Delivered).unwrap();
        assert_eq!(delivered.title, "Order LC20250301120000123 Updated");
        assert_eq!(delivered.message, "Your order has been delivered!");
        assert_eq!(delivered.kind, NotificationKind::Success);
        assert_eq!(delivered.user_id, UserId::new(9));

        let preparing = status_notification(&order(), OrderStatus::Preparing).unwrap();
        assert_eq!(preparing.kind, NotificationKind::Info);

        assert!(status_notification(&order(), OrderStatus::Pending).is_none());
    }
}
