//! Checkout, payment confirmation and a customer's order history.
//!
//! Placing an order writes the order and its lines in one transaction, then
//! creates the gateway order and sends notifications. Nothing after the
//! commit can fail the request: gateway and notification errors are logged
//! and the order stands.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use local_crust_core::{OrderId, OrderStatus, PaymentStatus, ProductId};

use crate::db::{OrderRepository, ProductRepository, UserRepository};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::ApiJson;
use crate::middleware::{CurrentUser, RequireUser};
use crate::models::{Order, OrderItem, User};
use crate::services::notify::Recipient;
use crate::services::orders::{CartLine, order_number, order_total, price_lines, split_by_shop};
use crate::services::razorpay::Payment;
use crate::state::AppState;

/// Bucket order lines by the order they belong to.
pub(crate) fn group_items(items: Vec<OrderItem>) -> HashMap<OrderId, Vec<OrderItem>> {
    let mut grouped: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for item in items {
        grouped.entry(item.order_id).or_default().push(item);
    }
    grouped
}

/// An order with its lines.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// ============================================================================
// Checkout
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Option<Vec<CartLine>>,
    pub delivery_address: Option<serde_json::Value>,
    /// Client-side total. The server recomputes the total from catalogue prices.
    #[serde(default)]
    pub total_amount: Option<Decimal>,
}

/// Place an order for the items in the cart.
///
/// POST /api/orders
///
/// # Errors
///
/// Returns 400 for an empty cart, a bad quantity or an out-of-stock product,
/// and 404 for an unknown product.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(req): ApiJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderDetail>)> {
    let cart = req
        .items
        .ok_or_else(|| AppError::BadRequest("Missing required field: items".into()))?;
    let address = req
        .delivery_address
        .filter(|a| !a.is_null())
        .ok_or_else(|| AppError::BadRequest("Missing required field: delivery_address".into()))?;

    let ids: Vec<ProductId> = cart.iter().map(|line| line.product_id).collect();
    let catalogue = ProductRepository::new(state.pool())
        .get_many_with_baker(&ids)
        .await?;
    let lines = price_lines(&cart, &catalogue)?;
    let total = order_total(&lines);

    if req.total_amount.is_some_and(|claimed| claimed != total) {
        tracing::debug!(%total, "Client total differs from catalogue total");
    }

    let orders = OrderRepository::new(state.pool());
    let number = order_number(Utc::now());
    let (mut order, items) = orders
        .create(user.id, &number, total, &address, &lines)
        .await?;

    tracing::info!(
        order_number = %order.order_number,
        user_id = %user.id,
        items = items.len(),
        %total,
        "Order placed"
    );
    add_breadcrumb(
        "orders",
        "Order placed",
        Some(&[("order_number", order.order_number.as_str())]),
    );

    if let Some(razorpay) = state.razorpay() {
        match razorpay.create_order(total, &order.order_number).await {
            Ok(gateway_order) => {
                if let Err(e) = orders
                    .set_razorpay_order_id(order.id, &gateway_order.id)
                    .await
                {
                    tracing::error!(order_number = %order.order_number, error = %e, "Failed to store gateway order id");
                }
                order.razorpay_order_id = Some(gateway_order.id);
            }
            Err(e) => {
                tracing::error!(
                    order_number = %order.order_number,
                    error = %e,
                    "Gateway order creation failed"
                );
            }
        }
    }

    notify_order_placed(&state, user, order.clone(), items.clone()).await;

    Ok((StatusCode::CREATED, Json(OrderDetail { order, items })))
}

/// Send the customer confirmation and one notice per shop in the background.
async fn notify_order_placed(
    state: &AppState,
    user: CurrentUser,
    order: Order,
    items: Vec<OrderItem>,
) {
    let customer = match UserRepository::new(state.pool()).get_by_id(user.id).await {
        Ok(Some(customer)) => customer,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(error = %e, "Could not load customer for order notifications");
            return;
        }
    };

    let notifier = state.notifier().clone();
    tokio::spawn(async move {
        let recipient = Recipient {
            name: &customer.name,
            email: customer.email.as_str(),
        };
        notifier
            .publish_order_confirmation(&order, recipient, &items)
            .await;

        for share in split_by_shop(&items) {
            notifier
                .publish_baker_new_order(
                    &order.order_number,
                    share.baker_name,
                    &customer.name,
                    &share.items,
                    share.subtotal,
                )
                .await;
        }
    });
}

// ============================================================================
// Payment
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PaymentUpdate {
    pub payment_id: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub razorpay_order_id: Option<String>,
    pub razorpay_signature: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentRecorded {
    pub id: OrderId,
    pub order_id: String,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
}

/// Load an order and check it belongs to `user`.
async fn owned_order(state: &AppState, user: CurrentUser, id: OrderId) -> Result<Order> {
    let order = OrderRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;

    if order.user_id != user.id {
        return Err(AppError::Forbidden("Unauthorized".into()));
    }
    Ok(order)
}

/// Record the payment outcome reported by checkout.
///
/// A checkout signature, when supplied, must match. A completed payment
/// confirms the order.
///
/// PUT /api/orders/{order_id}/payment
///
/// # Errors
///
/// Returns 404 for an unknown order, 403 for someone else's order and 400
/// when the signature does not verify.
pub async fn record_payment(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<OrderId>,
    ApiJson(req): ApiJson<PaymentUpdate>,
) -> Result<Json<PaymentRecorded>> {
    let order = owned_order(&state, user, id).await?;

    if let Some(signature) = req.razorpay_signature.as_deref() {
        let razorpay = state
            .razorpay()
            .ok_or_else(|| AppError::Unavailable("Payment gateway not configured".into()))?;
        let gateway_order_id = req
            .razorpay_order_id
            .as_deref()
            .or(order.razorpay_order_id.as_deref())
            .ok_or_else(|| AppError::BadRequest("razorpay_order_id is required".into()))?;
        let payment_id = req
            .payment_id
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("payment_id is required".into()))?;
        razorpay.verify_signature(gateway_order_id, payment_id, signature)?;
    }

    let payment_status = req.payment_status.unwrap_or(PaymentStatus::Completed);
    let updated = OrderRepository::new(state.pool())
        .record_payment(order.id, req.payment_id.as_deref(), payment_status)
        .await?;

    tracing::info!(
        order_number = %updated.order_number,
        payment_status = %updated.payment_status,
        "Payment recorded"
    );

    if payment_status == PaymentStatus::Completed && order.payment_status != PaymentStatus::Completed
    {
        notify_payment_completed(&state, user, updated.clone()).await;
    }

    Ok(Json(PaymentRecorded {
        id: updated.id,
        order_id: updated.order_number,
        payment_status: updated.payment_status,
        status: updated.status,
    }))
}

/// Send the payment notice and confirmation email in the background.
async fn notify_payment_completed(state: &AppState, user: CurrentUser, order: Order) {
    let customer: User = match UserRepository::new(state.pool()).get_by_id(user.id).await {
        Ok(Some(customer)) => customer,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(error = %e, "Could not load customer for payment notifications");
            return;
        }
    };

    let notifier = state.notifier().clone();
    let mailer = state.email().cloned();
    tokio::spawn(async move {
        let recipient = Recipient {
            name: &customer.name,
            email: customer.email.as_str(),
        };
        notifier
            .publish_payment_confirmation(
                &order,
                recipient,
                order.payment_id.as_deref().unwrap_or_default(),
            )
            .await;

        if let Some(mailer) = mailer
            && let Err(e) = mailer
                .send_order_confirmation(
                    customer.email.as_str(),
                    &order.order_number,
                    order.total_amount,
                )
                .await
        {
            tracing::warn!(order_number = %order.order_number, error = %e, "Order confirmation email failed");
        }
    });
}

// ============================================================================
// History
// ============================================================================

#[derive(Debug, Serialize)]
pub struct OrderHistory {
    pub orders: Vec<OrderDetail>,
}

/// The caller's orders, newest first.
///
/// GET /api/orders/my-orders
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn mine(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<OrderHistory>> {
    let repo = OrderRepository::new(state.pool());
    let orders = repo.list_for_user(user.id).await?;
    let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
    let mut items = group_items(repo.items_for_orders(&ids).await?);

    let orders = orders
        .into_iter()
        .map(|order| OrderDetail {
            items: items.remove(&order.id).unwrap_or_default(),
            order,
        })
        .collect();

    Ok(Json(OrderHistory { orders }))
}

/// GET /api/orders/{order_id}
///
/// # Errors
///
/// Returns 404 for an unknown order and 403 for someone else's order.
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    let order = owned_order(&state, user, id).await?;
    let items = OrderRepository::new(state.pool()).items(order.id).await?;
    Ok(Json(OrderDetail { order, items }))
}

/// Payment details straight from the gateway.
///
/// GET /api/payments/{payment_id}
///
/// # Errors
///
/// Returns 503 when the gateway is not configured and 502 if the lookup fails.
pub async fn payment_details(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(payment_id): Path<String>,
) -> Result<Json<Payment>> {
    let razorpay = state
        .razorpay()
        .ok_or_else(|| AppError::Unavailable("Payment gateway not configured".into()))?;
    let payment = razorpay.fetch_payment(&payment_id).await?;
    Ok(Json(payment))
}
