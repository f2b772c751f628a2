//! Orders and their line items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use local_crust_core::{
    BakerId, OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId, UserId,
};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    /// Public order number, `LC` followed by a timestamp and 4 random digits.
    #[serde(rename = "order_id")]
    pub order_number: String,
    pub user_id: UserId,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub razorpay_order_id: Option<String>,
    pub delivery_address: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Phone number captured on the delivery form, if any.
    #[must_use]
    pub fn delivery_phone(&self) -> &str {
        self.delivery_address
            .get("phone")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
    }
}

/// A purchased line, snapshotted at order time.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    #[serde(skip_serializing)]
    pub id: OrderItemId,
    #[serde(skip_serializing)]
    pub order_id: OrderId,
    /// `None` once the product has been removed from the catalogue.
    pub product_id: Option<ProductId>,
    #[serde(skip_serializing)]
    pub baker_id: Option<BakerId>,
    pub product_name: String,
    pub baker_name: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A line ready to be written, with prices resolved from the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub baker_id: BakerId,
    pub product_name: String,
    pub baker_name: String,
    pub quantity: i32,
    pub price: Decimal,
}

impl NewOrderItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Sum of `price * quantity` over a set of lines.
pub fn items_total<'a>(items: impl IntoIterator<Item = &'a OrderItem>) -> Decimal {
    items.into_iter().map(OrderItem::line_total).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(qty: i32, price: Decimal) -> OrderItem {
        OrderItem {
            id: OrderItemId::new(1),
            order_id: OrderId::new(1),
            product_id: Some(ProductId::new(2)),
            baker_id: Some(BakerId::new(3)),
            product_name: "Croissant".into(),
            baker_name: "Butter & Co".into(),
            quantity: qty,
            price,
        }
    }

    #[test]
    fn test_items_total() {
        let items = [item(2, Decimal::new(4500, 2)), item(1, Decimal::new(120, 0))];
        assert_eq!(items_total(&items), Decimal::new(210, 0));
    }

    #[test]
    fn test_order_serializes_number_as_order_id() {
        let order = Order {
            id: OrderId::new(9),
            order_number: "LC202403201200001234".into(),
            user_id: UserId::new(1),
            total_amount: Decimal::new(24950, 2),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_id: None,
            razorpay_order_id: None,
            delivery_address: serde_json::json!({"phone": "9876543210"}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&order).unwrap_or_default();
        assert_eq!(json["order_id"], "LC202403201200001234");
        assert_eq!(json["total_amount"], 249.5);
        assert_eq!(order.delivery_phone(), "9876543210");
    }
}
