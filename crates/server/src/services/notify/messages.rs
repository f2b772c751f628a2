//! Message bodies for SNS notifications.

use askama::Template;
use rust_decimal::Decimal;

use local_crust_core::{OrderStatus, Price};

use crate::models::OrderItem;

/// One formatted order line.
#[derive(Debug, Clone)]
pub struct Line {
    pub product_name: String,
    pub quantity: i32,
    pub total: String,
}

impl From<&OrderItem> for Line {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            total: rupees(item.line_total()),
        }
    }
}

#[derive(Template)]
#[template(path = "sns/order_confirmation.txt")]
pub struct OrderConfirmation<'a> {
    pub order_number: &'a str,
    pub customer_name: &'a str,
    pub customer_email: &'a str,
    pub lines: Vec<Line>,
    pub total: String,
}

#[derive(Template)]
#[template(path = "sns/status_update.txt")]
pub struct StatusUpdate<'a> {
    pub order_number: &'a str,
    pub customer_name: &'a str,
    pub customer_email: &'a str,
    pub baker_name: Option<&'a str>,
    pub title: &'static str,
    pub description: &'static str,
    pub action: &'static str,
}

#[derive(Template)]
#[template(path = "sns/delivery.txt")]
pub struct Delivery<'a> {
    pub order_number: &'a str,
    pub customer_name: &'a str,
    pub customer_email: &'a str,
    pub address: String,
    pub estimated_time: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "sns/baker_new_order.txt")]
pub struct BakerNewOrder<'a> {
    pub order_number: &'a str,
    pub baker_name: &'a str,
    pub customer_name: &'a str,
    pub lines: Vec<Line>,
    pub total: String,
}

#[derive(Template)]
#[template(path = "sns/payment_confirmation.txt")]
pub struct PaymentConfirmation<'a> {
    pub order_number: &'a str,
    pub customer_name: &'a str,
    pub customer_email: &'a str,
    pub payment_id: &'a str,
    pub amount: String,
}

/// Customer-facing wording for a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCopy {
    pub emoji: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub action: &'static str,
}

#[must_use]
pub const fn status_copy(status: OrderStatus) -> StatusCopy {
    match status {
        OrderStatus::Pending => StatusCopy {
            emoji: "📋",
            title: "Status Update",
            description: "Your order is waiting to be confirmed.",
            action: "Thank you for your order!",
        },
        OrderStatus::Confirmed => StatusCopy {
            emoji: "✅",
            title: "Order Confirmed",
            description: "Your order has been confirmed and is being prepared.",
            action: "Our bakers will start preparing your items soon.",
        },
        OrderStatus::Preparing => StatusCopy {
            emoji: "👨‍🍳",
            title: "Being Prepared",
            description: "Our bakers are preparing your delicious items!",
            action: "Your order is being prepared with care.",
        },
        OrderStatus::Ready => StatusCopy {
            emoji: "📦",
            title: "Ready for Pickup/Delivery",
            description: "Your order is ready!",
            action: "It will be out for delivery shortly.",
        },
        OrderStatus::OutForDelivery => StatusCopy {
            emoji: "🚚",
            title: "Out for Delivery",
            description: "Your order is on its way to you!",
            action: "Please be available to receive it.",
        },
        OrderStatus::Delivered => StatusCopy {
            emoji: "🎉",
            title: "Delivered",
            description: "Your order has been delivered. Enjoy!",
            action: "We hope you enjoy your fresh baked goods. Please rate your experience.",
        },
        OrderStatus::Cancelled => StatusCopy {
            emoji: "❌",
            title: "Order Cancelled",
            description: "Your order has been cancelled.",
            action: "If you have any questions, please contact our support team.",
        },
    }
}

/// Format a rupee amount, e.g. `₹249.50`.
#[must_use]
pub fn rupees(amount: Decimal) -> String {
    Price::inr(amount).display()
}

/// Render a stored delivery address as a single line.
///
/// Accepts the checkout form's field names and the older street/zip names.
#[must_use]
pub fn format_address(address: &serde_json::Value) -> String {
    const FIELDS: [&[&str]; 5] = [
        &["addressLine1", "street"],
        &["addressLine2"],
        &["city"],
        &["state"],
        &["pincode", "zip_code"],
    ];

    if let Some(text) = address.as_str() {
        return text.to_string();
    }

    FIELDS
        .iter()
        .filter_map(|keys| {
            keys.iter()
                .find_map(|k| address.get(*k).and_then(serde_json::Value::as_str))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_format_address_checkout_form() {
        let address = json!({
            "fullName": "Asha Rao",
            "phone": "9876543210",
            "addressLine1": "12 MG Road",
            "addressLine2": "",
            "city": "Bengaluru",
            "state": "Karnataka",
            "pincode": "560001"
        });
        assert_eq!(
            format_address(&address),
            "12 MG Road, Bengaluru, Karnataka, 560001"
        );
    }

    #[test]
    fn test_format_address_legacy_and_plain() {
        let address = json!({"street": "4 Park St", "city": "Kolkata", "zip_code": "700016"});
        assert_eq!(format_address(&address), "4 Park St, Kolkata, 700016");
        assert_eq!(format_address(&json!("Counter pickup")), "Counter pickup");
    }

    #[test]
    fn test_order_confirmation_lists_lines() {
        let body = OrderConfirmation {
            order_number: "LC202603011030001234",
            customer_name: "Asha",
            customer_email: "asha@example.com",
            lines: vec![
                Line {
                    product_name: "Sourdough".into(),
                    quantity: 2,
                    total: rupees(Decimal::new(500, 0)),
                },
                Line {
                    product_name: "Croissant".into(),
                    quantity: 1,
                    total: rupees(Decimal::new(9050, 2)),
                },
            ],
            total: rupees(Decimal::new(59050, 2)),
        }
        .render()
        .unwrap();

        assert!(body.contains("Sourdough x2 - ₹500.00"));
        assert!(body.contains("Croissant x1 - ₹90.50"));
        assert!(body.contains("Total: ₹590.50"));
    }

    #[test]
    fn test_status_update_optional_baker() {
        let copy = status_copy(OrderStatus::Ready);
        let render = |baker_name| {
            StatusUpdate {
                order_number: "LC1",
                customer_name: "Asha",
                customer_email: "asha@example.com",
                baker_name,
                title: copy.title,
                description: copy.description,
                action: copy.action,
            }
            .render()
            .unwrap()
        };

        assert!(render(Some("Rise & Shine")).contains("Baker: Rise & Shine"));
        assert!(!render(None).contains("Baker:"));
    }

    #[test]
    fn test_every_status_has_copy() {
        for status in OrderStatus::ALL {
            let copy = status_copy(status);
            assert!(!copy.title.is_empty());
            assert!(!copy.action.is_empty());
        }
    }
}
