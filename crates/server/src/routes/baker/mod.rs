//! Routes for a signed-in baker's back office.
//!
//! Every handler here takes [`RequireBaker`](crate::middleware::RequireBaker),
//! and every figure is scoped to the lines the caller's shop sold. An order
//! that mixes several shops shows each baker only their own lines and
//! subtotal.

pub mod analytics;
pub mod dashboard;
pub mod orders;
pub mod reviews;

use local_crust_core::{BakerId, CurrencyCode};
use serde::Serialize;

use crate::models::OrderItem;

/// Currency fields attached to money-bearing baker responses.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Currency {
    pub currency: &'static str,
    pub currency_symbol: &'static str,
}

impl Default for Currency {
    fn default() -> Self {
        let code = CurrencyCode::default();
        Self {
            currency: code.code(),
            currency_symbol: code.symbol(),
        }
    }
}

/// Keep only the lines sold by `baker_id`.
pub(crate) fn shop_lines(items: Vec<OrderItem>, baker_id: BakerId) -> Vec<OrderItem> {
    items
        .into_iter()
        .filter(|item| item.baker_id == Some(baker_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use local_crust_core::{OrderId, OrderItemId, ProductId};

    use super::*;

    fn line(id: i32, baker: i32) -> OrderItem {
        OrderItem {
            id: OrderItemId::new(id),
            order_id: OrderId::new(1),
            product_id: Some(ProductId::new(id)),
            baker_id: Some(BakerId::new(baker)),
            product_name: format!("Loaf {id}"),
            baker_name: format!("Shop {baker}"),
            quantity: 1,
            price: Decimal::new(100, 0),
        }
    }

    #[test]
    fn test_shop_lines_keeps_own_items() {
        let items = vec![line(1, 7), line(2, 8), line(3, 7)];
        let own = shop_lines(items, BakerId::new(7));
        assert_eq!(own.len(), 2);
        assert!(own.iter().all(|i| i.baker_id == Some(BakerId::new(7))));
    }

    #[test]
    fn test_currency_defaults_to_rupee() {
        let currency = Currency::default();
        assert_eq!(currency.currency, "INR");
        assert_eq!(currency.currency_symbol, "₹");
    }
}
