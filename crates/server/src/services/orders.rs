//! Checkout helpers: order numbers, price snapshots and per-shop grouping.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use local_crust_core::{BakerId, ProductId};

use crate::models::{NewOrderItem, OrderItem, ProductWithBaker};

/// Largest quantity accepted for a single line.
const MAX_LINE_QUANTITY: i32 = 1_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("Order must contain at least one item")]
    Empty,

    #[error("Invalid quantity for product {0}")]
    InvalidQuantity(ProductId),

    #[error("Product {0} not found")]
    UnknownProduct(ProductId),

    #[error("{0} is out of stock")]
    OutOfStock(String),

    #[error("{0} is not available for ordering")]
    ShopNotVerified(String),
}

/// A cart line as submitted by the client.
///
/// Any client-side price is ignored; the catalogue price is charged.
#[derive(Debug, Clone, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i32,
    #[serde(default)]
    pub price: Option<Decimal>,
}

/// Public order number: `LC`, the UTC timestamp, and four random digits.
#[must_use]
pub fn order_number(now: DateTime<Utc>) -> String {
    let suffix: u16 = rand::rng().random_range(1000..=9999);
    format!("LC{}{suffix}", now.format("%Y%m%d%H%M%S"))
}

/// Resolve cart lines against the catalogue, snapshotting name, shop and price.
///
/// # Errors
///
/// Returns `OrderError` for an empty cart, a non-positive quantity, an
/// unknown product, a product that is out of stock or one sold by a shop
/// that has not been verified.
pub fn price_lines(
    cart: &[CartLine],
    catalogue: &[ProductWithBaker],
) -> Result<Vec<NewOrderItem>, OrderError> {
    if cart.is_empty() {
        return Err(OrderError::Empty);
    }

    let by_id: HashMap<ProductId, &ProductWithBaker> =
        catalogue.iter().map(|p| (p.product.id, p)).collect();

    cart.iter()
        .map(|line| {
            if !(1..=MAX_LINE_QUANTITY).contains(&line.quantity) {
                return Err(OrderError::InvalidQuantity(line.product_id));
            }
            let listing = by_id
                .get(&line.product_id)
                .ok_or(OrderError::UnknownProduct(line.product_id))?;
            if !listing.baker.verified {
                return Err(OrderError::ShopNotVerified(listing.product.name.clone()));
            }
            if !listing.product.in_stock {
                return Err(OrderError::OutOfStock(listing.product.name.clone()));
            }
            if line.price.is_some_and(|p| p != listing.product.price) {
                tracing::debug!(
                    product_id = %line.product_id,
                    "Client price differs from catalogue, charging catalogue price"
                );
            }

            Ok(NewOrderItem {
                product_id: listing.product.id,
                baker_id: listing.baker.id,
                product_name: listing.product.name.clone(),
                baker_name: listing.baker.shop_name.clone(),
                quantity: line.quantity,
                price: listing.product.price,
            })
        })
        .collect()
}

/// Sum of all line totals.
#[must_use]
pub fn order_total(items: &[NewOrderItem]) -> Decimal {
    items.iter().map(NewOrderItem::line_total).sum()
}

/// Lines sold by one shop within an order.
#[derive(Debug)]
pub struct ShopShare<'a> {
    pub baker_id: BakerId,
    pub baker_name: &'a str,
    pub items: Vec<&'a OrderItem>,
    pub subtotal: Decimal,
}

/// Split an order's lines by shop, in order of first appearance.
///
/// Lines whose shop has since been deleted are skipped.
#[must_use]
pub fn split_by_shop(items: &[OrderItem]) -> Vec<ShopShare<'_>> {
    let mut shares: Vec<ShopShare<'_>> = Vec::new();
    for item in items {
        let Some(baker_id) = item.baker_id else {
            continue;
        };
        match shares.iter_mut().find(|s| s.baker_id == baker_id) {
            Some(share) => {
                share.subtotal += item.line_total();
                share.items.push(item);
            }
            None => shares.push(ShopShare {
                baker_id,
                baker_name: &item.baker_name,
                items: vec![item],
                subtotal: item.line_total(),
            }),
        }
    }
    shares
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use local_crust_core::{OrderId, OrderItemId};

    use super::*;
    use crate::models::Product;
    use crate::models::product::ShopRef;

    fn listing(id: i32, baker: i32, price: Decimal, in_stock: bool) -> ProductWithBaker {
        shop_listing(id, baker, price, in_stock, true)
    }

    fn shop_listing(
        id: i32,
        baker: i32,
        price: Decimal,
        in_stock: bool,
        verified: bool,
    ) -> ProductWithBaker {
        ProductWithBaker {
            product: Product {
                id: ProductId::new(id),
                baker_id: BakerId::new(baker),
                name: format!("Loaf {id}"),
                category: "Bread".into(),
                price,
                description: None,
                image_url: None,
                in_stock,
                created_at: Utc::now(),
            },
            baker: ShopRef {
                id: BakerId::new(baker),
                shop_name: format!("Shop {baker}"),
                city: "Pune".into(),
                verified,
            },
        }
    }

    fn line(product: i32, quantity: i32, price: Option<Decimal>) -> CartLine {
        CartLine {
            product_id: ProductId::new(product),
            quantity,
            price,
        }
    }

    #[test]
    fn test_order_number_format() {
        let now = DateTime::parse_from_rfc3339("2026-03-20T12:30:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let number = order_number(now);
        assert!(number.starts_with("LC20260320123005"));
        assert_eq!(number.len(), 20);
        let suffix: u16 = number[16..].parse().unwrap();
        assert!((1000..=9999).contains(&suffix));
    }

    #[test]
    fn test_catalogue_price_is_charged() {
        let catalogue = [
            listing(1, 10, Decimal::new(180, 0), true),
            listing(2, 20, Decimal::new(4550, 2), true),
        ];
        let items = price_lines(
            &[line(1, 2, Some(Decimal::ONE)), line(2, 3, None)],
            &catalogue,
        )
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].price, Decimal::new(180, 0));
        assert_eq!(items[0].baker_name, "Shop 10");
        assert_eq!(items[1].baker_id, BakerId::new(20));
        assert_eq!(order_total(&items), Decimal::new(49650, 2));
    }

    #[test]
    fn test_price_lines_rejections() {
        let catalogue = [
            listing(1, 10, Decimal::new(180, 0), true),
            listing(2, 10, Decimal::new(90, 0), false),
        ];

        assert_eq!(price_lines(&[], &catalogue), Err(OrderError::Empty));
        assert_eq!(
            price_lines(&[line(1, 0, None)], &catalogue),
            Err(OrderError::InvalidQuantity(ProductId::new(1)))
        );
        assert_eq!(
            price_lines(&[line(9, 1, None)], &catalogue),
            Err(OrderError::UnknownProduct(ProductId::new(9)))
        );
        assert_eq!(
            price_lines(&[line(2, 1, None)], &catalogue),
            Err(OrderError::OutOfStock("Loaf 2".into()))
        );
    }

    #[test]
    fn test_unverified_shop_cannot_sell() {
        let catalogue = [
            listing(1, 10, Decimal::new(180, 0), true),
            shop_listing(3, 30, Decimal::new(250, 0), true, false),
        ];

        let err = price_lines(&[line(1, 1, None), line(3, 1, None)], &catalogue).unwrap_err();
        assert_eq!(err, OrderError::ShopNotVerified("Loaf 3".into()));
        assert_eq!(err.to_string(), "Loaf 3 is not available for ordering");
    }

    #[test]
    fn test_split_by_shop() {
        let item = |id: i32, baker: Option<i32>, qty: i32, price: i64| OrderItem {
            id: OrderItemId::new(id),
            order_id: OrderId::new(1),
            product_id: Some(ProductId::new(id)),
            baker_id: baker.map(BakerId::new),
            product_name: format!("Item {id}"),
            baker_name: format!("Shop {}", baker.unwrap_or_default()),
            quantity: qty,
            price: Decimal::new(price, 0),
        };
        let items = [
            item(1, Some(10), 2, 100),
            item(2, Some(20), 1, 50),
            item(3, Some(10), 1, 30),
            item(4, None, 1, 999),
        ];

        let shares = split_by_shop(&items);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].baker_id, BakerId::new(10));
        assert_eq!(shares[0].items.len(), 2);
        assert_eq!(shares[0].subtotal, Decimal::new(230, 0));
        assert_eq!(shares[1].baker_name, "Shop 20");
        assert_eq!(shares[1].subtotal, Decimal::new(50, 0));
    }
}
