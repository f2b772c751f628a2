//! Catalogue products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use local_crust_core::{BakerId, ProductId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    #[serde(skip_serializing)]
    pub baker_id: BakerId,
    pub name: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
}

/// Shop summary embedded in product listings.
#[derive(Debug, Clone, Serialize)]
pub struct ShopRef {
    pub id: BakerId,
    pub shop_name: String,
    pub city: String,
    /// Only verified shops can sell.
    #[serde(skip_serializing)]
    pub verified: bool,
}

/// A product joined with the shop that sells it.
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithBaker {
    #[serde(flatten)]
    pub product: Product,
    pub baker: ShopRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Partial product update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub in_stock: Option<bool>,
}

impl ProductUpdate {
    /// Reject values that would break catalogue invariants.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message describing the problem.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err("Product name cannot be empty".to_string());
        }
        if self.category.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err("Product category cannot be empty".to_string());
        }
        if self.price.is_some_and(|p| p.is_sign_negative()) {
            return Err("Price cannot be negative".to_string());
        }
        Ok(())
    }
}

impl NewProduct {
    /// # Errors
    ///
    /// Returns a client-facing message describing the problem.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Missing required field: name".to_string());
        }
        if self.category.trim().is_empty() {
            return Err("Missing required field: category".to_string());
        }
        if self.price.is_sign_negative() {
            return Err("Price cannot be negative".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_product_accepts_numeric_and_string_prices() {
        let p: NewProduct =
            serde_json::from_str(r#"{"name":"Sourdough","category":"Bread","price":180}"#)
                .unwrap();
        assert_eq!(p.price, Decimal::new(180, 0));

        let p: NewProduct =
            serde_json::from_str(r#"{"name":"Baguette","category":"Bread","price":"95.50"}"#)
                .unwrap();
        assert_eq!(p.price, Decimal::new(9550, 2));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_new_product_validation() {
        let p = NewProduct {
            name: "  ".into(),
            category: "Cakes".into(),
            price: Decimal::ONE,
            description: None,
            image_url: None,
        };
        assert_eq!(p.validate().unwrap_err(), "Missing required field: name");
    }

    #[test]
    fn test_update_validation() {
        let update = ProductUpdate {
            price: Some(Decimal::new(-5, 0)),
            ..ProductUpdate::default()
        };
        assert!(update.validate().is_err());
        assert!(ProductUpdate::default().validate().is_ok());
    }
}
