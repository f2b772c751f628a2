//! Baker shop profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use local_crust_core::{BakerId, UserId};

/// A shop profile attached to a baker account.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Baker {
    pub id: BakerId,
    #[serde(skip_serializing)]
    pub user_id: UserId,
    pub shop_name: String,
    pub owner_name: String,
    pub phone: String,
    pub business_license: String,
    pub tax_id: String,
    pub shop_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub license_document: Option<String>,
    pub shop_description: String,
    /// Only verified bakers are visible in the marketplace.
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Shop details submitted at registration or by an admin.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBaker {
    pub shop_name: String,
    pub owner_name: String,
    pub phone: String,
    pub business_license: String,
    pub tax_id: String,
    pub shop_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default)]
    pub license_document: Option<String>,
    pub shop_description: String,
}

/// Marketplace listing entry for a verified shop.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BakerCard {
    pub id: BakerId,
    pub shop_name: String,
    pub shop_description: String,
    pub city: String,
    pub state: String,
    pub product_count: i64,
}
