//! Marketplace user accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use local_crust_core::{Email, UserId, UserType};

/// A customer or baker account.
///
/// The password hash never leaves the repository layer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub user_type: UserType,
    /// Last delivery address saved from the checkout form.
    #[serde(skip_serializing)]
    pub saved_address: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
