//! Back-office admin accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use local_crust_core::{AdminId, AdminRole, Email};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Admin {
    pub id: AdminId,
    pub username: String,
    pub email: Email,
    pub full_name: String,
    pub role: AdminRole,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
