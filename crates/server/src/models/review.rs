//! Product reviews.

use chrono::{DateTime, Utc};
use serde::Serialize;

use local_crust_core::{BakerId, ProductId, ReviewId, UserId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub baker_id: BakerId,
    pub rating: i16,
    pub comment: String,
    pub baker_reply: Option<String>,
    pub reply_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
