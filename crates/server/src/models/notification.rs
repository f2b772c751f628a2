//! In-app notifications.

use chrono::{DateTime, Utc};
use serde::Serialize;

use local_crust_core::{NotificationId, NotificationKind, ReviewId, UserId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Notification {
    pub id: NotificationId,
    #[serde(skip_serializing)]
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(rename = "read")]
    pub is_read: bool,
    pub related_review_id: Option<ReviewId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub related_review_id: Option<ReviewId>,
}
