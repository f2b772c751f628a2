//! In-app notification repository.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use local_crust_core::{NotificationId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::{NewNotification, Notification};

const NOTIFICATION_COLUMNS: &str =
    "n.id, n.user_id, n.title, n.message, n.kind, n.is_read, n.related_review_id, n.created_at";

/// The review a notification points at, for reply notifications.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewSummary {
    pub id: ReviewId,
    pub product_name: String,
    pub baker_reply: Option<String>,
    pub reply_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    #[sqlx(flatten)]
    notification: Notification,
    review_product_name: Option<String>,
    review_baker_reply: Option<String>,
    review_reply_at: Option<DateTime<Utc>>,
}

/// A notification with its linked review, if it still exists.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationWithReview {
    #[serde(flatten)]
    pub notification: Notification,
    pub review: Option<ReviewSummary>,
}

impl From<NotificationRow> for NotificationWithReview {
    fn from(row: NotificationRow) -> Self {
        let review = row
            .notification
            .related_review_id
            .zip(row.review_product_name)
            .map(|(id, product_name)| ReviewSummary {
                id,
                product_name,
                baker_reply: row.review_baker_reply,
                reply_at: row.review_reply_at,
            });

        Self {
            notification: row.notification,
            review,
        }
    }
}

/// Repository for notification operations.
pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewNotification) -> Result<Notification, RepositoryError> {
        let notification = sqlx::query_as::<_, Notification>(
            r"
            INSERT INTO notifications (user_id, title, message, kind, related_review_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, message, kind, is_read, related_review_id, created_at
            ",
        )
        .bind(new.user_id)
        .bind(&new.title)
        .bind(&new.message)
        .bind(new.kind)
        .bind(new.related_review_id)
        .fetch_one(self.pool)
        .await?;

        Ok(notification)
    }

    /// A user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        user_id: UserId,
    ) -> Result<Vec<NotificationWithReview>, RepositoryError> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            r"
            SELECT {NOTIFICATION_COLUMNS},
                   p.name AS review_product_name,
                   r.baker_reply AS review_baker_reply,
                   r.reply_at AS review_reply_at
            FROM notifications n
            LEFT JOIN reviews r ON r.id = n.related_review_id
            LEFT JOIN products p ON p.id = r.product_id
            WHERE n.user_id = $1
            ORDER BY n.created_at DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        id: NotificationId,
    ) -> Result<Option<Notification>, RepositoryError> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications n WHERE n.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(notification)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn unread_count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_read(&self, id: NotificationId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Returns the number of notifications changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_all_read(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read")
                .bind(user_id)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: NotificationId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_all(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
