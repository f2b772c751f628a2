//! In-app notifications for the signed-in account.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use local_crust_core::NotificationId;

use crate::db::NotificationRepository;
use crate::db::notifications::NotificationWithReview;
use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, RequireUser};
use crate::routes::Message;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct NotificationList {
    pub notifications: Vec<NotificationWithReview>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct ReadBody {
    pub id: NotificationId,
    pub read: bool,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub message: &'static str,
    pub notification: ReadBody,
}

/// Check a notification exists and belongs to `user`.
async fn owned(repo: &NotificationRepository<'_>, user: CurrentUser, id: NotificationId) -> Result<()> {
    let notification = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".into()))?;

    if notification.user_id != user.id {
        return Err(AppError::Forbidden("Unauthorized".into()));
    }
    Ok(())
}

/// Newest first. Reply notifications carry the linked review.
///
/// GET /api/notifications
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<NotificationList>> {
    let notifications = NotificationRepository::new(state.pool())
        .list(user.id)
        .await?;
    Ok(Json(NotificationList { notifications }))
}

/// GET /api/notifications/unread-count
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn unread_count(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<UnreadCount>> {
    let count = NotificationRepository::new(state.pool())
        .unread_count(user.id)
        .await?;
    Ok(Json(UnreadCount { count }))
}

/// PUT /api/notifications/{id}/read
///
/// # Errors
///
/// Returns 404 for an unknown notification and 403 for someone else's.
pub async fn mark_read(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<NotificationId>,
) -> Result<Json<MarkedRead>> {
    let repo = NotificationRepository::new(state.pool());
    owned(&repo, user, id).await?;
    repo.mark_read(id).await?;

    Ok(Json(MarkedRead {
        message: "Notification marked as read",
        notification: ReadBody { id, read: true },
    }))
}

/// PUT /api/notifications/mark-all-read
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn mark_all_read(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Message>> {
    let changed = NotificationRepository::new(state.pool())
        .mark_all_read(user.id)
        .await?;
    tracing::debug!(user_id = %user.id, changed, "Marked notifications read");

    Ok(Json(Message::new("All notifications marked as read")))
}

/// DELETE /api/notifications/{id}
///
/// # Errors
///
/// Returns 404 for an unknown notification and 403 for someone else's.
pub async fn delete(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<NotificationId>,
) -> Result<Json<Message>> {
    let repo = NotificationRepository::new(state.pool());
    owned(&repo, user, id).await?;
    repo.delete(id).await?;

    Ok(Json(Message::new("Notification deleted")))
}

/// DELETE /api/notifications
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn delete_all(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Message>> {
    NotificationRepository::new(state.pool())
        .delete_all(user.id)
        .await?;
    Ok(Json(Message::new("All notifications deleted")))
}
