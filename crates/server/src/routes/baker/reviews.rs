//! Reviews of the shop's products and the baker's replies.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use local_crust_core::humanize::time_ago;
use local_crust_core::{NotificationKind, ReviewId};

use crate::db::reviews::{ReviewStats, ShopReview, average_rating};
use crate::db::{NotificationRepository, ProductRepository, RepositoryError, ReviewRepository};
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireBaker;
use crate::models::{NewNotification, Product, Review};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DatedReview {
    #[serde(flatten)]
    pub review: ShopReview,
    pub time_ago: String,
}

#[derive(Debug, Serialize)]
pub struct ShopReviews {
    pub reviews: Vec<DatedReview>,
    pub average_rating: f64,
    pub total_reviews: usize,
}

/// GET /api/baker/reviews
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn index(
    State(state): State<AppState>,
    RequireBaker { baker, .. }: RequireBaker,
) -> Result<Json<ShopReviews>> {
    let reviews = ReviewRepository::new(state.pool())
        .list_for_baker(baker.id)
        .await?;

    let sum: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
    let total = reviews.len();
    let now = Utc::now();

    Ok(Json(ShopReviews {
        average_rating: average_rating(sum, i64::try_from(total).unwrap_or(i64::MAX)),
        total_reviews: total,
        reviews: reviews
            .into_iter()
            .map(|review| DatedReview {
                time_ago: time_ago(now, review.created_at),
                review,
            })
            .collect(),
    }))
}

/// Rating distribution and unreplied count.
///
/// GET /api/baker/reviews/stats
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn stats(
    State(state): State<AppState>,
    RequireBaker { baker, .. }: RequireBaker,
) -> Result<Json<ReviewStats>> {
    let stats = ReviewRepository::new(state.pool())
        .stats_for_baker(baker.id)
        .await?;
    Ok(Json(stats))
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    #[serde(default)]
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct ReplyBody {
    pub id: ReviewId,
    pub baker_reply: Option<String>,
    pub reply_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ReplyPosted {
    pub message: &'static str,
    pub review: ReplyBody,
}

fn reply_notification(review: &Review, shop_name: &str, product_name: &str) -> NewNotification {
    NewNotification {
        user_id: review.user_id,
        title: format!("{shop_name} replied to your review"),
        message: format!(
            "Reply to your review of {product_name}:\n\n\"{}\"",
            review.baker_reply.as_deref().unwrap_or_default()
        ),
        kind: NotificationKind::Info,
        related_review_id: Some(review.id),
    }
}

/// Name used for the reviewed product in the reply notice.
fn product_label(
    review: &Review,
    lookup: std::result::Result<Option<Product>, RepositoryError>,
) -> String {
    match lookup {
        Ok(Some(product)) => product.name,
        Ok(None) => "their product".to_owned(),
        Err(e) => {
            tracing::warn!(review_id = %review.id, error = %e, "Failed to load reviewed product");
            "their product".to_owned()
        }
    }
}

/// Reply to a review of one of the shop's products. A second reply replaces
/// the first. The reviewer gets an in-app notification linked to the review.
///
/// POST /api/baker/reviews/{review_id}/reply
///
/// # Errors
///
/// Returns 400 for an empty reply, 404 for an unknown review and 403 for a
/// review of another shop's product.
pub async fn reply(
    State(state): State<AppState>,
    RequireBaker { baker, .. }: RequireBaker,
    Path(id): Path<ReviewId>,
    ApiJson(req): ApiJson<ReplyRequest>,
) -> Result<Json<ReplyPosted>> {
    let text = req.reply.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("Reply text is required".into()));
    }

    let repo = ReviewRepository::new(state.pool());
    let review = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".into()))?;
    if review.baker_id != baker.id {
        return Err(AppError::Forbidden("Unauthorized".into()));
    }

    let review = repo.set_reply(id, text).await?;
    tracing::info!(review_id = %review.id, baker_id = %baker.id, "Review reply posted");

    let lookup = ProductRepository::new(state.pool())
        .get_by_id(review.product_id)
        .await;
    let product_name = product_label(&review, lookup);
    let notification = reply_notification(&review, &baker.shop_name, &product_name);
    if let Err(e) = NotificationRepository::new(state.pool())
        .create(&notification)
        .await
    {
        tracing::warn!(review_id = %review.id, error = %e, "Failed to store reply notification");
    }

    Ok(Json(ReplyPosted {
        message: "Reply posted successfully",
        review: ReplyBody {
            id: review.id,
            baker_reply: review.baker_reply,
            reply_at: review.reply_at,
        },
    }))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use local_crust_core::{BakerId, ProductId, UserId};

    use super::*;

    fn review() -> Review {
        Review {
            id: ReviewId::new(12),
            user_id: UserId::new(3),
            product_id: ProductId::new(5),
            baker_id: BakerId::new(2),
            rating: 4,
            comment: "Lovely crumb".into(),
            baker_reply: Some("Thank you!".into()),
            reply_at: Some(Utc::now()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_reply_notification_links_review() {
        let n = reply_notification(&review(), "Crumb & Co", "Sourdough");
        assert_eq!(n.user_id, UserId::new(3));
        assert_eq!(n.title, "Crumb & Co replied to your review");
        assert_eq!(n.message, "Reply to your review of Sourdough:\n\n\"Thank you!\"");
        assert_eq!(n.kind, NotificationKind::Info);
        assert_eq!(n.related_review_id, Some(ReviewId::new(12)));
    }

    #[test]
    fn test_product_label_fallbacks() {
        let product = Product {
            id: ProductId::new(5),
            baker_id: BakerId::new(2),
            name: "Sourdough".into(),
            category: "Bread".into(),
            price: rust_decimal::Decimal::new(200, 0),
            description: None,
            image_url: None,
            in_stock: true,
            created_at: Utc::now(),
        };

        assert_eq!(product_label(&review(), Ok(Some(product))), "Sourdough");
        assert_eq!(product_label(&review(), Ok(None)), "their product");
        assert_eq!(
            product_label(&review(), Err(RepositoryError::DataCorruption("bad row".into()))),
            "their product"
        );
    }
}
