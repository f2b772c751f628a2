//! Customer reviews of delivered products.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use local_crust_core::{OrderId, OrderStatus, ProductId, Rating, ReviewId};

use crate::db::reviews::ProductReview;
use crate::db::{OrderRepository, ProductRepository, ReviewRepository};
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub product_id: Option<ProductId>,
    pub rating: Option<i64>,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewBody {
    pub id: ReviewId,
    pub rating: i16,
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewSaved {
    pub message: &'static str,
    pub review: ReviewBody,
}

/// Review a product from one of the caller's delivered orders. Reviewing the
/// same product again replaces the earlier rating and comment.
///
/// POST /api/orders/{order_id}/review
///
/// # Errors
///
/// Returns 404 for an unknown order or product, 403 for someone else's order
/// and 400 for an undelivered order, a bad rating or a product the order
/// does not contain.
pub async fn submit(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(order_id): Path<OrderId>,
    ApiJson(req): ApiJson<ReviewRequest>,
) -> Result<(StatusCode, Json<ReviewSaved>)> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_by_id(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;
    if order.user_id != user.id {
        return Err(AppError::Forbidden("Unauthorized".into()));
    }

    if order.status != OrderStatus::Delivered {
        return Err(AppError::BadRequest("Can only review delivered orders".into()));
    }

    let (Some(product_id), Some(rating)) = (req.product_id, req.rating) else {
        return Err(AppError::BadRequest(
            "Product ID and rating are required".into(),
        ));
    };
    let rating = Rating::new(rating).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let product = ProductRepository::new(state.pool())
        .get_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    let in_order = orders
        .items(order.id)
        .await?
        .iter()
        .any(|item| item.product_id == Some(product_id));
    if !in_order {
        return Err(AppError::BadRequest("Product not in this order".into()));
    }

    let saved = ReviewRepository::new(state.pool())
        .upsert(user.id, product.id, product.baker_id, rating, req.comment.trim())
        .await?;

    tracing::info!(
        review_id = %saved.review.id,
        product_id = %product.id,
        inserted = saved.inserted,
        "Review saved"
    );

    let (status, message) = if saved.inserted {
        (StatusCode::CREATED, "Review added successfully")
    } else {
        (StatusCode::OK, "Review updated successfully")
    };

    Ok((
        status,
        Json(ReviewSaved {
            message,
            review: ReviewBody {
                id: saved.review.id,
                rating: saved.review.rating,
                comment: saved.review.comment,
            },
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct ProductReviews {
    pub reviews: Vec<ProductReview>,
}

/// GET /api/products/{product_id}/reviews
///
/// # Errors
///
/// Returns 404 if the product does not exist.
pub async fn for_product(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ProductReviews>> {
    ProductRepository::new(state.pool())
        .get_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(product_id)
        .await?;
    Ok(Json(ProductReviews { reviews }))
}
