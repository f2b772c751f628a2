//! Saved products.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use local_crust_core::{ProductId, WishlistItemId};

use crate::db::wishlist::{WishlistAdd, WishlistEntry};
use crate::db::{ProductRepository, WishlistRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::routes::Message;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Wishlist {
    pub wishlist: Vec<WishlistEntry>,
}

#[derive(Debug, Serialize)]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub product_id: ProductId,
}

#[derive(Debug, Serialize)]
pub struct WishlistAdded {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wishlist_item: Option<WishlistItem>,
}

/// GET /api/wishlist
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Wishlist>> {
    let wishlist = WishlistRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(Wishlist { wishlist }))
}

/// Save a product. Saving it again is reported, not rejected.
///
/// POST /api/wishlist/{product_id}
///
/// # Errors
///
/// Returns 404 if the product does not exist.
pub async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(product_id): Path<ProductId>,
) -> Result<(StatusCode, Json<WishlistAdded>)> {
    ProductRepository::new(state.pool())
        .get_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    let added = WishlistRepository::new(state.pool())
        .add(user.id, product_id)
        .await?;

    Ok(match added {
        WishlistAdd::Added(id) => (
            StatusCode::CREATED,
            Json(WishlistAdded {
                message: "Product added to wishlist",
                wishlist_item: Some(WishlistItem { id, product_id }),
            }),
        ),
        WishlistAdd::AlreadyPresent => (
            StatusCode::OK,
            Json(WishlistAdded {
                message: "Product already in wishlist",
                wishlist_item: None,
            }),
        ),
    })
}

/// DELETE /api/wishlist/{product_id}
///
/// # Errors
///
/// Returns 404 if the product was not saved.
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Message>> {
    let removed = WishlistRepository::new(state.pool())
        .remove(user.id, product_id)
        .await?;

    if !removed {
        return Err(AppError::NotFound("Product not in wishlist".into()));
    }
    Ok(Json(Message::new("Product removed from wishlist")))
}
