//! Marketplace catalogue and a baker's own product management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use local_crust_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireBaker;
use crate::models::{Baker, NewProduct, Product, ProductUpdate, ProductWithBaker};
use crate::routes::Message;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProductList<T> {
    pub products: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct ProductSaved {
    pub message: &'static str,
    pub product: Product,
}

/// In-stock products from verified shops.
///
/// GET /api/products
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn marketplace(
    State(state): State<AppState>,
) -> Result<Json<ProductList<ProductWithBaker>>> {
    let products = ProductRepository::new(state.pool())
        .list_marketplace()
        .await?;
    Ok(Json(ProductList { products }))
}

/// Add a product to the caller's shop.
///
/// POST /api/baker/products
///
/// # Errors
///
/// Returns 400 if name, category or price is missing or invalid.
pub async fn create(
    State(state): State<AppState>,
    RequireBaker { baker, .. }: RequireBaker,
    ApiJson(product): ApiJson<NewProduct>,
) -> Result<(StatusCode, Json<ProductSaved>)> {
    product.validate().map_err(AppError::BadRequest)?;

    let product = ProductRepository::new(state.pool())
        .create(baker.id, &product)
        .await?;
    tracing::info!(baker_id = %baker.id, product_id = %product.id, "Product added");

    Ok((
        StatusCode::CREATED,
        Json(ProductSaved {
            message: "Product added successfully",
            product,
        }),
    ))
}

/// Every product in the caller's shop, including out-of-stock ones.
///
/// GET /api/baker/products
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn own(
    State(state): State<AppState>,
    RequireBaker { baker, .. }: RequireBaker,
) -> Result<Json<ProductList<Product>>> {
    let products = ProductRepository::new(state.pool())
        .list_by_baker(baker.id)
        .await?;
    Ok(Json(ProductList { products }))
}

/// Load a product and check it belongs to `baker`.
async fn owned_product(state: &AppState, baker: &Baker, id: ProductId) -> Result<Product> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    if product.baker_id != baker.id {
        return Err(AppError::Forbidden("Unauthorized".into()));
    }
    Ok(product)
}

/// Partially update one of the caller's products.
///
/// PUT /api/baker/products/{product_id}
///
/// # Errors
///
/// Returns 404 for an unknown product and 403 if another shop owns it.
pub async fn update(
    State(state): State<AppState>,
    RequireBaker { baker, .. }: RequireBaker,
    Path(id): Path<ProductId>,
    ApiJson(update): ApiJson<ProductUpdate>,
) -> Result<Json<ProductSaved>> {
    update.validate().map_err(AppError::BadRequest)?;
    owned_product(&state, &baker, id).await?;

    let product = ProductRepository::new(state.pool())
        .update(id, &update)
        .await?;

    Ok(Json(ProductSaved {
        message: "Product updated successfully",
        product,
    }))
}

/// DELETE /api/baker/products/{product_id}
///
/// # Errors
///
/// Returns 404 for an unknown product and 403 if another shop owns it.
pub async fn delete(
    State(state): State<AppState>,
    RequireBaker { baker, .. }: RequireBaker,
    Path(id): Path<ProductId>,
) -> Result<Json<Message>> {
    owned_product(&state, &baker, id).await?;
    ProductRepository::new(state.pool()).delete(id).await?;
    tracing::info!(baker_id = %baker.id, product_id = %id, "Product deleted");

    Ok(Json(Message::new("Product deleted successfully")))
}
