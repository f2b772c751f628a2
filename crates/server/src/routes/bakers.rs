//! Shop registration and public shop pages.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use local_crust_core::BakerId;

use crate::db::{BakerRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, required};
use crate::middleware::RequireBaker;
use crate::models::{Baker, BakerCard, NewBaker, NewProduct, Product};
use crate::routes::auth::{AccountBody, SessionResponse, session_token, subscribe_in_background};
use crate::services::auth::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BakerRegistration {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(flatten)]
    pub shop: NewBaker,
    pub products: Option<Vec<NewProduct>>,
}

/// Register a shop: the baker's account, the shop profile and its first
/// products are created together. New shops start unverified.
///
/// POST /api/baker/register
///
/// # Errors
///
/// Returns 400 for missing fields, an invalid product or a duplicate email.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BakerRegistration>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    let email = required(req.email.as_deref(), "email")?;
    let password = req
        .password
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Missing required field: password".into()))?;
    let products = req
        .products
        .ok_or_else(|| AppError::BadRequest("Missing required field: products".into()))?;
    required(Some(&req.shop.shop_name), "shop_name")?;
    required(Some(&req.shop.owner_name), "owner_name")?;
    for product in &products {
        product.validate().map_err(AppError::BadRequest)?;
    }

    let (user, baker) = AuthService::new(state.pool())
        .register_baker(email, password, &req.shop, &products, false)
        .await?;

    tracing::info!(
        baker_id = %baker.id,
        products = products.len(),
        "Shop registered, awaiting verification"
    );
    subscribe_in_background(&state, &user.email);

    let token = session_token(&state, &user);
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            message: "Baker registered successfully",
            token,
            user: AccountBody::new(user, Some(&baker)),
        }),
    ))
}

/// Public view of a shop with its full catalogue.
#[derive(Debug, Serialize)]
pub struct ShopPage {
    pub id: BakerId,
    pub shop_name: String,
    pub owner_name: String,
    pub phone: String,
    pub shop_description: String,
    pub city: String,
    pub state: String,
    pub verified: bool,
    pub products: Vec<Product>,
}

/// GET /api/baker/profile/{baker_id}
///
/// # Errors
///
/// Returns 404 if the shop does not exist.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<BakerId>,
) -> Result<Json<ShopPage>> {
    let baker = BakerRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Baker not found".into()))?;
    let products = ProductRepository::new(state.pool())
        .list_by_baker(baker.id)
        .await?;

    Ok(Json(ShopPage {
        id: baker.id,
        shop_name: baker.shop_name,
        owner_name: baker.owner_name,
        phone: baker.phone,
        shop_description: baker.shop_description,
        city: baker.city,
        state: baker.state,
        verified: baker.verified,
        products,
    }))
}

#[derive(Debug, Serialize)]
pub struct BakerList {
    pub bakers: Vec<BakerCard>,
}

/// Verified shops with their product counts.
///
/// GET /api/bakers
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn index(State(state): State<AppState>) -> Result<Json<BakerList>> {
    let bakers = BakerRepository::new(state.pool()).list_verified().await?;
    Ok(Json(BakerList { bakers }))
}

/// The signed-in baker's own shop profile.
///
/// GET /api/baker/profile
pub async fn own_profile(RequireBaker { baker, .. }: RequireBaker) -> Json<Baker> {
    Json(baker)
}
