//! Shop verification and management.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use local_crust_core::{BakerId, Email, UserId};

use super::Paged;
use crate::db::bakers::BakerListing;
use crate::db::{BakerRepository, Page, RepositoryError};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::{ApiJson, required};
use crate::middleware::RequireAdmin;
use crate::models::{Baker, NewBaker};
use crate::routes::Message;
use crate::services::auth::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BakerQuery {
    pub verified: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct Bakers {
    pub bakers: Vec<BakerListing>,
}

/// GET /api/admin/bakers?verified&page&per_page
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<BakerQuery>,
) -> Result<Json<Paged<Bakers>>> {
    let page = Page::new(query.page, query.per_page);
    let (bakers, total) = BakerRepository::new(state.pool())
        .list(query.verified, page)
        .await?;

    Ok(Json(Paged::new(Bakers { bakers }, total, page)))
}

#[derive(Debug, Serialize)]
pub struct BakerDetail {
    #[serde(flatten)]
    pub baker: Baker,
    pub user_id: UserId,
    pub total_products: i64,
    pub total_reviews: i64,
}

/// GET /api/admin/bakers/{id}
///
/// # Errors
///
/// Returns 404 if the shop does not exist.
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<BakerId>,
) -> Result<Json<BakerDetail>> {
    let repo = BakerRepository::new(state.pool());
    let baker = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Baker not found".into()))?;
    let (total_products, total_reviews) = repo.catalogue_counts(id).await?;

    Ok(Json(BakerDetail {
        user_id: baker.user_id,
        baker,
        total_products,
        total_reviews,
    }))
}

#[derive(Debug, Deserialize)]
pub struct Verification {
    #[serde(default = "default_verified")]
    pub verified: bool,
}

const fn default_verified() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct VerificationBody {
    pub id: BakerId,
    pub shop_name: String,
    pub verified: bool,
}

#[derive(Debug, Serialize)]
pub struct VerificationChanged {
    pub message: &'static str,
    pub baker: VerificationBody,
}

/// Verify or unverify a shop. Unverified shops disappear from the marketplace.
///
/// PUT /api/admin/bakers/{id}/verify
///
/// # Errors
///
/// Returns 404 if the shop does not exist.
pub async fn verify(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<BakerId>,
    ApiJson(req): ApiJson<Verification>,
) -> Result<Json<VerificationChanged>> {
    let baker = BakerRepository::new(state.pool())
        .set_verified(id, req.verified)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Baker not found".into()),
            other => other.into(),
        })?;

    tracing::info!(admin_id = %admin.id, baker_id = %id, verified = baker.verified, "Shop verification changed");
    let baker_id = id.to_string();
    add_breadcrumb(
        "admin",
        "Shop verification changed",
        Some(&[("baker_id", baker_id.as_str())]),
    );

    Ok(Json(VerificationChanged {
        message: if baker.verified {
            "Baker verified successfully"
        } else {
            "Baker unverified successfully"
        },
        baker: VerificationBody {
            id: baker.id,
            shop_name: baker.shop_name,
            verified: baker.verified,
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct NewShop {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(flatten)]
    pub shop: NewBaker,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Serialize)]
pub struct CreatedShop {
    pub id: BakerId,
    pub user_id: UserId,
    pub shop_name: String,
    pub owner_name: String,
    pub email: Email,
    pub verified: bool,
}

#[derive(Debug, Serialize)]
pub struct ShopCreated {
    pub message: &'static str,
    pub baker: CreatedShop,
}

/// Create a baker account and shop with an empty catalogue.
///
/// POST /api/admin/bakers
///
/// # Errors
///
/// Returns 400 for a missing field, a weak password or a duplicate email.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(req): ApiJson<NewShop>,
) -> Result<(StatusCode, Json<ShopCreated>)> {
    let email = required(req.email.as_deref(), "email")?;
    let password = req
        .password
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Missing required field: password".into()))?;
    required(Some(&req.shop.shop_name), "shop_name")?;
    required(Some(&req.shop.owner_name), "owner_name")?;

    let (user, baker) = AuthService::new(state.pool())
        .register_baker(email, password, &req.shop, &[], req.verified)
        .await?;
    tracing::info!(admin_id = %admin.id, baker_id = %baker.id, "Admin created shop");

    Ok((
        StatusCode::CREATED,
        Json(ShopCreated {
            message: "Baker created successfully",
            baker: CreatedShop {
                id: baker.id,
                user_id: user.id,
                shop_name: baker.shop_name,
                owner_name: baker.owner_name,
                email: user.email,
                verified: baker.verified,
            },
        }),
    ))
}

/// Delete a shop, its account and everything attached to them.
///
/// DELETE /api/admin/bakers/{id}
///
/// # Errors
///
/// Returns 404 if the shop does not exist.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<BakerId>,
) -> Result<Json<Message>> {
    BakerRepository::new(state.pool())
        .delete_with_account(id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Baker not found".into()),
            other => other.into(),
        })?;
    tracing::info!(admin_id = %admin.id, baker_id = %id, "Admin deleted shop");

    Ok(Json(Message::new(
        "Baker and associated account deleted successfully",
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_verification_defaults_to_verified() {
        let req: Verification = serde_json::from_value(json!({})).unwrap();
        assert!(req.verified);
        let req: Verification = serde_json::from_value(json!({"verified": false})).unwrap();
        assert!(!req.verified);
    }

    #[test]
    fn test_new_shop_defaults_to_unverified() {
        let req: NewShop = serde_json::from_value(json!({
            "email": "crumbs@example.com",
            "password": "password123",
            "shop_name": "Crumbs",
            "owner_name": "Ravi",
            "phone": "9000000000",
            "business_license": "BL-1",
            "tax_id": "TX-1",
            "shop_address": "1 Baker Street",
            "city": "Pune",
            "state": "Maharashtra",
            "zip_code": "411001",
            "shop_description": "Breads"
        }))
        .unwrap();
        assert!(!req.verified);
        assert_eq!(req.shop.city, "Pune");
    }
}
