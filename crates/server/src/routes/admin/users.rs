//! Account management.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use local_crust_core::{BakerId, Email, UserId, UserType};

use super::Paged;
use crate::db::{BakerRepository, Page, UserRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, required};
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::routes::Message;
use crate::services::auth::AuthService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UserRow {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub user_type: UserType,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserRow {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            user_type: user.user_type,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub user_type: Option<UserType>,
}

#[derive(Debug, Serialize)]
pub struct Users {
    pub users: Vec<UserRow>,
}

/// Accounts of one type, customers by default.
///
/// GET /api/admin/users?page&per_page&user_type
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<UserQuery>,
) -> Result<Json<Paged<Users>>> {
    let page = Page::new(query.page, query.per_page);
    let (users, total) = UserRepository::new(state.pool())
        .list_by_type(query.user_type.unwrap_or(UserType::Customer), page)
        .await?;

    Ok(Json(Paged::new(
        Users {
            users: users.into_iter().map(Into::into).collect(),
        },
        total,
        page,
    )))
}

#[derive(Debug, Serialize)]
pub struct ShopSummary {
    pub id: BakerId,
    pub shop_name: String,
    pub owner_name: String,
    pub phone: String,
    pub city: String,
    pub state: String,
    pub verified: bool,
    pub total_products: i64,
}

#[derive(Debug, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: UserRow,
    pub total_orders: i64,
    pub total_reviews: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baker_profile: Option<ShopSummary>,
}

/// An account with its activity and, for bakers, its shop.
///
/// GET /api/admin/users/{id}
///
/// # Errors
///
/// Returns 404 if the account does not exist.
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<UserDetail>> {
    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    let activity = users.activity(id).await?;

    let baker_profile = match user.user_type {
        UserType::Baker => {
            let bakers = BakerRepository::new(state.pool());
            match bakers.get_by_user_id(id).await? {
                Some(baker) => {
                    let (total_products, _) = bakers.catalogue_counts(baker.id).await?;
                    Some(ShopSummary {
                        id: baker.id,
                        shop_name: baker.shop_name,
                        owner_name: baker.owner_name,
                        phone: baker.phone,
                        city: baker.city,
                        state: baker.state,
                        verified: baker.verified,
                        total_products,
                    })
                }
                None => None,
            }
        }
        UserType::Customer => None,
    };

    Ok(Json(UserDetail {
        user: user.into(),
        total_orders: activity.total_orders,
        total_reviews: activity.total_reviews,
        baker_profile,
    }))
}

#[derive(Debug, Deserialize)]
pub struct NewCustomer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub user_type: UserType,
}

#[derive(Debug, Serialize)]
pub struct UserCreated {
    pub message: &'static str,
    pub user: CreatedUser,
}

/// Create a customer account.
///
/// POST /api/admin/users
///
/// # Errors
///
/// Returns 400 for a missing field, a weak password or a duplicate email.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(req): ApiJson<NewCustomer>,
) -> Result<(StatusCode, Json<UserCreated>)> {
    let name = required(req.name.as_deref(), "name")?;
    let email = required(req.email.as_deref(), "email")?;
    let password = req
        .password
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Missing required field: password".into()))?;

    let user = AuthService::new(state.pool())
        .register(email, password, name, UserType::Customer)
        .await?;
    tracing::info!(admin_id = %admin.id, user_id = %user.id, "Admin created customer account");

    Ok((
        StatusCode::CREATED,
        Json(UserCreated {
            message: "User created successfully",
            user: CreatedUser {
                id: user.id,
                name: user.name,
                email: user.email,
                user_type: user.user_type,
            },
        }),
    ))
}

/// Delete a customer account with its orders, reviews and notifications.
///
/// DELETE /api/admin/users/{id}
///
/// # Errors
///
/// Returns 404 for an unknown account and 400 for a baker account, which
/// must go through the shop deletion route.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<Message>> {
    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if user.user_type == UserType::Baker {
        return Err(AppError::BadRequest(
            "Use baker deletion endpoint for baker accounts".into(),
        ));
    }

    users.delete(id).await?;
    tracing::info!(admin_id = %admin.id, user_id = %id, "Admin deleted account");

    Ok(Json(Message::new("User deleted successfully")))
}
