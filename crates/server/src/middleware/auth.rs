//! Authentication extractors.
//!
//! Every protected route takes one of these extractors. They read the
//! `Authorization: Bearer <token>` header, verify the token and, for bakers
//! and admins, load the account the token belongs to.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use local_crust_core::{UserId, UserType};

use crate::db::{AdminRepository, BakerRepository};
use crate::error::{AppError, set_sentry_user};
use crate::models::{Admin, Baker};
use crate::services::auth::Claims;
use crate::state::AppState;

/// The signed-in marketplace account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub user_type: UserType,
}

/// Extractor that requires a customer or baker token.
///
/// # Example
///
/// ```rust,ignore
/// async fn my_orders(RequireUser(user): RequireUser) -> Result<Json<Vec<Order>>> {
///     // user.id is the caller
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Extractor that requires a baker token and loads the caller's shop.
pub struct RequireBaker {
    pub user_id: UserId,
    pub baker: Baker,
}

/// Extractor that requires an active admin account.
pub struct RequireAdmin(pub Admin);

/// Pull the bearer token out of the request headers.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn claims(parts: &Parts, state: &AppState) -> Result<Claims, AppError> {
    let token = bearer_token(parts)
        .ok_or_else(|| AppError::Unauthorized("Authorization required".to_string()))?;
    Ok(state.tokens().verify(token)?)
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = match claims(parts, state)? {
            Claims::Customer { user_id, .. } => CurrentUser {
                id: user_id,
                user_type: UserType::Customer,
            },
            Claims::Baker { user_id, .. } => CurrentUser {
                id: user_id,
                user_type: UserType::Baker,
            },
            Claims::Admin { .. } => {
                return Err(AppError::Unauthorized("Invalid or expired token".to_string()));
            }
        };

        set_sentry_user(&user.id, user.user_type.as_str());
        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for RequireBaker {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Claims::Baker { user_id, .. } = claims(parts, state)? else {
            return Err(AppError::Forbidden("Baker access required".to_string()));
        };

        let baker = BakerRepository::new(state.pool())
            .get_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Baker profile not found".to_string()))?;

        set_sentry_user(&user_id, "baker");
        Ok(Self { user_id, baker })
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("No token provided".to_string()))?;
        let Claims::Admin { admin_id, .. } = state.tokens().verify(token)? else {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        };

        let admin = AdminRepository::new(state.pool())
            .get_by_id(admin_id)
            .await?
            .filter(|a| a.is_active)
            .ok_or_else(|| AppError::Forbidden("Admin account inactive".to_string()))?;

        set_sentry_user(&admin.id, "admin");
        Ok(Self(admin))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/orders");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc.def.ghi"))), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&parts(Some("Basic dXNlcg=="))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts(None)), None);
    }
}
