//! The signed-in customer's profile and saved delivery address.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use local_crust_core::{Email, UserId, UserType};

use crate::db::{RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::{CurrentUser, RequireUser};
use crate::models::User;
use crate::state::AppState;

/// Keys a saved address must carry, in the order they are checked.
const ADDRESS_FIELDS: [&str; 6] = ["fullName", "phone", "addressLine1", "city", "state", "pincode"];

fn check_address(address: &Map<String, Value>) -> Result<()> {
    match ADDRESS_FIELDS.iter().find(|f| !address.contains_key(**f)) {
        Some(field) => Err(AppError::BadRequest(format!(
            "Missing required field: {field}"
        ))),
        None => Ok(()),
    }
}

async fn load_user(state: &AppState, user: CurrentUser) -> Result<User> {
    UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

#[derive(Debug, Serialize)]
pub struct Profile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub user_type: UserType,
    pub saved_address: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// GET /api/customer/profile
///
/// # Errors
///
/// Returns 404 if the account no longer exists.
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Profile>> {
    let user = load_user(&state, user).await?;
    Ok(Json(Profile {
        id: user.id,
        name: user.name,
        email: user.email,
        user_type: user.user_type,
        saved_address: user.saved_address,
        created_at: user.created_at,
    }))
}

#[derive(Debug, Serialize)]
pub struct AddressSaved {
    pub message: &'static str,
    pub saved_address: Map<String, Value>,
}

/// Store the default delivery address. The whole object is kept as sent.
///
/// PUT|POST /api/customer/profile/address
///
/// # Errors
///
/// Returns 400 when a required address field is missing.
pub async fn save_address(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(address): ApiJson<Map<String, Value>>,
) -> Result<Json<AddressSaved>> {
    check_address(&address)?;

    UserRepository::new(state.pool())
        .save_address(user.id, &Value::Object(address.clone()))
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("User not found".into()),
            other => other.into(),
        })?;

    tracing::debug!(user_id = %user.id, "Saved delivery address");
    Ok(Json(AddressSaved {
        message: "Address saved successfully",
        saved_address: address,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileBody {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdated {
    pub message: &'static str,
    pub user: ProfileBody,
}

/// Update profile details. Only the display name can change.
///
/// PUT /api/customer/profile
///
/// # Errors
///
/// Returns 400 for a blank name and 404 if the account no longer exists.
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(req): ApiJson<ProfileUpdate>,
) -> Result<Json<ProfileUpdated>> {
    let user = match req.name.as_deref().map(str::trim) {
        Some("") => return Err(AppError::BadRequest("Name cannot be empty".into())),
        Some(name) => UserRepository::new(state.pool())
            .update_name(user.id, name)
            .await?,
        None => load_user(&state, user).await?,
    };

    Ok(Json(ProfileUpdated {
        message: "Profile updated successfully",
        user: ProfileBody {
            id: user.id,
            name: user.name,
            email: user.email,
        },
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn address(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_complete_address_passes() {
        let full = address(json!({
            "fullName": "Asha Rao",
            "phone": "9876543210",
            "addressLine1": "12 MG Road",
            "addressLine2": "",
            "city": "Bengaluru",
            "state": "Karnataka",
            "pincode": "560001"
        }));
        assert!(check_address(&full).is_ok());
    }

    #[test]
    fn test_first_missing_field_is_reported() {
        let partial = address(json!({"fullName": "Asha Rao", "phone": "9876543210"}));
        let err = check_address(&partial).unwrap_err();
        assert_eq!(err.client_message(), "Missing required field: addressLine1");
    }
}
