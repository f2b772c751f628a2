//! Admin login and profile.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use local_crust_core::{AdminId, AdminRole, Email};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::ApiJson;
use crate::middleware::RequireAdmin;
use crate::models::Admin;
use crate::services::auth::{AuthError, AuthService, Claims};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdminLogin {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminBody {
    pub id: AdminId,
    pub username: String,
    pub email: Email,
    pub full_name: String,
    pub role: AdminRole,
}

impl From<Admin> for AdminBody {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
            email: admin.email,
            full_name: admin.full_name,
            role: admin.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminSession {
    pub message: &'static str,
    pub token: String,
    pub admin: AdminBody,
}

/// POST /api/admin/login
///
/// # Errors
///
/// Returns 400 when a field is missing, 401 for wrong credentials and 403 for
/// a disabled account.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AdminLogin>,
) -> Result<Json<AdminSession>> {
    let (Some(username), Some(password)) = (req.username.as_deref(), req.password.as_deref())
    else {
        return Err(AppError::BadRequest("Username and password required".into()));
    };

    let admin = AuthService::new(state.pool())
        .login_admin(username, password)
        .await
        .map_err(|e| match e {
            AuthError::InvalidCredentials => AppError::Unauthorized("Invalid credentials".into()),
            other => other.into(),
        })?;

    tracing::info!(admin_id = %admin.id, "Admin signed in");
    add_breadcrumb("admin", "Admin login", Some(&[("username", admin.username.as_str())]));

    let token = state
        .tokens()
        .sign(&Claims::for_admin(admin.id, admin.role, Utc::now()));

    Ok(Json(AdminSession {
        message: "Login successful",
        token,
        admin: admin.into(),
    }))
}

#[derive(Debug, Serialize)]
pub struct AdminProfile {
    #[serde(flatten)]
    pub admin: AdminBody,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// GET /api/admin/profile
pub async fn profile(RequireAdmin(admin): RequireAdmin) -> Json<AdminProfile> {
    Json(AdminProfile {
        created_at: admin.created_at,
        last_login: admin.last_login,
        admin: admin.into(),
    })
}
