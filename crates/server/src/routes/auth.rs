//! Account registration and login.
//!
//! Password login and one-time-code login both end in a signed token that
//! the client sends back as `Authorization: Bearer <token>`.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use local_crust_core::{BakerId, Email, UserId, UserType};

use crate::db::{BakerRepository, UserRepository};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::{ApiJson, required};
use crate::models::{Baker, User};
use crate::services::auth::{AuthError, AuthService, Claims};
use crate::state::AppState;

// ============================================================================
// Shared response bodies
// ============================================================================

/// Shop summary attached to a baker's account.
#[derive(Debug, Serialize)]
pub struct BakerBadge {
    pub id: BakerId,
    pub shop_name: String,
    pub verified: bool,
}

impl From<&Baker> for BakerBadge {
    fn from(baker: &Baker) -> Self {
        Self {
            id: baker.id,
            shop_name: baker.shop_name.clone(),
            verified: baker.verified,
        }
    }
}

/// Account as returned alongside a token.
#[derive(Debug, Serialize)]
pub struct AccountBody {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub user_type: UserType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baker_profile: Option<BakerBadge>,
}

impl AccountBody {
    #[must_use]
    pub fn new(user: User, baker: Option<&Baker>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            user_type: user.user_type,
            baker_profile: baker.map(BakerBadge::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub message: &'static str,
    pub token: String,
    pub user: AccountBody,
}

/// Sign a fresh session token for a marketplace account.
pub(crate) fn session_token(state: &AppState, user: &User) -> String {
    state
        .tokens()
        .sign(&Claims::for_user(user.id, user.user_type, Utc::now()))
}

/// Build the login response, attaching the shop for baker accounts.
async fn session_response(
    state: &AppState,
    user: User,
    message: &'static str,
) -> Result<SessionResponse> {
    let baker = match user.user_type {
        UserType::Baker => BakerRepository::new(state.pool())
            .get_by_user_id(user.id)
            .await?,
        UserType::Customer => None,
    };

    Ok(SessionResponse {
        message,
        token: session_token(state, &user),
        user: AccountBody::new(user, baker.as_ref()),
    })
}

/// Subscribe a new account to order notifications without holding up the response.
pub(crate) fn subscribe_in_background(state: &AppState, email: &Email) {
    let notifier = state.notifier().clone();
    let email = email.as_str().to_string();
    tokio::spawn(async move {
        if !notifier.subscribe_email(&email).await {
            tracing::debug!("Email not subscribed to order notifications");
        }
    });
}

// ============================================================================
// Password login
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub user_type: Option<UserType>,
}

/// Register a customer or baker account.
///
/// POST /api/auth/register
///
/// # Errors
///
/// Returns 400 for a missing field, a weak password or a duplicate email.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    let name = required(req.name.as_deref(), "name")?;
    let email = required(req.email.as_deref(), "email")?;
    let password = req
        .password
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Missing required field: password".into()))?;
    let user_type = req
        .user_type
        .ok_or_else(|| AppError::BadRequest("Missing required field: user_type".into()))?;

    let user = AuthService::new(state.pool())
        .register(email, password, name, user_type)
        .await?;

    tracing::info!(user_id = %user.id, user_type = %user.user_type, "Account registered");
    subscribe_in_background(&state, &user.email);

    let token = session_token(&state, &user);
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            message: "User registered successfully",
            token,
            user: AccountBody::new(user, None),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login with email and password.
///
/// POST /api/auth/login
///
/// # Errors
///
/// Returns 400 when either field is missing and 401 for wrong credentials.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<SessionResponse>> {
    let (Some(email), Some(password)) = (req.email.as_deref(), req.password.as_deref()) else {
        return Err(AppError::BadRequest(
            "Email and password are required".into(),
        ));
    };

    let user = AuthService::new(state.pool()).login(email, password).await?;
    add_breadcrumb("auth", "Password login", None);

    Ok(Json(session_response(&state, user, "Login successful").await?))
}

// ============================================================================
// One-time code login
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendOtpResponse {
    pub message: &'static str,
    pub email: Email,
    /// Present only when no mailer is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

/// How an issued code reaches its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OtpDelivery {
    Emailed,
    /// Development setups without SMTP get the code in the response.
    NoMailer,
}

fn otp_response(email: Email, code: String, delivery: OtpDelivery) -> SendOtpResponse {
    match delivery {
        OtpDelivery::Emailed => SendOtpResponse {
            message: "OTP sent successfully",
            email,
            otp: None,
        },
        OtpDelivery::NoMailer => SendOtpResponse {
            message: "OTP generated (email not configured)",
            email,
            otp: Some(code),
        },
    }
}

/// Issue a login code and email it.
///
/// POST /api/auth/send-otp
///
/// # Errors
///
/// Returns 404 if no account uses the email, and 500 if the configured
/// mailer fails. A code that could not be emailed is revoked.
pub async fn send_otp(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SendOtpRequest>,
) -> Result<Json<SendOtpResponse>> {
    let email = req
        .email
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Email is required".into()))?;

    let user = AuthService::new(state.pool()).user_for_otp(email).await?;
    let code = state.otp().issue(&user.email).await;
    tracing::debug!(user_id = %user.id, "OTP issued");

    let delivery = match state.email() {
        Some(mailer) => {
            if let Err(e) = mailer.send_otp(user.email.as_str(), &code).await {
                state.otp().revoke(&user.email).await;
                tracing::warn!(user_id = %user.id, "OTP email failed, code revoked");
                return Err(e.into());
            }
            OtpDelivery::Emailed
        }
        None => OtpDelivery::NoMailer,
    };

    Ok(Json(otp_response(user.email, code, delivery)))
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: Option<String>,
    pub otp: Option<String>,
}

/// Exchange a login code for a session token. The code is consumed.
///
/// POST /api/auth/verify-otp
///
/// # Errors
///
/// Returns 400 if no code is outstanding or it expired, and 401 if it does not match.
pub async fn verify_otp(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<VerifyOtpRequest>,
) -> Result<Json<SessionResponse>> {
    let (Some(email), Some(code)) = (req.email.as_deref(), req.otp.as_deref()) else {
        return Err(AppError::BadRequest("Email and OTP are required".into()));
    };
    let email = Email::parse(email).map_err(AuthError::from)?;

    state.otp().verify(&email, code).await?;

    let user = UserRepository::new(state.pool())
        .get_by_email(&email)
        .await?
        .ok_or(AuthError::UserNotFound)?;
    add_breadcrumb("auth", "OTP login", None);

    Ok(Json(session_response(&state, user, "Login successful").await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::email::EmailError;

    fn email() -> Email {
        Email::parse("asha@example.com").unwrap()
    }

    #[test]
    fn test_emailed_code_is_not_echoed() {
        let resp = otp_response(email(), "482913".into(), OtpDelivery::Emailed);
        assert_eq!(resp.message, "OTP sent successfully");
        assert!(resp.otp.is_none());

        let body = serde_json::to_value(&resp).unwrap();
        assert!(body.get("otp").is_none());
        assert_eq!(body["email"], "asha@example.com");
    }

    #[test]
    fn test_code_echoed_without_mailer() {
        let resp = otp_response(email(), "482913".into(), OtpDelivery::NoMailer);
        assert_eq!(resp.message, "OTP generated (email not configured)");
        assert_eq!(resp.otp.as_deref(), Some("482913"));
    }

    #[test]
    fn test_mail_failure_is_opaque() {
        let err = AppError::from(EmailError::InvalidAddress("asha@example.com".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.client_message().contains("asha"));
    }
}
