//! Unified error handling with Sentry integration.
//!
//! Every route handler returns `Result<T, AppError>`. Errors render as
//! `{"error": "<message>"}` with a matching status code. Server-side failures
//! are captured to Sentry and their details are kept out of the response.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::{AuthError, TokenError};
use crate::services::email::EmailError;
use crate::services::gemini::GeminiError;
use crate::services::orders::OrderError;
use crate::services::razorpay::RazorpayError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Payment gateway error: {0}")]
    Payment(#[from] RazorpayError),

    #[error("AI service error: {0}")]
    Ai(#[from] GeminiError),

    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to touch this resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An optional integration is not configured.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    /// Status code for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound)
            | Self::NotFound(_)
            | Self::Order(OrderError::UnknownProduct(_)) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) | Self::BadRequest(_) | Self::Order(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Database(_) | Self::Email(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::UserAlreadyExists
                | AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_)
                | AuthError::OtpMissing
                | AuthError::OtpExpired => StatusCode::BAD_REQUEST,
                AuthError::OtpMismatch => StatusCode::UNAUTHORIZED,
                AuthError::AccountInactive => StatusCode::FORBIDDEN,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Token(_) | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Payment(RazorpayError::SignatureMismatch) => StatusCode::BAD_REQUEST,
            Self::Payment(_) | Self::Ai(_) => StatusCode::BAD_GATEWAY,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Client-facing message. Internal details are never included.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Database(_) | Self::Email(_) => "Internal server error".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid email or password".to_string(),
                AuthError::UserNotFound => "User not found".to_string(),
                AuthError::UserAlreadyExists => "Email already registered".to_string(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(e) => format!("Invalid email address: {e}"),
                AuthError::OtpMissing => "OTP not found or expired".to_string(),
                AuthError::OtpExpired => "OTP expired".to_string(),
                AuthError::OtpMismatch => "Invalid OTP".to_string(),
                AuthError::AccountInactive => "Admin account is inactive".to_string(),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Internal server error".to_string()
                }
            },
            Self::Token(_) => "Invalid or expired token".to_string(),
            Self::Payment(RazorpayError::SignatureMismatch) => {
                "Payment signature verification failed".to_string()
            }
            Self::Payment(_) => "Payment gateway error".to_string(),
            Self::Ai(_) => "AI service error".to_string(),
            Self::Order(err) => err.to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::Unavailable(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            error: self.client_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated caller.
pub fn set_sentry_user(user_id: &impl ToString, kind: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
        scope.set_tag("account_kind", kind);
    });
}

/// Add a breadcrumb for a marketplace action.
///
/// ```rust,ignore
/// add_breadcrumb("orders", "Order placed", Some(&[("order_number", "LC20240320...")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Order not found".to_string());
        assert_eq!(err.to_string(), "Not found: Order not found");
        assert_eq!(err.client_message(), "Order not found");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(status(AppError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(AppError::Unauthorized("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status(AppError::Forbidden("x".into())), StatusCode::FORBIDDEN);
        assert_eq!(status(AppError::BadRequest("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(AppError::Database(RepositoryError::DataCorruption("x".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(AppError::Unavailable("x".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_auth_error_mapping() {
        let err = AppError::from(AuthError::UserAlreadyExists);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "Email already registered");

        let err = AppError::from(AuthError::OtpMismatch);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.client_message(), "Invalid OTP");

        let err = AppError::from(AuthError::OtpExpired);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption("bad row 7".into()));
        assert_eq!(err.client_message(), "Internal server error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_order_error_mapping() {
        let err = AppError::from(OrderError::UnknownProduct(local_crust_core::ProductId::new(4)));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.client_message(), "Product 4 not found");
        assert_eq!(AppError::from(OrderError::Empty).status(), StatusCode::BAD_REQUEST);

        let err = AppError::from(OrderError::ShopNotVerified("Seeded Rye".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "Seeded Rye is not available for ordering");
    }

    #[test]
    fn test_signature_mismatch_is_client_error() {
        let err = AppError::from(RazorpayError::SignatureMismatch);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
