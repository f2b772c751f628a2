//! Request body extraction.
//!
//! [`ApiJson`] wraps `axum::Json` so malformed bodies are answered with the
//! same `{"error": ...}` shape as every other failure.

use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;

use crate::error::AppError;

/// JSON body extractor whose rejection is an [`AppError`].
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected request body");
        Self::BadRequest(rejection.body_text())
    }
}

/// A required string field, trimmed.
///
/// # Errors
///
/// Returns `AppError::BadRequest` naming `field` when the value is absent or blank.
pub fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Missing required field: {field}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header::CONTENT_TYPE},
        routing::post,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    use super::*;

    #[derive(Deserialize)]
    struct Payload {
        name: String,
    }

    async fn echo(ApiJson(payload): ApiJson<Payload>) -> String {
        payload.name
    }

    async fn post_json(body: &'static str) -> (StatusCode, String) {
        let app = Router::new().route("/", post(echo));
        let response = app
            .oneshot(
                Request::post("/")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_valid_body() {
        let (status, body) = post_json(r#"{"name":"Rye"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Rye");
    }

    #[tokio::test]
    async fn test_invalid_body_is_json_error() {
        let (status, body) = post_json(r#"{"title":"Rye"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("name"));
    }

    #[test]
    fn test_required() {
        assert_eq!(required(Some("  Asha "), "name").unwrap(), "Asha");
        let err = required(Some("   "), "phone").unwrap_err();
        assert_eq!(err.client_message(), "Missing required field: phone");
        assert!(required(None, "city").is_err());
    }
}
