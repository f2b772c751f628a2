//! Error types for the Razorpay client.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to Razorpay.
#[derive(Debug, Error)]
pub enum RazorpayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Razorpay rejected the request.
    #[error("API error ({code}): {description}")]
    Api { code: String, description: String },

    /// The key pair was rejected.
    #[error("unauthorized")]
    Unauthorized,

    /// The amount cannot be expressed in paise.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("parse error: {0}")]
    Parse(String),

    /// The checkout signature does not match the order and payment.
    #[error("payment signature mismatch")]
    SignatureMismatch,
}

/// Error envelope returned by the Razorpay API.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_deserialization() {
        let json = r#"{
            "error": {
                "code": "BAD_REQUEST_ERROR",
                "description": "The amount must be atleast INR 1.00",
                "source": "business",
                "step": "payment_initiation"
            }
        }"#;

        let response: ApiErrorResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(response.error.code, "BAD_REQUEST_ERROR");
        assert_eq!(
            response.error.description,
            "The amount must be atleast INR 1.00"
        );
    }

    #[test]
    fn test_error_display() {
        let err = RazorpayError::Api {
            code: "BAD_REQUEST_ERROR".to_string(),
            description: "Invalid receipt".to_string(),
        };
        assert_eq!(err.to_string(), "API error (BAD_REQUEST_ERROR): Invalid receipt");
    }
}
