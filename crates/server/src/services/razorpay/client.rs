//! Razorpay REST client.

use std::sync::Arc;
use std::time::Duration;

use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::instrument;

use local_crust_core::{CurrencyCode, Price};

use crate::config::RazorpayConfig;

use super::error::{ApiErrorResponse, RazorpayError};

const RAZORPAY_API_URL: &str = "https://api.razorpay.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    payment_capture: u8,
}

/// Order created on the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Amount in paise.
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Payment as reported by the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Payment {
    pub id: String,
    /// Amount in paise.
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
}

/// Razorpay API client.
#[derive(Clone)]
pub struct RazorpayClient {
    inner: Arc<RazorpayClientInner>,
}

struct RazorpayClientInner {
    client: reqwest::Client,
    key_id: String,
    key_secret: SecretString,
}

impl RazorpayClient {
    /// Create a new client from the configured key pair.
    ///
    /// # Errors
    ///
    /// Returns `RazorpayError::Http` if the HTTP client cannot be built.
    pub fn new(config: &RazorpayConfig) -> Result<Self, RazorpayError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(RazorpayClientInner {
                client,
                key_id: config.key_id.clone(),
                key_secret: config.key_secret.clone(),
            }),
        })
    }

    /// Public key id, handed to the checkout widget.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.inner.key_id
    }

    /// Create a gateway order for `amount` rupees with auto-capture.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is invalid or the request fails.
    #[instrument(skip(self), fields(receipt = %receipt))]
    pub async fn create_order(
        &self,
        amount: Decimal,
        receipt: &str,
    ) -> Result<GatewayOrder, RazorpayError> {
        let request = CreateOrderRequest {
            amount: to_paise(amount)?,
            currency: CurrencyCode::INR.code(),
            receipt,
            payment_capture: 1,
        };

        let response = self
            .inner
            .client
            .post(format!("{RAZORPAY_API_URL}/orders"))
            .basic_auth(&self.inner.key_id, Some(self.inner.key_secret.expose_secret()))
            .json(&request)
            .send()
            .await?;

        let order: GatewayOrder = handle_response(response).await?;
        tracing::info!(razorpay_order_id = %order.id, amount = order.amount, "Gateway order created");
        Ok(order)
    }

    /// Fetch a payment by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payment does not exist.
    #[instrument(skip(self))]
    pub async fn fetch_payment(&self, payment_id: &str) -> Result<Payment, RazorpayError> {
        let response = self
            .inner
            .client
            .get(format!("{RAZORPAY_API_URL}/payments/{payment_id}"))
            .basic_auth(&self.inner.key_id, Some(self.inner.key_secret.expose_secret()))
            .send()
            .await?;

        handle_response(response).await
    }

    /// Check the checkout signature for an order and payment.
    ///
    /// # Errors
    ///
    /// Returns `RazorpayError::SignatureMismatch` if the signature is not
    /// the hex HMAC-SHA256 of `order_id|payment_id` under the key secret.
    pub fn verify_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<(), RazorpayError> {
        verify_signature(
            self.inner.key_secret.expose_secret(),
            order_id,
            payment_id,
            signature,
        )
    }
}

impl std::fmt::Debug for RazorpayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayClient")
            .field("key_id", &self.inner.key_id)
            .finish_non_exhaustive()
    }
}

/// Convert a rupee amount to whole paise.
///
/// # Errors
///
/// Returns `RazorpayError::InvalidAmount` for non-positive or oversized amounts.
pub fn to_paise(amount: Decimal) -> Result<i64, RazorpayError> {
    if amount <= Decimal::ZERO {
        return Err(RazorpayError::InvalidAmount(amount.to_string()));
    }
    Price::inr(amount)
        .minor_units()
        .ok_or_else(|| RazorpayError::InvalidAmount(amount.to_string()))
}

fn verify_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> Result<(), RazorpayError> {
    let expected = hex::decode(signature.trim()).map_err(|_| RazorpayError::SignatureMismatch)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| RazorpayError::SignatureMismatch)?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());

    mac.verify_slice(&expected)
        .map_err(|_| RazorpayError::SignatureMismatch)
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, RazorpayError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return serde_json::from_str(&body)
            .map_err(|e| RazorpayError::Parse(format!("Failed to parse response: {e}")));
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(RazorpayError::Unauthorized);
    }

    match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(api_error) => Err(RazorpayError::Api {
            code: api_error.error.code,
            description: api_error.error.description,
        }),
        Err(_) => Err(RazorpayError::Api {
            code: status.as_str().to_string(),
            description: body,
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "rzp_test_secret_Qm7rT2kP9wX4";

    fn sign(order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_accepted() {
        let signature = sign("order_N5x1", "pay_N5x2");
        assert!(verify_signature(SECRET, "order_N5x1", "pay_N5x2", &signature).is_ok());
    }

    #[test]
    fn test_signature_for_other_payment_rejected() {
        let signature = sign("order_N5x1", "pay_N5x2");
        assert!(matches!(
            verify_signature(SECRET, "order_N5x1", "pay_OTHER", &signature),
            Err(RazorpayError::SignatureMismatch)
        ));
        assert!(matches!(
            verify_signature("another_secret", "order_N5x1", "pay_N5x2", &signature),
            Err(RazorpayError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_non_hex_signature_rejected() {
        assert!(matches!(
            verify_signature(SECRET, "order_N5x1", "pay_N5x2", "not-hex"),
            Err(RazorpayError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_to_paise() {
        assert_eq!(to_paise(Decimal::new(24950, 2)).unwrap(), 24_950);
        assert_eq!(to_paise(Decimal::new(1, 0)).unwrap(), 100);
        assert_eq!(to_paise(Decimal::new(10_004, 3)).unwrap(), 1_000);
        assert!(to_paise(Decimal::ZERO).is_err());
        assert!(to_paise(Decimal::new(-5, 0)).is_err());
    }

    #[test]
    fn test_create_order_body() {
        let body = CreateOrderRequest {
            amount: 24_950,
            currency: "INR",
            receipt: "LC20260101120000",
            payment_capture: 1,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["amount"], 24_950);
        assert_eq!(json["currency"], "INR");
        assert_eq!(json["payment_capture"], 1);
    }
}
