//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CRUST_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `CRUST_JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `CRUST_HOST` - Bind address (default: 127.0.0.1)
//! - `CRUST_PORT` - Listen port (default: 5000)
//! - `CRUST_CORS_ORIGINS` - Comma separated allowed origins (default: any)
//! - `SMTP_SERVER`, `SMTP_PORT`, `SMTP_EMAIL`, `SMTP_PASSWORD` - Outgoing mail
//! - `RAZORPAY_KEY_ID`, `RAZORPAY_KEY_SECRET` - Payment gateway credentials
//! - `GEMINI_API_KEY`, `GEMINI_MODEL` - Recipe and recommendation model
//! - `SNS_ORDER_CONFIRMATION_TOPIC`, `SNS_ORDER_STATUS_TOPIC`,
//!   `SNS_DELIVERY_TOPIC`, `SNS_BAKER_ORDER_TOPIC`, `SNS_PAYMENT_TOPIC` -
//!   Topic ARNs for order notifications (region comes from the AWS env chain)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`,
//!   `SENTRY_TRACES_SAMPLE_RATE` - Error tracking

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "change-this",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Marketplace server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    /// HS256 signing key for customer, baker and admin tokens
    pub jwt_secret: SecretString,
    /// Allowed CORS origins; `None` allows any origin
    pub cors_origins: Option<Vec<String>>,
    pub email: Option<EmailConfig>,
    pub razorpay: Option<RazorpayConfig>,
    pub gemini: Option<GeminiConfig>,
    pub sns: SnsTopics,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// SMTP configuration for OTP and order confirmation mail.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Login name, also used as the From address
    pub smtp_email: String,
    pub smtp_password: SecretString,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_email", &self.smtp_email)
            .field("smtp_password", &"[REDACTED]")
            .finish()
    }
}

/// Razorpay API credentials.
///
/// Implements `Debug` manually to redact the key secret.
#[derive(Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: SecretString,
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .finish()
    }
}

/// Gemini generative language API configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: SecretString,
    pub model: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

/// SNS topic ARNs, one per notification kind. Unset topics are skipped.
#[derive(Debug, Clone, Default)]
pub struct SnsTopics {
    pub order_confirmation: Option<String>,
    pub order_status: Option<String>,
    pub delivery: Option<String>,
    pub baker_order: Option<String>,
    pub payment: Option<String>,
}

impl SnsTopics {
    fn from_env() -> Self {
        Self {
            order_confirmation: get_optional_env("SNS_ORDER_CONFIRMATION_TOPIC"),
            order_status: get_optional_env("SNS_ORDER_STATUS_TOPIC"),
            delivery: get_optional_env("SNS_DELIVERY_TOPIC"),
            baker_order: get_optional_env("SNS_BAKER_ORDER_TOPIC"),
            payment: get_optional_env("SNS_PAYMENT_TOPIC"),
        }
    }

    /// True when at least one topic is configured.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.order_confirmation.is_some()
            || self.order_status.is_some()
            || self.delivery.is_some()
            || self.baker_order.is_some()
            || self.payment.is_some()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("CRUST_DATABASE_URL")?;
        let host = get_env_or_default("CRUST_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("CRUST_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("CRUST_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("CRUST_PORT".to_string(), e.to_string()))?;
        let jwt_secret = get_validated_secret("CRUST_JWT_SECRET")?;
        validate_secret_length(&jwt_secret, "CRUST_JWT_SECRET")?;
        let cors_origins = get_optional_env("CRUST_CORS_ORIGINS").map(|raw| parse_origins(&raw));

        let email = EmailConfig::from_env()?;
        let razorpay = RazorpayConfig::from_env()?;
        let gemini = GeminiConfig::from_env();
        let sns = SnsTopics::from_env();

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            cors_origins,
            email,
            razorpay,
            gemini,
            sns,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl EmailConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let email = get_optional_env("SMTP_EMAIL");
        let password = get_optional_env("SMTP_PASSWORD");

        match (email, password) {
            (Some(smtp_email), Some(password)) => {
                let smtp_port = get_env_or_default("SMTP_PORT", "587")
                    .parse::<u16>()
                    .map_err(|e| {
                        ConfigError::InvalidEnvVar("SMTP_PORT".to_string(), e.to_string())
                    })?;
                Ok(Some(Self {
                    smtp_host: get_env_or_default("SMTP_SERVER", "smtp.gmail.com"),
                    smtp_port,
                    smtp_email,
                    smtp_password: SecretString::from(password),
                }))
            }
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "SMTP_*".to_string(),
                "Both SMTP_EMAIL and SMTP_PASSWORD must be set together".to_string(),
            )),
        }
    }
}

impl RazorpayConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let key_id = get_optional_env("RAZORPAY_KEY_ID");
        let key_secret = get_optional_env("RAZORPAY_KEY_SECRET");

        match (key_id, key_secret) {
            (Some(key_id), Some(secret)) => {
                validate_secret_strength(&secret, "RAZORPAY_KEY_SECRET")?;
                Ok(Some(Self {
                    key_id,
                    key_secret: SecretString::from(secret),
                }))
            }
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "RAZORPAY_*".to_string(),
                "Both RAZORPAY_KEY_ID and RAZORPAY_KEY_SECRET must be set together".to_string(),
            )),
        }
    }
}

impl GeminiConfig {
    fn from_env() -> Option<Self> {
        let api_key = get_optional_env("GEMINI_API_KEY").filter(|k| !k.is_empty())?;
        Some(Self {
            api_key: SecretString::from(api_key),
            model: get_env_or_default("GEMINI_MODEL", "gemini-pro"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_owned)
        .collect()
}

fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholders and low-entropy values.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_bounds() {
        assert!(shannon_entropy("").abs() < f64::EPSILON);
        assert!(shannon_entropy("zzzzzz").abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("Qm7!rT2#kP9$wX4&") > MIN_ENTROPY_BITS_PER_CHAR);
    }

    #[test]
    fn test_placeholder_secrets_rejected() {
        for value in [
            "your-secret-key-change-in-production",
            "CHANGE-THIS-IN-PRODUCTION",
            "changeme123",
        ] {
            let err = validate_secret_strength(value, "CRUST_JWT_SECRET").unwrap_err();
            assert!(matches!(err, ConfigError::InsecureSecret(_, _)), "{value}");
        }
    }

    #[test]
    fn test_low_entropy_secret_rejected() {
        let result = validate_secret_strength(&"ab".repeat(20), "CRUST_JWT_SECRET");
        assert!(result.is_err());
    }

    #[test]
    fn test_strong_secret_accepted() {
        assert!(validate_secret_strength("Qm7!rT2#kP9$wX4&zL1^nB6*hF3@vD8%", "K").is_ok());
    }

    #[test]
    fn test_secret_length() {
        assert!(validate_secret_length(&SecretString::from("short"), "K").is_err());
        assert!(validate_secret_length(&SecretString::from("q".repeat(32)), "K").is_ok());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("https://localcrust.in, http://localhost:5173,,"),
            vec!["https://localcrust.in", "http://localhost:5173"]
        );
    }

    #[test]
    fn test_sns_topics_any() {
        assert!(!SnsTopics::default().any());
        let topics = SnsTopics {
            payment: Some("arn:aws:sns:ap-south-1:123456789012:payments".to_string()),
            ..SnsTopics::default()
        };
        assert!(topics.any());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let razorpay = RazorpayConfig {
            key_id: "rzp_test_visible".to_string(),
            key_secret: SecretString::from("hidden_razorpay_value"),
        };
        let email = EmailConfig {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            smtp_email: "orders@localcrust.in".to_string(),
            smtp_password: SecretString::from("hidden_smtp_value"),
        };

        let output = format!("{razorpay:?} {email:?}");
        assert!(output.contains("rzp_test_visible"));
        assert!(output.contains("orders@localcrust.in"));
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("hidden_razorpay_value"));
        assert!(!output.contains("hidden_smtp_value"));
    }
}
