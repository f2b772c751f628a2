//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::auth::{OtpStore, TokenSigner};
use crate::services::email::EmailService;
use crate::services::gemini::{GeminiClient, GeminiError};
use crate::services::notify::Notifier;
use crate::services::razorpay::{RazorpayClient, RazorpayError};

/// Error building an integration client at startup.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("SMTP configuration error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("Razorpay client error: {0}")]
    Razorpay(#[from] RazorpayError),
    #[error("Gemini client error: {0}")]
    Gemini(#[from] GeminiError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Optional integrations are `None` when their
/// configuration is absent.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    tokens: TokenSigner,
    otp: OtpStore,
    email: Option<EmailService>,
    razorpay: Option<RazorpayClient>,
    gemini: Option<GeminiClient>,
    notifier: Notifier,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `pool` - `PostgreSQL` connection pool
    /// * `notifier` - SNS publisher (see [`Notifier::from_topics`])
    ///
    /// # Errors
    ///
    /// Returns an error if a configured integration client cannot be built.
    pub fn new(config: ServerConfig, pool: PgPool, notifier: Notifier) -> Result<Self, StateError> {
        let email = config.email.as_ref().map(EmailService::new).transpose()?;
        let razorpay = config.razorpay.as_ref().map(RazorpayClient::new).transpose()?;
        let gemini = config.gemini.as_ref().map(GeminiClient::new).transpose()?;

        if email.is_none() {
            tracing::warn!("SMTP not configured, OTP codes will be returned in responses");
        }
        if razorpay.is_none() {
            tracing::warn!("Razorpay not configured, orders will not get gateway orders");
        }
        if gemini.is_none() {
            tracing::warn!("Gemini not configured, AI features will use fallbacks");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                tokens: TokenSigner::new(config.jwt_secret.clone()),
                otp: OtpStore::new(),
                config,
                pool,
                email,
                razorpay,
                gemini,
                notifier,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Signs and verifies session tokens.
    #[must_use]
    pub fn tokens(&self) -> &TokenSigner {
        &self.inner.tokens
    }

    /// Outstanding one-time login codes.
    #[must_use]
    pub fn otp(&self) -> &OtpStore {
        &self.inner.otp
    }

    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }

    #[must_use]
    pub fn razorpay(&self) -> Option<&RazorpayClient> {
        self.inner.razorpay.as_ref()
    }

    #[must_use]
    pub fn gemini(&self) -> Option<&GeminiClient> {
        self.inner.gemini.as_ref()
    }

    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }
}
