//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] local_crust_core::EmailError),

    /// Wrong password, or no account for this email.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found")]
    UserNotFound,

    #[error("user already exists")]
    UserAlreadyExists,

    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The admin account has been deactivated.
    #[error("account inactive")]
    AccountInactive,

    /// No code was issued for this email, or it was already used.
    #[error("otp not found")]
    OtpMissing,

    #[error("otp expired")]
    OtpExpired,

    #[error("otp mismatch")]
    OtpMismatch,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("password hashing error")]
    PasswordHash,
}
