//! Authentication service.
//!
//! Password login for customers, bakers and admins, one-time email codes,
//! and signed session tokens.

mod error;
pub mod otp;
pub mod token;

pub use error::AuthError;
pub use otp::OtpStore;
pub use token::{Claims, TokenError, TokenSigner};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use local_crust_core::{Email, UserType};

use crate::db::{AdminRepository, BakerRepository, RepositoryError, UserRepository};
use crate::models::{Admin, Baker, NewBaker, NewProduct, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    bakers: BakerRepository<'a>,
    admins: AdminRepository<'a>,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            bakers: BakerRepository::new(pool),
            admins: AdminRepository::new(pool),
        }
    }

    /// Register a customer or baker account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
        user_type: UserType,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.users
            .create(&email, name.trim(), &password_hash, user_type)
            .await
            .map_err(map_conflict)
    }

    /// Register a baker account with its shop and starting catalogue.
    ///
    /// # Errors
    ///
    /// Same as [`Self::register`].
    pub async fn register_baker(
        &self,
        email: &str,
        password: &str,
        shop: &NewBaker,
        products: &[NewProduct],
        verified: bool,
    ) -> Result<(User, Baker), AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.bakers
            .create_with_account(&email, &password_hash, shop, products, verified)
            .await
            .map_err(map_conflict)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email or password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let credentials = self
            .users
            .get_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &credentials.password_hash)?;

        Ok(credentials.user)
    }

    /// Look up the account a one-time code is being sent to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account uses this email.
    pub async fn user_for_otp(&self, email: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        self.users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Login to the back office. Records the login time on success.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username or password is
    /// wrong, and `AuthError::AccountInactive` if the account is disabled.
    pub async fn login_admin(&self, username: &str, password: &str) -> Result<Admin, AuthError> {
        let credentials = self
            .admins
            .get_credentials(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !credentials.admin.is_active {
            return Err(AuthError::AccountInactive);
        }

        verify_password(password, &credentials.password_hash)?;

        self.admins.touch_last_login(credentials.admin.id).await?;

        Ok(credentials.admin)
    }
}

fn map_conflict(e: RepositoryError) -> AuthError {
    match e {
        RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
        other => AuthError::Repository(other),
    }
}

/// Validate password requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is shorter than 8 characters.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("crusty-sourdough").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("crusty-sourdough", &hash).is_ok());
        assert!(matches!(
            verify_password("soggy-sourdough", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("eightchr").is_ok());
    }
}
