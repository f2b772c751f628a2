//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! crust-cli admin create -u ops -e ops@localcrust.in -f "Ops Team" -r super_admin
//! ```
//!
//! The password is read from `CRUST_ADMIN_PASSWORD` when set, otherwise from
//! the first line of standard input.
//!
//! # Environment Variables
//!
//! - `CRUST_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `CRUST_ADMIN_PASSWORD` - Password for the new account (optional)

use tokio::io::{AsyncBufReadExt, BufReader};

use local_crust_core::{AdminId, AdminRole, Email};
use local_crust_server::db::{AdminRepository, RepositoryError};
use local_crust_server::services::auth::{AuthError, hash_password, validate_password};
use thiserror::Error;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Invalid role: {0}. Valid roles: super_admin, admin")]
    InvalidRole(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] local_crust_core::EmailError),

    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error("No password given")]
    MissingPassword,

    #[error("{0}")]
    Password(#[from] AuthError),

    #[error("Failed to read password: {0}")]
    Io(#[from] std::io::Error),

    /// Username or email already taken.
    #[error("{0}")]
    Exists(String),

    #[error("Database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AdminError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict(message) => Self::Exists(message),
            other => Self::Repository(other),
        }
    }
}

/// Create a new admin account.
///
/// # Errors
///
/// Returns an error for an unknown role, an invalid email, a short password
/// or an existing username or email.
pub async fn create(
    username: &str,
    email: &str,
    full_name: &str,
    role: &str,
) -> Result<AdminId, Box<dyn std::error::Error>> {
    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email).map_err(AdminError::from)?;
    let username = username.trim();
    if username.is_empty() {
        return Err(AdminError::EmptyUsername.into());
    }

    let password = read_password().await?;
    validate_password(&password).map_err(AdminError::from)?;
    let password_hash = hash_password(&password).map_err(AdminError::from)?;

    let pool = super::connect().await?;
    tracing::info!("Creating admin account: {} ({})", username, role);

    let admin = AdminRepository::new(&pool)
        .create(username, &email, full_name.trim(), role, &password_hash)
        .await
        .map_err(AdminError::from)?;

    tracing::info!(
        "Admin created successfully! ID: {}, Username: {}, Role: {}",
        admin.id,
        admin.username,
        admin.role
    );

    Ok(admin.id)
}

async fn read_password() -> Result<String, AdminError> {
    if let Ok(password) = std::env::var("CRUST_ADMIN_PASSWORD") {
        return Ok(password);
    }

    #[allow(clippy::print_stderr)]
    {
        eprint!("Password: ");
    }

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;

    let password = line.trim_end_matches(['\r', '\n']).to_owned();
    if password.is_empty() {
        return Err(AdminError::MissingPassword);
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_becomes_exists() {
        let err = AdminError::from(RepositoryError::Conflict(
            "Admin with this username or email already exists".into(),
        ));
        assert_eq!(
            err.to_string(),
            "Admin with this username or email already exists"
        );
    }

    #[test]
    fn test_not_found_stays_repository_error() {
        let err = AdminError::from(RepositoryError::NotFound);
        assert!(matches!(err, AdminError::Repository(RepositoryError::NotFound)));
    }
}
