//! Admin account repository.

use sqlx::PgPool;

use local_crust_core::{AdminId, AdminRole, Email};

use super::{RepositoryError, conflict_on_unique};
use crate::models::Admin;

const ADMIN_COLUMNS: &str =
    "id, username, email, full_name, role, is_active, last_login, created_at";

/// An admin row together with its stored password hash.
#[derive(Debug, sqlx::FromRow)]
pub struct AdminCredentials {
    #[sqlx(flatten)]
    pub admin: Admin,
    pub password_hash: String,
}

/// Repository for admin account operations.
pub struct AdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: AdminId) -> Result<Option<Admin>, RepositoryError> {
        let admin = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(admin)
    }

    /// Admin and password hash for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_credentials(
        &self,
        username: &str,
    ) -> Result<Option<AdminCredentials>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminCredentials>(&format!(
            "SELECT {ADMIN_COLUMNS}, password_hash FROM admins WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email is taken.
    pub async fn create(
        &self,
        username: &str,
        email: &Email,
        full_name: &str,
        role: AdminRole,
        password_hash: &str,
    ) -> Result<Admin, RepositoryError> {
        sqlx::query_as::<_, Admin>(&format!(
            r"
            INSERT INTO admins (username, email, full_name, role, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ADMIN_COLUMNS}
            "
        ))
        .bind(username)
        .bind(email)
        .bind(full_name)
        .bind(role)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Admin with this username or email already exists"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn touch_last_login(&self, id: AdminId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE admins SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
