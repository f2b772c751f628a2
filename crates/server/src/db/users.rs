//! User repository for database operations.
//!
//! Covers customer and baker accounts. Baker shop rows live in
//! [`super::bakers`]; creating a baker account goes through that repository so
//! the user and shop rows are written in one transaction.

use sqlx::PgPool;

use local_crust_core::{Email, UserId, UserType};

use super::{Page, RepositoryError, conflict_on_unique};
use crate::models::User;

const USER_COLUMNS: &str = "id, email, name, user_type, saved_address, created_at";

/// A user row together with its stored password hash.
#[derive(Debug, sqlx::FromRow)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

/// Order and review counts shown on the admin user detail page.
#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
pub struct UserActivity {
    pub total_orders: i64,
    pub total_reviews: i64,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user and their password hash for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, RepositoryError> {
        let row = sqlx::query_as::<_, UserCredentials>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        password_hash: &str,
        user_type: UserType,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            r"
            INSERT INTO users (email, name, password_hash, user_type)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .bind(user_type)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Email already registered"))
    }

    /// Rename a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn update_name(&self, id: UserId, name: &str) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET name = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Replace the saved delivery address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn save_address(
        &self,
        id: UserId,
        address: &serde_json::Value,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET saved_address = $2 WHERE id = $1")
            .bind(id)
            .bind(address)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// List accounts of one type, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_type(
        &self,
        user_type: UserType,
        page: Page,
    ) -> Result<(Vec<User>, i64), RepositoryError> {
        let users = sqlx::query_as::<_, User>(&format!(
            r"
            SELECT {USER_COLUMNS} FROM users
            WHERE user_type = $1
            ORDER BY id
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(user_type)
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        let total = self.count_by_type(user_type).await?;

        Ok((users, total))
    }

    /// Count accounts of one type.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_type(&self, user_type: UserType) -> Result<i64, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE user_type = $1")
            .bind(user_type)
            .fetch_one(self.pool)
            .await?;

        Ok(total)
    }

    /// Count a user's orders and reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn activity(&self, id: UserId) -> Result<UserActivity, RepositoryError> {
        let activity = sqlx::query_as::<_, UserActivity>(
            r"
            SELECT
                (SELECT COUNT(*) FROM orders WHERE user_id = $1) AS total_orders,
                (SELECT COUNT(*) FROM reviews WHERE user_id = $1) AS total_reviews
            ",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(activity)
    }

    /// Delete an account. Orders, reviews and notifications cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
