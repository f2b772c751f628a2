//! Database operations for the marketplace `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Customer and baker accounts
//! - `bakers` - Shop profiles (1:1 with a baker user)
//! - `products` - Catalogue entries owned by a baker
//! - `orders` / `order_items` - Orders with per-line product snapshots
//! - `reviews` - One review per (user, product), with an optional baker reply
//! - `wishlists` - Saved products per user
//! - `notifications` - In-app notifications
//! - `admins` - Back-office accounts
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p local-crust-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod admins;
pub mod analytics;
pub mod bakers;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;
pub mod wishlist;

pub use admins::AdminRepository;
pub use analytics::AnalyticsRepository;
pub use bakers::BakerRepository;
pub use notifications::NotificationRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use reviews::ReviewRepository;
pub use users::UserRepository;
pub use wishlist::WishlistRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value failed to convert into its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    #[error("not found")]
    NotFound,

    /// A unique constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Map a unique violation to [`RepositoryError::Conflict`] with `message`.
pub(crate) fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_string());
    }
    RepositoryError::Database(e)
}

/// Page window for admin listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub per_page: i64,
}

impl Page {
    pub const MAX_PER_PAGE: i64 = 100;

    /// Clamp caller-supplied paging to sane bounds.
    #[must_use]
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(20).clamp(1, Self::MAX_PER_PAGE),
        }
    }

    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    /// Number of pages needed for `total` rows.
    #[must_use]
    pub const fn pages(&self, total: i64) -> i64 {
        (total + self.per_page - 1) / self.per_page
    }
}

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_clamping() {
        let page = Page::new(None, None);
        assert_eq!(page, Page { page: 1, per_page: 20 });
        assert_eq!(page.offset(), 0);

        let page = Page::new(Some(0), Some(1_000));
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, Page::MAX_PER_PAGE);

        assert_eq!(Page::new(Some(3), Some(10)).offset(), 20);
    }

    #[test]
    fn test_page_count() {
        let page = Page::new(Some(1), Some(20));
        assert_eq!(page.pages(0), 0);
        assert_eq!(page.pages(20), 1);
        assert_eq!(page.pages(21), 2);
    }
}
