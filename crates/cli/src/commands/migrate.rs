//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! crust-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CRUST_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! `crates/server/migrations/`, applied in filename order and recorded in
//! `_sqlx_migrations`.

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the connection fails or a migration does not apply.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
