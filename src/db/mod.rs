//! SQLite persistence.
//!
//! # Tables
//!
//! - `users` - accounts, with an admin flag
//! - `products` - catalog and stock counts (`stock >= 0` is a CHECK constraint)
//! - `cart_items` - one row per (user, product)
//! - `orders` - immutable checkout records; UPDATE and DELETE are rejected by triggers
//! - `tower_sessions` - session records, created by the session store
//!
//! Migrations live in `migrations/` and are embedded at build time.

pub mod carts;
pub mod orders;
pub mod products;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub use carts::CartRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Create a SQLite connection pool.
///
/// In-memory databases exist per connection, so they get a single
/// connection that is never recycled.
pub async fn create_pool(database_url: &SecretString) -> Result<SqlitePool, sqlx::Error> {
    let url = database_url.expose_secret();
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let in_memory = url.contains(":memory:") || url.contains("mode=memory");
    let pool = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(10))
    };

    pool.connect_with(options).await
}

/// Apply the embedded migrations and create the session table.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    crate::middleware::session_store(pool).migrate().await?;
    Ok(())
}

/// Pool with migrations applied, for tests.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = create_pool(&SecretString::from("sqlite::memory:")).await.unwrap();
    migrate(&pool).await.unwrap();
    pool
}

/// Migrated pool on a database file, for tests that need several connections.
#[cfg(test)]
pub(crate) async fn file_pool(dir: &tempfile::TempDir) -> SqlitePool {
    let url = format!("sqlite://{}", dir.path().join("shop.db").display());
    let pool = create_pool(&SecretString::from(url)).await.unwrap();
    migrate(&pool).await.unwrap();
    pool
}
