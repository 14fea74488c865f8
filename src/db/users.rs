//! User repository.

use sqlx::SqlitePool;

use crate::domain::aggregates::User;
use crate::domain::value_objects::Username;
use crate::ShopError;

const USER_COLUMNS: &str = "id, username, password_hash, is_admin";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_username(&self, username: &Username) -> Result<Option<User>, ShopError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"))
            .bind(username.as_str())
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, ShopError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Insert a user.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::UsernameTaken` if the name is already in use.
    pub async fn create(&self, username: &Username, password_hash: &str, is_admin: bool) -> Result<User, ShopError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password_hash, is_admin) VALUES (?1, ?2, ?3) RETURNING {USER_COLUMNS}"
        ))
        .bind(username.as_str())
        .bind(password_hash)
        .bind(is_admin)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => ShopError::UsernameTaken,
            other => ShopError::Database(other),
        })
    }

    pub async fn promote_to_admin(&self, id: i64) -> Result<(), ShopError> {
        sqlx::query("UPDATE users SET is_admin = TRUE WHERE id = ?1").bind(id).execute(self.pool).await?;
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<User>, ShopError> {
        let users = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(self.pool)
            .await?;
        Ok(users)
    }

    pub async fn count(&self) -> Result<i64, ShopError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(self.pool).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);
        let name = Username::new("alice").unwrap();

        let alice = repo.create(&name, "hash", false).await.unwrap();
        assert!(!alice.is_admin);

        let err = repo.create(&name, "other", true).await.unwrap_err();
        assert!(matches!(err, ShopError::UsernameTaken));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_promote_to_admin() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);
        let bob = repo.create(&Username::new("bob").unwrap(), "hash", false).await.unwrap();

        repo.promote_to_admin(bob.id).await.unwrap();
        assert!(repo.get_by_id(bob.id).await.unwrap().unwrap().is_admin);
    }
}
