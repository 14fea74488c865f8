//! Authentication service.
//!
//! Password accounts with Argon2id hashes.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sqlx::SqlitePool;
use tracing::instrument;

use crate::db::UserRepository;
use crate::domain::aggregates::User;
use crate::domain::events::UserEvent;
use crate::domain::value_objects::Username;
use crate::services::EventPublisher;
use crate::ShopError;

pub struct AuthService<'a> {
    users: UserRepository<'a>,
    events: &'a EventPublisher,
}

impl<'a> AuthService<'a> {
    pub fn new(pool: &'a SqlitePool, events: &'a EventPublisher) -> Self {
        Self { users: UserRepository::new(pool), events }
    }

    /// Create a shopper account. The caller is not logged in.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::UsernameTaken` if the name is in use; the users
    /// table is left unchanged.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<User, ShopError> {
        let username = Username::new(username)?;
        if self.users.get_by_username(&username).await?.is_some() {
            return Err(ShopError::UsernameTaken);
        }
        let hash = hash_password(password)?;
        let user = self.users.create(&username, &hash, false).await?;
        tracing::info!(user_id = user.id, "User registered");
        self.events
            .publish(UserEvent::Registered { user_id: user.id, username: user.username.clone() })
            .await;
        Ok(user)
    }

    /// Unknown users and wrong passwords fail the same way.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<User, ShopError> {
        let username = Username::new(username).map_err(|_| ShopError::InvalidCredentials)?;
        let user = self.users.get_by_username(&username).await?.ok_or(ShopError::InvalidCredentials)?;
        verify_password(password, &user.password_hash)?;
        Ok(user)
    }

    /// Make sure an admin account with these credentials exists.
    ///
    /// An existing user of that name is promoted; its password is kept.
    #[instrument(skip(self, password))]
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<User, ShopError> {
        let username = Username::new(username)?;
        match self.users.get_by_username(&username).await? {
            Some(user) if user.is_admin => Ok(user),
            Some(user) => {
                self.users.promote_to_admin(user.id).await?;
                tracing::info!(user_id = user.id, "Promoted user to admin");
                Ok(User { is_admin: true, ..user })
            }
            None => {
                let hash = hash_password(password)?;
                let user = self.users.create(&username, &hash, true).await?;
                tracing::info!(user_id = user.id, "Created admin user");
                Ok(user)
            }
        }
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, ShopError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| ShopError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), ShopError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| ShopError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| ShopError::InvalidCredentials)
}
