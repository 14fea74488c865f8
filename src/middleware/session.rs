//! Session configuration and the data kept in it.
//!
//! The session holds the logged-in [`CurrentUser`] and a queue of flash
//! messages that the next page view consumes. Records live in the
//! `tower_sessions` table of the shop database.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_sessions::{session, Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::Config;
use crate::domain::aggregates::User;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "shop_session";

/// How often expired session records are purged.
pub const EXPIRED_SESSION_SWEEP: std::time::Duration = std::time::Duration::from_secs(60);

/// Session keys.
pub mod keys {
    /// The logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Pending flash messages, oldest first.
    pub const FLASHES: &str = "_flashes";
}

/// Session-stored user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self { id: user.id, username: user.username.clone(), is_admin: user.is_admin }
    }
}

/// Session store on the shop's pool. Its table is created by [`crate::db::migrate`].
pub fn session_store(pool: &SqlitePool) -> SqliteStore {
    SqliteStore::new(pool.clone())
}

/// Create the session layer with the SQLite store.
#[must_use]
pub fn create_session_layer(pool: &SqlitePool, config: &Config) -> SessionManagerLayer<SqliteStore> {
    SessionManagerLayer::new(session_store(pool))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(tower_sessions::cookie::time::Duration::minutes(
            config.session_ttl_minutes,
        )))
        .with_secure(config.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Queue a message for the next page view.
pub async fn flash(session: &Session, message: impl Into<String>) -> Result<(), session::Error> {
    let mut flashes: Vec<String> = session.get(keys::FLASHES).await?.unwrap_or_default();
    flashes.push(message.into());
    session.insert(keys::FLASHES, flashes).await
}

/// Remove and return all pending messages.
pub async fn take_flashes(session: &Session) -> Result<Vec<String>, session::Error> {
    Ok(session.remove::<Vec<String>>(keys::FLASHES).await?.unwrap_or_default())
}

/// Log the user in, cycling the session id.
pub async fn login(session: &Session, user: &User) -> Result<(), session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, CurrentUser::from(user)).await
}

/// Drop the current user, keeping pending flashes.
pub async fn logout(session: &Session) -> Result<(), session::Error> {
    let flashes = take_flashes(session).await?;
    session.flush().await?;
    if !flashes.is_empty() {
        session.insert(keys::FLASHES, flashes).await?;
    }
    Ok(())
}

pub async fn current_user(session: &Session) -> Result<Option<CurrentUser>, session::Error> {
    session.get(keys::CURRENT_USER).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use std::sync::Arc;
    use tower_sessions::cookie::time::{Duration, OffsetDateTime};
    use tower_sessions::session::{Id, Record};
    use tower_sessions::{ExpiredDeletion, SessionStore};

    async fn session() -> Session {
        Session::new(None, Arc::new(session_store(&test_pool().await)), None)
    }

    fn record(expiry_date: OffsetDateTime) -> Record {
        Record { id: Id::default(), data: Default::default(), expiry_date }
    }

    fn user(is_admin: bool) -> User {
        User { id: 4, username: "lee".into(), password_hash: "hash".into(), is_admin }
    }

    #[tokio::test]
    async fn test_flashes_are_consumed_in_order() {
        let session = session().await;
        flash(&session, "first").await.unwrap();
        flash(&session, "second").await.unwrap();

        assert_eq!(take_flashes(&session).await.unwrap(), vec!["first", "second"]);
        assert!(take_flashes(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let session = session().await;
        login(&session, &user(true)).await.unwrap();
        let current = current_user(&session).await.unwrap().unwrap();
        assert_eq!(current, CurrentUser { id: 4, username: "lee".into(), is_admin: true });

        flash(&session, "Logged out successfully!").await.unwrap();
        logout(&session).await.unwrap();
        assert!(current_user(&session).await.unwrap().is_none());
        assert_eq!(take_flashes(&session).await.unwrap(), vec!["Logged out successfully!"]);
    }

    #[tokio::test]
    async fn test_session_survives_in_the_database() {
        let store = Arc::new(session_store(&test_pool().await));
        let session = Session::new(None, store.clone(), None);
        flash(&session, "Item added to cart!").await.unwrap();
        session.save().await.unwrap();
        let id = session.id().unwrap();

        let reloaded = Session::new(Some(id), store, None);
        assert_eq!(take_flashes(&reloaded).await.unwrap(), vec!["Item added to cart!"]);
    }

    #[tokio::test]
    async fn test_expired_sessions_are_deleted() {
        let pool = test_pool().await;
        let store = session_store(&pool);
        let mut stale = record(OffsetDateTime::now_utc() - Duration::hours(1));
        let mut live = record(OffsetDateTime::now_utc() + Duration::hours(1));
        store.create(&mut stale).await.unwrap();
        store.create(&mut live).await.unwrap();

        store.delete_expired().await.unwrap();

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tower_sessions").fetch_one(&pool).await.unwrap();
        assert_eq!(remaining, 1);
        assert!(store.load(&stale.id).await.unwrap().is_none());
        assert!(store.load(&live.id).await.unwrap().is_some());
    }
}
