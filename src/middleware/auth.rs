//! Authentication extractors.
//!
//! Rejections queue a flash message and redirect, so the handler body never
//! runs for a visitor without the required role.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use super::session::{current_user, flash, CurrentUser};

pub const LOGIN_REQUIRED: &str = "Please log in to continue.";
pub const ADMIN_REQUIRED: &str = "Unauthorized access!";

/// Extractor that requires a logged-in user.
///
/// ```rust,ignore
/// async fn orders(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Orders for {}", user.username)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Extractor that requires a logged-in admin.
pub struct RequireAdmin(pub CurrentUser);

/// Extractor that never rejects.
pub struct OptionalUser(pub Option<CurrentUser>);

pub enum AuthRejection {
    /// Not logged in.
    RedirectToLogin,
    /// Logged in without the admin flag.
    RedirectHome,
    /// The session layer is missing or the store failed.
    SessionUnavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::RedirectHome => Redirect::to("/").into_response(),
            Self::SessionUnavailable => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

async fn session_user(parts: &Parts) -> Result<(Session, Option<CurrentUser>), AuthRejection> {
    let session = parts.extensions.get::<Session>().cloned().ok_or(AuthRejection::SessionUnavailable)?;
    let user = current_user(&session).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to read session");
        AuthRejection::SessionUnavailable
    })?;
    Ok((session, user))
}

async fn reject(session: &Session, message: &str, rejection: AuthRejection) -> AuthRejection {
    if let Err(e) = flash(session, message).await {
        tracing::warn!(error = %e, "Failed to queue flash message");
    }
    rejection
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match session_user(parts).await? {
            (_, Some(user)) => Ok(Self(user)),
            (session, None) => Err(reject(&session, LOGIN_REQUIRED, AuthRejection::RedirectToLogin).await),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match session_user(parts).await? {
            (_, Some(user)) if user.is_admin => Ok(Self(user)),
            // Anonymous visitors are treated like any other non-admin.
            (session, user) => {
                tracing::warn!(user_id = user.map(|u| u.id), path = %parts.uri.path(), "Non-admin denied");
                Err(reject(&session, ADMIN_REQUIRED, AuthRejection::RedirectHome).await)
            }
        }
    }
}

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_user(session).await.ok().flatten(),
            None => None,
        };
        Ok(Self(user))
    }
}
