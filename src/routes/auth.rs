//! Registration, login and logout.

use axum::{extract::State, response::Redirect, Form, Json};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use validator::Validate;

use super::{flash_error, flash_redirect, render, Page};
use crate::error::AppResult;
use crate::middleware::{session, OptionalUser};
use crate::services::AuthService;
use crate::state::AppState;
use crate::ShopError;

#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsForm {
    #[validate(length(min = 1, max = 80, message = "Username must be 1 to 80 characters."))]
    pub username: String,
    #[validate(length(min = 1, max = 128, message = "Password must be 1 to 128 characters."))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct FormPage {
    pub form: &'static str,
}

pub async fn register_page(OptionalUser(user): OptionalUser, session: Session) -> AppResult<Json<Page<FormPage>>> {
    render(&session, user, FormPage { form: "register" }).await
}

/// Create an account; the new user still has to log in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> AppResult<Redirect> {
    if let Err(errors) = form.validate() {
        return flash_error(&session, ShopError::from(errors), "/register").await;
    }
    match AuthService::new(state.pool(), state.events()).register(&form.username, &form.password).await {
        Ok(_) => flash_redirect(&session, "Registration successful!", "/login").await,
        Err(e) => flash_error(&session, e, "/register").await,
    }
}

pub async fn login_page(OptionalUser(user): OptionalUser, session: Session) -> AppResult<Json<Page<FormPage>>> {
    render(&session, user, FormPage { form: "login" }).await
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> AppResult<Redirect> {
    if form.validate().is_err() {
        return flash_error(&session, ShopError::InvalidCredentials, "/login").await;
    }
    match AuthService::new(state.pool(), state.events()).login(&form.username, &form.password).await {
        Ok(user) => {
            session::login(&session, &user).await?;
            tracing::info!(user_id = user.id, "User logged in");
            Ok(Redirect::to("/"))
        }
        Err(e) => flash_error(&session, e, "/login").await,
    }
}

pub async fn logout(session: Session) -> AppResult<Redirect> {
    session::logout(&session).await?;
    flash_redirect(&session, "Logged out successfully!", "/").await
}
