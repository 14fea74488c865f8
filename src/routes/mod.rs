//! HTTP route handlers.
//!
//! # Conventions
//!
//! - POST actions answer `303 See Other` with a flash message queued.
//! - GET pages answer a JSON [`Page`] carrying the logged-in user and any
//!   flash messages, which are consumed by the view.
//! - User-facing [`ShopError`]s become flash messages; anything else
//!   propagates as [`AppError`].

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tower_sessions::Session;

use crate::error::{AppError, AppResult};
use crate::middleware::{create_session_layer, flash, take_flashes, CurrentUser};
use crate::state::AppState;
use crate::ShopError;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let session_layer = create_session_layer(state.pool(), state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        // Catalog
        .route("/", get(catalog::home))
        .route("/products/{id}", get(catalog::product_detail))
        // Accounts
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout).post(auth::logout))
        // Cart and checkout
        .route("/cart", get(cart::view_cart))
        .route("/cart/add/{product_id}", post(cart::add_to_cart))
        .route("/cart/remove/{product_id}", post(cart::remove_from_cart))
        .route("/cart/quote", post(cart::quote))
        .route("/checkout", post(orders::checkout))
        .route("/orders", get(orders::order_history))
        // Admin
        .route("/admin", get(admin::dashboard))
        .route("/admin/products", post(admin::add_product))
        .route("/admin/products/{id}/delete", post(admin::delete_product))
        .route("/admin/products/{id}/stock", post(admin::update_stock))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A JSON page view.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub user: Option<CurrentUser>,
    pub flashes: Vec<String>,
    #[serde(flatten)]
    pub body: T,
}

/// Render a page, consuming pending flash messages.
pub(crate) async fn render<T: Serialize>(
    session: &Session,
    user: Option<CurrentUser>,
    body: T,
) -> AppResult<Json<Page<T>>> {
    let flashes = take_flashes(session).await?;
    Ok(Json(Page { user, flashes, body }))
}

/// Queue `message` and redirect to `to`.
pub(crate) async fn flash_redirect(session: &Session, message: impl Into<String>, to: &str) -> AppResult<Redirect> {
    flash(session, message).await?;
    Ok(Redirect::to(to))
}

/// Flash a user-facing error and redirect; propagate anything else.
pub(crate) async fn flash_error(session: &Session, err: ShopError, to: &str) -> AppResult<Redirect> {
    if !err.is_user_facing() {
        return Err(AppError::Shop(err));
    }
    flash_redirect(session, err.to_string(), to).await
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy", "service": "shopfront" }))
}

async fn readiness(State(state): State<AppState>) -> Response {
    match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => Json(serde_json::json!({ "status": "ready", "nats": state.events().is_connected() })).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(serde_json::json!({ "status": "unavailable" }))).into_response()
        }
    }
}
