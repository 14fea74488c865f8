//! HTTP error type for handlers.
//!
//! User-facing [`ShopError`]s are normally turned into a flash message and a
//! redirect by the handler itself. Whatever reaches [`AppError`] is an
//! infrastructure failure and answers 500 without details.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::ShopError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Shop(#[from] ShopError),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Shop(ShopError::Database(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Shop(ref err) if err.is_user_facing() => {
                let status = match err {
                    ShopError::ProductNotFound | ShopError::CartLineNotFound => StatusCode::NOT_FOUND,
                    ShopError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, err.to_string()).into_response()
            }
            other => {
                tracing::error!(error = %other, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
