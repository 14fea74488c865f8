//! Shopfront
//!
//! Self-hosted storefront: product catalog, per-user cart, checkout into
//! immutable orders, and an inventory admin.
//!
//! ## Features
//! - Product catalog browsing
//! - Cart with stock reserved at add time and released on removal
//! - Transactional checkout
//! - Admin product and stock management
//! - Domain events, optionally published to NATS

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors raised by the domain and service layers.
///
/// The `Display` text of user-facing variants is shown to shoppers as a
/// flash message.
#[derive(Error, Debug)]
pub enum ShopError {
    #[error("Product not found!")]
    ProductNotFound,

    #[error("Not enough stock available!")]
    InsufficientStock { available: i64, requested: i64 },

    #[error("Quantity must be at least 1.")]
    InvalidQuantity,

    #[error("Your cart is empty!")]
    EmptyCart,

    #[error("That item is not in your cart.")]
    CartLineNotFound,

    #[error("Username already exists!")]
    UsernameTaken,

    #[error("Invalid credentials!")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing failed")]
    PasswordHash,
}

impl ShopError {
    /// Whether the error describes something the shopper can act on.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::PasswordHash)
    }
}

impl From<validator::ValidationErrors> for ShopError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .map(|e| {
                e.message
                    .as_ref()
                    .map_or_else(|| format!("Invalid {}.", e.code), ToString::to_string)
            })
            .collect();
        messages.sort();
        messages.dedup();
        Self::Validation(messages.join(" "))
    }
}

pub type Result<T> = std::result::Result<T, ShopError>;
