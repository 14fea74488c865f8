//! Admin dashboard and inventory actions.
//!
//! Every handler takes [`RequireAdmin`] first, so a non-admin request is
//! turned away before the form is read or the database is touched.

use std::str::FromStr;

use axum::{
    extract::{Path, State},
    response::Redirect,
    Form, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use validator::Validate;

use super::{flash_error, flash_redirect, render, Page};
use crate::db::{OrderRepository, ProductRepository, UserRepository};
use crate::domain::aggregates::{NewProduct, Order, Product, StockStatus, User};
use crate::domain::pricing::format_price;
use crate::domain::value_objects::Money;
use crate::error::AppResult;
use crate::middleware::RequireAdmin;
use crate::services::InventoryService;
use crate::state::AppState;
use crate::ShopError;

#[derive(Debug, Deserialize, Validate)]
pub struct NewProductForm {
    #[validate(length(min = 1, max = 100, message = "Product name must be 1 to 100 characters."))]
    pub name: String,
    /// Dollars, e.g. `12.50`.
    pub price: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Stock cannot be negative."))]
    pub stock: i64,
}

impl NewProductForm {
    fn into_new_product(self) -> Result<NewProduct, ShopError> {
        self.validate()?;
        let price = Decimal::from_str(self.price.trim())
            .map_err(|_| ShopError::Validation("Price must be a valid amount.".into()))?;
        NewProduct::new(self.name, Money::new(price), self.description, self.stock)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct StockForm {
    #[validate(range(min = 0, max = 1_000_000, message = "Stock must be between 0 and 1,000,000."))]
    pub stock: i64,
}

#[derive(Debug, Serialize)]
pub struct AdminProductView {
    #[serde(flatten)]
    pub product: Product,
    pub price: String,
    pub stock_status: StockStatus,
}

#[derive(Debug, Serialize)]
pub struct DashboardPage {
    pub users: Vec<User>,
    pub products: Vec<AdminProductView>,
    pub orders: Vec<Order>,
}

pub async fn dashboard(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Page<DashboardPage>>> {
    let pool = state.pool();
    let low_stock = state.config().low_stock_threshold;

    let users = UserRepository::new(pool).list().await?;
    let products = ProductRepository::new(pool)
        .list()
        .await?
        .into_iter()
        .map(|product| AdminProductView {
            price: format_price(product.price()),
            stock_status: product.stock_status(low_stock),
            product,
        })
        .collect();
    let orders = OrderRepository::new(pool).list().await?;

    render(&session, Some(admin), DashboardPage { users, products, orders }).await
}

pub async fn add_product(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<NewProductForm>,
) -> AppResult<Redirect> {
    let product = match form.into_new_product() {
        Ok(product) => product,
        Err(e) => return flash_error(&session, e, "/admin").await,
    };
    match InventoryService::new(state.pool(), state.events()).create_product(&product).await {
        Ok(_) => flash_redirect(&session, "Product added successfully!", "/admin").await,
        Err(e) => flash_error(&session, e, "/admin").await,
    }
}

pub async fn delete_product(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<Redirect> {
    match InventoryService::new(state.pool(), state.events()).delete_product(id).await {
        Ok(()) => flash_redirect(&session, "Product deleted successfully!", "/admin").await,
        Err(e) => flash_error(&session, e, "/admin").await,
    }
}

pub async fn update_stock(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Form(form): Form<StockForm>,
) -> AppResult<Redirect> {
    if let Err(errors) = form.validate() {
        return flash_error(&session, ShopError::from(errors), "/admin").await;
    }
    match InventoryService::new(state.pool(), state.events()).set_stock(id, form.stock).await {
        Ok(_) => flash_redirect(&session, "Stock updated successfully!", "/admin").await,
        Err(e) => flash_error(&session, e, "/admin").await,
    }
}
