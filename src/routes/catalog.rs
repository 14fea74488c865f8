//! Public catalog pages.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tower_sessions::Session;

use super::{render, Page};
use crate::db::ProductRepository;
use crate::domain::aggregates::Product;
use crate::domain::pricing::format_price;
use crate::error::AppResult;
use crate::middleware::OptionalUser;
use crate::state::AppState;
use crate::ShopError;

#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub price: String,
    pub in_stock: bool,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self { price: format_price(product.price()), in_stock: product.is_in_stock(), product }
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogPage {
    pub products: Vec<ProductView>,
}

#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub product: ProductView,
}

pub async fn home(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    session: Session,
) -> AppResult<Json<Page<CatalogPage>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    let products = products.into_iter().map(ProductView::from).collect();
    render(&session, user, CatalogPage { products }).await
}

pub async fn product_detail(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    session: Session,
    Path(id): Path<i64>,
) -> AppResult<Json<Page<ProductPage>>> {
    let product = ProductRepository::new(state.pool()).get(id).await?.ok_or(ShopError::ProductNotFound)?;
    render(&session, user, ProductPage { product: product.into() }).await
}
