//! Cart pages and actions.

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
use crate::domain::aggregates::PricedLine;
use crate::domain::pricing::{self, format_price, Coupon, Quote};
use crate::error::AppResult;
use crate::middleware::RequireUser;
use crate::services::CartService;
use crate::state::AppState;
use crate::ShopError;

const fn one() -> i64 {
    1
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartForm {
    #[serde(default = "one")]
    #[validate(range(min = 1, message = "Quantity must be at least 1."))]
    pub quantity: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuoteForm {
    #[serde(default)]
    pub coupon: Option<String>,
    #[serde(default)]
    pub distance_km: Option<Decimal>,
    #[serde(default)]
    pub weight_kg: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
    pub unit_price: String,
    pub line_total: String,
}

impl TryFrom<&PricedLine> for CartLineView {
    type Error = ShopError;

    fn try_from(line: &PricedLine) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: line.product_id,
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: format_price(line.unit_price()),
            line_total: format_price(line.line_total()?),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CartPage {
    pub items: Vec<CartLineView>,
    pub item_count: i64,
    pub total: String,
    pub total_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct QuotePage {
    pub quote: Quote,
    pub display_total: String,
}

pub async fn add_to_cart(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<i64>,
    Form(form): Form<AddToCartForm>,
) -> AppResult<Redirect> {
    if let Err(errors) = form.validate() {
        return flash_error(&session, ShopError::from(errors), "/").await;
    }
    match CartService::new(state.pool(), state.events()).add(user.id, product_id, form.quantity).await {
        Ok(_) => flash_redirect(&session, "Item added to cart!", "/").await,
        Err(e) => flash_error(&session, e, "/").await,
    }
}

/// Drop the line and put its units back in stock.
pub async fn remove_from_cart(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<i64>,
) -> AppResult<Redirect> {
    match CartService::new(state.pool(), state.events()).remove(user.id, product_id).await {
        Ok(_) => flash_redirect(&session, "Item removed from cart.", "/cart").await,
        Err(e) => flash_error(&session, e, "/cart").await,
    }
}

pub async fn view_cart(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Page<CartPage>>> {
    let cart = CartService::new(state.pool(), state.events()).view(user.id).await?;
    let total = cart.total()?;
    let page = CartPage {
        items: cart.lines().iter().map(CartLineView::try_from).collect::<Result<_, _>>()?,
        item_count: cart.item_count(),
        total: format_price(total),
        total_cents: total.cents()?,
    };
    render(&session, Some(user), page).await
}

/// Price the current cart with an optional coupon and shipping estimate.
///
/// Nothing is persisted. Unknown coupons answer 400.
pub async fn quote(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<QuoteForm>,
) -> AppResult<Json<Page<QuotePage>>> {
    let coupon = match form.coupon.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => Some(
            code.parse::<Coupon>()
                .map_err(|()| ShopError::Validation("Invalid coupon code.".into()))?,
        ),
        None => None,
    };

    let cart = CartService::new(state.pool(), state.events()).view(user.id).await?;
    if cart.is_empty() {
        return Err(ShopError::EmptyCart.into());
    }

    let shipping = pricing::shipping_cost(
        form.distance_km.unwrap_or(Decimal::ZERO),
        form.weight_kg.unwrap_or(Decimal::ZERO),
    )?;
    let quote = pricing::quote(cart.total()?, coupon, shipping, state.config().tax_rate_percent)?;
    let display_total = format_price(quote.total);
    render(&session, Some(user), QuotePage { quote, display_total }).await
}
