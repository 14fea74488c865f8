//! Checkout and order history.

use axum::{extract::State, response::Redirect, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_sessions::Session;

use super::{flash_error, flash_redirect, render, Page};
use crate::db::OrderRepository;
use crate::domain::aggregates::{Order, OrderItem};
use crate::domain::pricing::format_price;
use crate::error::AppResult;
use crate::middleware::RequireUser;
use crate::services::CheckoutService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: i64,
    pub reference: String,
    pub items: Vec<OrderItem>,
    pub total: String,
    pub total_cents: i64,
    pub loyalty_points: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            total: format_price(order.total()),
            loyalty_points: order.loyalty_points(),
            id: order.id,
            reference: order.reference,
            total_cents: order.total_cents,
            created_at: order.created_at,
            items: order.items.0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrdersPage {
    pub orders: Vec<OrderView>,
}

pub async fn checkout(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Redirect> {
    match CheckoutService::new(state.pool(), state.events()).checkout(user.id).await {
        Ok(_) => flash_redirect(&session, "Order placed successfully!", "/orders").await,
        Err(e) => flash_error(&session, e, "/").await,
    }
}

pub async fn order_history(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Page<OrdersPage>>> {
    let orders = OrderRepository::new(state.pool()).list_for_user(user.id).await?;
    let orders = orders.into_iter().map(OrderView::from).collect();
    render(&session, Some(user), OrdersPage { orders }).await
}
