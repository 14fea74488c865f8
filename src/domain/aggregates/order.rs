//! Order Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::aggregates::Cart;
use crate::domain::pricing;
use crate::domain::value_objects::Money;
use crate::ShopError;

/// Snapshot of one purchased line, priced at checkout time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: i64,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl OrderItem {
    pub fn line_total(&self) -> Result<Money, ShopError> {
        Money::from_cents(self.unit_price_cents).checked_multiply(self.quantity)
    }
}

/// A placed order. Rows are never updated or deleted.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub reference: String,
    pub user_id: i64,
    pub items: Json<Vec<OrderItem>>,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn items(&self) -> &[OrderItem] { &self.items.0 }
    pub fn total(&self) -> Money { Money::from_cents(self.total_cents) }
    pub fn loyalty_points(&self) -> i64 { pricing::loyalty_points(self.total()) }
}

/// An order built from a cart, not yet persisted.
#[derive(Clone, Debug)]
pub struct NewOrder {
    pub reference: Uuid,
    pub user_id: i64,
    pub items: Vec<OrderItem>,
    pub total: Money,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn from_cart(cart: &Cart) -> Result<Self, ShopError> {
        if cart.is_empty() {
            return Err(ShopError::EmptyCart);
        }
        let total = cart.total()?;
        let items = cart
            .lines()
            .iter()
            .map(|l| OrderItem {
                product_id: l.product_id,
                name: l.name.clone(),
                unit_price_cents: l.unit_price_cents,
                quantity: l.quantity,
            })
            .collect();
        Ok(Self {
            reference: Uuid::new_v4(),
            user_id: cart.user_id(),
            items,
            total,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::PricedLine;

    #[test]
    fn test_order_from_cart() {
        let cart = Cart::from_lines(
            3,
            vec![
                PricedLine { product_id: 1, name: "Widget".into(), unit_price_cents: 1000, quantity: 2 },
                PricedLine { product_id: 2, name: "Gadget".into(), unit_price_cents: 550, quantity: 1 },
            ],
        );
        let order = NewOrder::from_cart(&cart).unwrap();
        assert_eq!(order.user_id, 3);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total.cents().unwrap(), 2550);
        let summed = order.items.iter().try_fold(Money::ZERO, |acc, i| acc.checked_add(i.line_total()?)).unwrap();
        assert_eq!(summed, order.total);
    }

    #[test]
    fn test_empty_cart_cannot_be_ordered() {
        let err = NewOrder::from_cart(&Cart::new(1)).unwrap_err();
        assert!(matches!(err, ShopError::EmptyCart));
    }

    #[test]
    fn test_cart_too_large_to_order() {
        let cart = Cart::from_lines(
            1,
            vec![PricedLine { product_id: 1, name: "Yacht".into(), unit_price_cents: i64::MAX, quantity: 1_000_000_000_000 }],
        );
        assert!(matches!(NewOrder::from_cart(&cart), Err(ShopError::Validation(_))));
    }
}
