//! Cart Aggregate

use serde::Serialize;

use crate::domain::value_objects::Money;
use crate::ShopError;

/// A stored cart row: one per (user, product).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CartLine {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

/// A cart line joined with the product's current name and price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct PricedLine {
    pub product_id: i64,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl PricedLine {
    pub fn unit_price(&self) -> Money { Money::from_cents(self.unit_price_cents) }
    pub fn line_total(&self) -> Result<Money, ShopError> { self.unit_price().checked_multiply(self.quantity) }
}

#[derive(Clone, Debug)]
pub struct Cart {
    user_id: i64,
    lines: Vec<PricedLine>,
}

impl Cart {
    pub fn new(user_id: i64) -> Self {
        Self { user_id, lines: vec![] }
    }

    pub fn from_lines(user_id: i64, lines: impl IntoIterator<Item = PricedLine>) -> Self {
        let mut cart = Self::new(user_id);
        for line in lines {
            cart.add_line(line);
        }
        cart
    }

    pub fn user_id(&self) -> i64 { self.user_id }
    pub fn lines(&self) -> &[PricedLine] { &self.lines }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    /// Total units across all lines.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Lines for the same product merge into one.
    pub fn add_line(&mut self, line: PricedLine) {
        if let Some(existing) = self.lines.iter_mut().find(|l| l.product_id == line.product_id) {
            existing.quantity += line.quantity;
        } else {
            self.lines.push(line);
        }
    }

    /// Fails when the sum does not fit in a [`Money`].
    pub fn total(&self) -> Result<Money, ShopError> {
        self.lines.iter().try_fold(Money::ZERO, |acc, l| acc.checked_add(l.line_total()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: i64, cents: i64, quantity: i64) -> PricedLine {
        PricedLine { product_id, name: format!("P{product_id}"), unit_price_cents: cents, quantity }
    }

    #[test]
    fn test_cart_operations() {
        let mut cart = Cart::new(7);
        cart.add_line(line(1, 1000, 2));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total().unwrap().cents().unwrap(), 2000);
        cart.add_line(line(1, 1000, 1));
        assert_eq!(cart.lines()[0].quantity, 3); // Merged
        cart.add_line(line(2, 250, 4));
        assert_eq!(cart.item_count(), 7);
        assert_eq!(cart.total().unwrap().cents().unwrap(), 4000);
    }

    #[test]
    fn test_empty_cart_totals_zero() {
        let cart = Cart::from_lines(1, vec![]);
        assert!(cart.is_empty());
        assert!(cart.total().unwrap().is_zero());
    }

    #[test]
    fn test_oversized_total_is_an_error() {
        let cart = Cart::from_lines(1, vec![line(1, i64::MAX, 1_000_000_000_000), line(2, 100, 1)]);
        assert!(matches!(cart.lines()[0].line_total(), Err(ShopError::Validation(_))));
        assert_eq!(cart.total().unwrap_err().to_string(), "Amount is too large.");
    }
}
