//! Product Aggregate

use serde::Serialize;

use crate::domain::value_objects::{Money, Quantity};
use crate::ShopError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
    pub description: Option<String>,
    pub stock: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum StockStatus {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl Product {
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Checks a reservation against the stock held in this snapshot.
    pub fn check_available(&self, qty: Quantity) -> Result<(), ShopError> {
        if qty.value() > self.stock {
            return Err(ShopError::InsufficientStock { available: self.stock, requested: qty.value() });
        }
        Ok(())
    }

    pub fn stock_status(&self, low_threshold: i64) -> StockStatus {
        match self.stock {
            s if s <= 0 => StockStatus::OutOfStock,
            s if s <= low_threshold => StockStatus::LowStock,
            _ => StockStatus::InStock,
        }
    }
}

/// Validated input for a new catalog entry.
#[derive(Clone, Debug)]
pub struct NewProduct {
    name: String,
    price: Money,
    description: Option<String>,
    stock: i64,
}

impl NewProduct {
    pub const MAX_NAME_LEN: usize = 100;
    /// $1,000,000.00
    pub const MAX_PRICE_CENTS: i64 = 100_000_000;
    pub const MAX_STOCK: i64 = 1_000_000;

    pub fn new(name: impl Into<String>, price: Money, description: Option<String>, stock: i64) -> Result<Self, ShopError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ShopError::Validation("Product name cannot be empty.".into()));
        }
        if name.chars().count() > Self::MAX_NAME_LEN {
            return Err(ShopError::Validation("Product name is too long.".into()));
        }
        if price.amount().is_sign_negative() && !price.is_zero() {
            return Err(ShopError::Validation("Price cannot be negative.".into()));
        }
        match price.cents() {
            Ok(cents) if cents <= Self::MAX_PRICE_CENTS => {}
            _ => return Err(ShopError::Validation("Price must be a valid amount.".into())),
        }
        if stock < 0 {
            return Err(ShopError::Validation("Stock cannot be negative.".into()));
        }
        if stock > Self::MAX_STOCK {
            return Err(ShopError::Validation("Stock is too large.".into()));
        }
        let description = description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());
        Ok(Self { name, price, description, stock })
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn price(&self) -> Money { self.price }
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }
    pub fn stock(&self) -> i64 { self.stock }
}
