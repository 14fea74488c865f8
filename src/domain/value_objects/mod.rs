//! Value Objects for the storefront

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ShopError;

/// Username value object
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    pub const MAX_LEN: usize = 80;

    pub fn new(value: impl Into<String>) -> Result<Self, ShopError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(ShopError::Validation("Username cannot be empty.".into()));
        }
        if value.chars().count() > Self::MAX_LEN {
            return Err(ShopError::Validation("Username is too long.".into()));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Money value object, held to the cent.
///
/// Arithmetic that can grow an amount is checked and fails with
/// [`ShopError::Validation`] instead of overflowing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(Decimal);

fn too_large() -> ShopError {
    ShopError::Validation("Amount is too large.".into())
}

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Rounds half away from zero to two decimal places.
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Whole cents, failing when the amount does not fit an `i64`.
    pub fn cents(&self) -> Result<i64, ShopError> {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.to_i64())
            .ok_or_else(too_large)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(&self, other: Money) -> Result<Money, ShopError> {
        self.0.checked_add(other.0).map(Money).ok_or_else(too_large)
    }

    /// Subtraction that stops at zero.
    pub fn saturating_sub(&self, other: Money) -> Money {
        Money((self.0 - other.0).max(Decimal::ZERO))
    }

    pub fn checked_multiply(&self, qty: i64) -> Result<Money, ShopError> {
        self.0.checked_mul(Decimal::from(qty)).map(Money).ok_or_else(too_large)
    }

    /// `percent` of this amount, e.g. `percent(7.5)` of $10.00 is $0.75.
    pub fn percent(&self, percent: Decimal) -> Result<Money, ShopError> {
        self.0
            .checked_mul(percent)
            .map(|scaled| Money::new(scaled / Decimal::ONE_HUNDRED))
            .ok_or_else(too_large)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_sign_negative() && !self.0.is_zero() {
            write!(f, "-${:.2}", self.0.abs())
        } else {
            write!(f, "${:.2}", self.0)
        }
    }
}

/// Positive item count for cart lines and stock movements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quantity(i64);

impl Quantity {
    /// Largest count accepted in one cart or stock movement.
    pub const MAX: i64 = 1_000_000;

    pub fn new(value: i64) -> Result<Self, ShopError> {
        if value <= 0 {
            return Err(ShopError::InvalidQuantity);
        }
        if value > Self::MAX {
            return Err(ShopError::Validation("Quantity is too large.".into()));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_trims() {
        let name = Username::new("  alice ").unwrap();
        assert_eq!(name.as_str(), "alice");
    }

    #[test]
    fn test_username_rejects_blank_and_long() {
        assert!(Username::new("   ").is_err());
        assert!(Username::new("x".repeat(81)).is_err());
        assert!(Username::new("x".repeat(80)).is_ok());
    }

    #[test]
    fn test_money_display_and_cents() {
        let price = Money::from_cents(1999);
        assert_eq!(price.to_string(), "$19.99");
        assert_eq!(price.checked_multiply(3).unwrap().cents().unwrap(), 5997);
        assert_eq!(Money::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_money_percent_rounds_to_cents() {
        let amount = Money::from_cents(1001);
        assert_eq!(amount.percent(Decimal::new(75, 1)).unwrap().cents().unwrap(), 75);
        assert_eq!(Money::from_cents(500).saturating_sub(Money::from_cents(900)), Money::ZERO);
    }

    #[test]
    fn test_quantity_must_be_positive() {
        assert!(matches!(Quantity::new(0), Err(ShopError::InvalidQuantity)));
        assert!(matches!(Quantity::new(-3), Err(ShopError::InvalidQuantity)));
        assert_eq!(Quantity::new(4).unwrap().value(), 4);
        assert!(matches!(Quantity::new(Quantity::MAX + 1), Err(ShopError::Validation(_))));
    }

    #[test]
    fn test_money_overflow_is_an_error() {
        let huge = Money::from_cents(i64::MAX);
        assert!(matches!(huge.checked_multiply(1_000_000_000_000), Err(ShopError::Validation(_))));
        assert!(Money::new(Decimal::MAX).checked_add(Money::new(Decimal::MAX)).is_err());
        assert!(Money::new(Decimal::MAX).percent(Decimal::from(200)).is_err());
    }

    #[test]
    fn test_cents_never_clamps() {
        let amount = Money::new(Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0));
        assert_eq!(amount.cents().unwrap_err().to_string(), "Amount is too large.");
        assert_eq!(Money::from_cents(i64::MAX).cents().unwrap(), i64::MAX);
    }
}
