//! Pricing rules: discounts, tax, shipping and loyalty points.
//!
//! Every function here is pure; amounts are rounded to the cent.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

use crate::domain::value_objects::Money;
use crate::ShopError;

/// Flat shipping charge before distance and weight.
const SHIPPING_BASE_CENTS: i64 = 500;
/// Dollars per kilometre.
const SHIPPING_PER_KM: Decimal = Decimal::from_parts(50, 0, 0, false, 2);
/// Dollars per kilogram.
const SHIPPING_PER_KG: Decimal = Decimal::from_parts(20, 0, 0, false, 2);
/// Dollars spent per loyalty point.
const DOLLARS_PER_POINT: i64 = 10;

/// Default tax rate, in percent.
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(75, 0, 0, false, 1);

/// Formats an amount for display, e.g. `$19.99`.
pub fn format_price(amount: Money) -> String {
    amount.to_string()
}

/// Applies a percentage discount. The result never drops below zero.
pub fn discounted(amount: Money, percent: Decimal) -> Result<Money, ShopError> {
    Ok(amount.saturating_sub(amount.percent(percent)?))
}

pub fn tax(amount: Money, rate_percent: Decimal) -> Result<Money, ShopError> {
    amount.percent(rate_percent)
}

/// `5.00 + 0.50 × km + 0.20 × kg`. Negative inputs count as zero.
pub fn shipping_cost(distance_km: Decimal, weight_kg: Decimal) -> Result<Money, ShopError> {
    let km = distance_km.max(Decimal::ZERO);
    let kg = weight_kg.max(Decimal::ZERO);
    let per_km = SHIPPING_PER_KM.checked_mul(km).map(Money::new);
    let per_kg = SHIPPING_PER_KG.checked_mul(kg).map(Money::new);
    match (per_km, per_kg) {
        (Some(per_km), Some(per_kg)) => Money::from_cents(SHIPPING_BASE_CENTS).checked_add(per_km)?.checked_add(per_kg),
        _ => Err(ShopError::Validation("Amount is too large.".into())),
    }
}

/// One point per whole ten dollars.
pub fn loyalty_points(total: Money) -> i64 {
    (total.amount() / Decimal::from(DOLLARS_PER_POINT))
        .floor()
        .to_i64()
        .unwrap_or(0)
        .max(0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Coupon {
    #[serde(rename = "SAVE10")]
    Save10,
    #[serde(rename = "DISCOUNT20")]
    Discount20,
    #[serde(rename = "FREESHIP")]
    FreeShipping,
}

impl Coupon {
    /// Percent taken off the subtotal.
    pub fn discount_percent(&self) -> Decimal {
        match self {
            Self::Save10 => Decimal::from(10),
            Self::Discount20 => Decimal::from(20),
            Self::FreeShipping => Decimal::ZERO,
        }
    }

    pub fn waives_shipping(&self) -> bool {
        matches!(self, Self::FreeShipping)
    }
}

impl FromStr for Coupon {
    type Err = ();

    /// Codes are case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SAVE10" => Ok(Self::Save10),
            "DISCOUNT20" => Ok(Self::Discount20),
            "FREESHIP" => Ok(Self::FreeShipping),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub subtotal: Money,
    pub discount: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
    pub coupon: Option<Coupon>,
}

/// Tax applies to the discounted subtotal, not to shipping.
pub fn quote(subtotal: Money, coupon: Option<Coupon>, shipping: Money, tax_rate: Decimal) -> Result<Quote, ShopError> {
    let after_discount = match coupon {
        Some(c) => discounted(subtotal, c.discount_percent())?,
        None => subtotal,
    };
    let discount = subtotal.saturating_sub(after_discount);
    let shipping = if coupon.is_some_and(|c| c.waives_shipping()) { Money::ZERO } else { shipping };
    let tax = tax(after_discount, tax_rate)?;
    Ok(Quote {
        subtotal,
        discount,
        shipping,
        tax,
        total: after_discount.checked_add(shipping)?.checked_add(tax)?,
        coupon,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_never_negative() {
        assert_eq!(discounted(Money::from_cents(1000), Decimal::from(25)).unwrap().cents().unwrap(), 750);
        assert_eq!(discounted(Money::from_cents(1000), Decimal::from(150)).unwrap(), Money::ZERO);
    }

    #[test]
    fn test_tax_default_rate() {
        assert_eq!(tax(Money::from_cents(2000), DEFAULT_TAX_RATE).unwrap().cents().unwrap(), 150);
    }

    #[test]
    fn test_shipping_formula() {
        assert_eq!(shipping_cost(Decimal::from(10), Decimal::from(5)).unwrap().cents().unwrap(), 1100);
        assert_eq!(shipping_cost(Decimal::from(-4), Decimal::ZERO).unwrap().cents().unwrap(), 500);
    }

    #[test]
    fn test_loyalty_points() {
        assert_eq!(loyalty_points(Money::from_cents(9999)), 9);
        assert_eq!(loyalty_points(Money::from_cents(10000)), 10);
        assert_eq!(loyalty_points(Money::ZERO), 0);
    }

    #[test]
    fn test_coupon_parse() {
        assert_eq!("save10".parse::<Coupon>(), Ok(Coupon::Save10));
        assert_eq!(" FREESHIP ".parse::<Coupon>(), Ok(Coupon::FreeShipping));
        assert!("BOGUS".parse::<Coupon>().is_err());
    }

    #[test]
    fn test_quote_with_coupons() {
        let subtotal = Money::from_cents(10000);
        let shipping = Money::from_cents(700);

        let q = quote(subtotal, Some(Coupon::Discount20), shipping, DEFAULT_TAX_RATE).unwrap();
        assert_eq!(q.discount.cents().unwrap(), 2000);
        assert_eq!(q.tax.cents().unwrap(), 600);
        assert_eq!(q.total.cents().unwrap(), 8000 + 700 + 600);

        let q = quote(subtotal, Some(Coupon::FreeShipping), shipping, DEFAULT_TAX_RATE).unwrap();
        assert!(q.shipping.is_zero());
        assert!(q.discount.is_zero());
        assert_eq!(q.total.cents().unwrap(), 10000 + 750);

        let q = quote(subtotal, None, shipping, DEFAULT_TAX_RATE).unwrap();
        assert_eq!(q.total.cents().unwrap(), 10000 + 700 + 750);
        assert_eq!(format_price(q.total), "$114.50");
    }

    #[test]
    fn test_huge_inputs_are_rejected() {
        let far = Decimal::MAX;
        let shipping = shipping_cost(far, far).and_then(|s| s.cents());
        assert!(matches!(shipping, Err(ShopError::Validation(_))));
        let huge = Money::new(Decimal::MAX);
        assert!(quote(huge, None, huge, DEFAULT_TAX_RATE).is_err());
    }
}
