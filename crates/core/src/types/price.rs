//! Decimal money and size values.
//!
//! The catalog and order documents carry prices and sizes as plain JSON
//! numbers (`"basePrice": 49.99`, `"size": 9.5`). Both types keep a
//! [`Decimal`] internally so totals are exact, and (de)serialize through
//! `rust_decimal::serde::float` to keep the numeric wire format.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A price in the store currency's standard unit (e.g., dollars, not cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of currency units.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Rounded to whole cents, halves away from zero.
    ///
    /// Amounts a client summed in floating point (`44.849999999999994`)
    /// settle to the intended value here.
    #[must_use]
    pub fn to_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        self.times(quantity)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(Self)
    }
}

/// A garment or shoe size option (e.g., `9`, `9.5`, `42`).
///
/// Equality is numeric, so `9` and `9.0` are the same size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Size(Decimal);

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// The underlying decimal value.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

impl From<u32> for Size {
    fn from(value: u32) -> Self {
        Self(Decimal::from(value))
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl std::str::FromStr for Size {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<Decimal>().map(Self)
    }
}

impl Serialize for Size {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Size {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_reads_json_numbers() {
        let price: Price = serde_json::from_str("49.99").unwrap();
        assert_eq!(price.amount(), Decimal::new(4999, 2));

        let whole: Price = serde_json::from_str("20").unwrap();
        assert_eq!(whole, Price::from_units(20));
    }

    #[test]
    fn test_price_writes_json_number() {
        let json = serde_json::to_string(&Price::from_units(55)).unwrap();
        assert_eq!(json.parse::<f64>().unwrap(), 55.0);
    }

    #[test]
    fn test_float_sums_settle_to_cents() {
        let summed: Price = serde_json::from_str("44.849999999999994").unwrap();
        assert_eq!(summed.to_cents(), Price::new(Decimal::new(4485, 2)));

        let tenths: Price = serde_json::from_str("0.30000000000000004").unwrap();
        assert_eq!(tenths.to_cents(), Price::new(Decimal::new(30, 2)));

        assert_eq!(
            Price::new(Decimal::new(1005, 3)).to_cents(),
            Price::new(Decimal::new(101, 2))
        );
    }

    #[test]
    fn test_price_arithmetic() {
        let total: Price = [Price::from_units(20) * 2, Price::from_units(15)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_units(55));
    }

    #[test]
    fn test_price_display() {
        assert_eq!(Price::new(Decimal::new(1050, 2)).to_string(), "$10.50");
    }

    #[test]
    fn test_size_numeric_equality() {
        let a: Size = serde_json::from_str("9").unwrap();
        let b: Size = "9.0".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(Size::from(9), a);
        assert_eq!("9.5".parse::<Size>().unwrap().to_string(), "9.5");
    }
}
