//! Repair prices using decimal arithmetic.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`Price`] from form input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("price must be a number")]
    NotANumber,
    /// The input is below zero.
    #[error("price cannot be negative")]
    Negative,
}

/// The price quoted for a repair, in the shop's currency.
///
/// The backend stores prices as floating point numbers and exchanges them as
/// JSON numbers. They are held here as [`Decimal`] and converted only at the
/// wire boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The amount as a decimal.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Parse a price typed into a form.
    ///
    /// A lone comma is accepted as the decimal separator (`"1500,50"`).
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] if the text is not a non-negative number.
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let trimmed = input.trim();
        let normalized = if trimmed.contains(',') && !trimmed.contains('.') {
            trimmed.replacen(',', ".", 1)
        } else {
            trimmed.to_string()
        };

        let amount = Decimal::from_str(&normalized).map_err(|_| PriceError::NotANumber)?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_form_input() {
        assert_eq!(Price::parse("1500").unwrap().to_string(), "1500.00");
        assert_eq!(Price::parse(" 1500.5 ").unwrap().to_string(), "1500.50");
        assert_eq!(Price::parse("1500,5").unwrap().to_string(), "1500.50");
        assert_eq!(Price::parse("abc"), Err(PriceError::NotANumber));
        assert_eq!(Price::parse("-3"), Err(PriceError::Negative));
    }

    #[test]
    fn test_wire_format_is_a_json_number() {
        let price: Price = serde_json::from_str("25000.0").unwrap();
        assert_eq!(price.to_string(), "25000.00");

        let json = serde_json::to_string(&Price::parse("99.9").unwrap()).unwrap();
        assert_eq!(json, "99.9");
    }

    #[test]
    fn test_integer_json_number() {
        let price: Price = serde_json::from_str("1200").unwrap();
        assert_eq!(price, Price::parse("1200").unwrap());
    }
}
