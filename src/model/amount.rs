//! Amount type for monetary configuration values.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! may or may not include a dollar sign and commas. In a JSON configuration file an amount can be
//! written either as a plain number, `4000`, or as a string, `"$4,000.00"`.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents a dollar amount.
///
/// # Examples
///
/// ```
/// # use paystub::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("$4,000.00").unwrap();
/// let b = Amount::from_str("4000").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "$4,000.00");
/// assert_eq!(a.as_f64(), 4000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Creates an Amount from a float. Non-finite values become zero.
    pub fn from_f64(value: f64) -> Self {
        Self::new(Decimal::from_f64(value).unwrap_or_default())
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns the value as a float for use in the paycheck computations.
    pub fn as_f64(&self) -> f64 {
        self.value.to_f64().unwrap_or_default()
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value.is_sign_negative()
    }
}

/// An error that can occur when parsing strings into `Decimal` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // "-$50.00", "$50.00", "-50.00" and "50.00" are all accepted
        let without_dollar = if let Some(after_minus) = trimmed.strip_prefix('-') {
            match after_minus.strip_prefix('$') {
                Some(after_dollar) => format!("-{after_dollar}"),
                None => trimmed.to_string(),
            }
        } else if let Some(after_dollar) = trimmed.strip_prefix('$') {
            after_dollar.to_string()
        } else {
            trimmed.to_string()
        };

        let without_commas = without_dollar.replace(',', "");
        let value = Decimal::from_str(&without_commas).map_err(AmountError)?;
        Ok(Amount::new(value))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let num = self.value.abs().to_f64().unwrap_or_default();
        write!(f, "{sign}${}", format_num::format_num!(",.2", num))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Decimal::from_f64(n)
                .map(Amount::new)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid amount {n}"))),
            Raw::Text(s) => Amount::from_str(&s).map_err(serde::de::Error::custom),
        }
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_dollar_sign_and_commas() {
        let amount = Amount::from_str("$1,234,567.89").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("1234567.89").unwrap());
    }

    #[test]
    fn test_parse_negative_with_dollar_sign() {
        let amount = Amount::from_str("-$50.00").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("-50.00").unwrap());
        assert!(amount.is_negative());
    }

    #[test]
    fn test_parse_empty_string_is_zero() {
        let amount = Amount::from_str("  ").unwrap();
        assert!(amount.is_zero());
        assert!(!amount.is_negative());
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(Amount::from_str("$12x").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::from_f64(96_000.5).to_string(), "$96,000.50");
        assert_eq!(Amount::from_f64(-60.0).to_string(), "-$60.00");
        assert_eq!(Amount::default().to_string(), "$0.00");
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let amounts: Vec<Amount> = serde_json::from_str(r#"[4000, 4000.25, "$4,000.25"]"#).unwrap();
        assert_eq!(amounts[0].as_f64(), 4000.0);
        assert_eq!(amounts[1], amounts[2]);
    }

    #[test]
    fn test_deserialize_bad_string() {
        let res: Result<Amount, _> = serde_json::from_str(r#""four thousand""#);
        assert!(res.is_err());
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&Amount::from_f64(50.0)).unwrap();
        assert_eq!(json, "\"$50.00\"");
    }
}
