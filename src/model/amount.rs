//! A non-negative dollar amount.
//!
//! Assistance is always recorded as a positive outflow (or inflow, for donations received). A
//! correction is a new entry, never a negative one, so `Amount` refuses to hold a negative value.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

/// Represents a non-negative dollar amount.
///
/// Parsing tolerates a leading dollar sign and thousands separators, which is how amounts arrive
/// from form inputs and from some older backend records.
///
/// ```
/// # use resource_tracker::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("$1,250.00").unwrap();
/// assert_eq!(amount.to_string(), "$1,250.00");
/// assert!(Amount::from_str("-5.00").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// The largest amount a single entry may record, one trillion dollars. Sums of any realistic
    /// number of entries stay well inside `Decimal`'s range.
    pub const MAX: Amount = Amount(Decimal::from_parts(3_567_587_328, 232, 0, false, 0));

    /// Creates an `Amount`, failing if `value` is negative or above `Amount::MAX`.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }
        if value > Self::MAX.0 {
            return Err(AmountError::TooLarge(value));
        }
        Ok(Self(value))
    }

    /// Creates an `Amount` from whole cents, saturating at `Amount::MAX`.
    pub fn from_cents(cents: u64) -> Self {
        Self(Decimal::from_i128_with_scale(i128::from(cents), 2).min(Self::MAX.0))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

/// An error that can occur when parsing or constructing an `Amount`.
#[derive(Clone, PartialEq, Eq)]
pub enum AmountError {
    Negative(Decimal),
    TooLarge(Decimal),
    Unparseable(String),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Negative(value) => write!(f, "must not be negative (got {value})"),
            AmountError::TooLarge(value) => {
                write!(f, "must not be more than {} (got {value})", Amount::MAX)
            }
            AmountError::Unparseable(s) => write!(f, "'{s}' is not a valid dollar amount"),
        }
    }
}

impl std::error::Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let digits = rest.strip_prefix('$').unwrap_or(rest).replace(',', "");
        // Only the one leading minus is a sign; Decimal would accept another.
        if digits.is_empty() || digits.starts_with(['-', '+']) {
            return Err(AmountError::Unparseable(s.to_string()));
        }
        let value =
            Decimal::from_str(&digits).map_err(|_| AmountError::Unparseable(s.to_string()))?;
        if negative {
            Amount::new(-value)
        } else {
            Amount::new(value)
        }
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${}",
            format_num::format_num!(",.2", self.0.to_f64().unwrap_or_default())
        )
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // The backend stores amounts as JSON numbers.
        serializer.serialize_f64(self.0.to_f64().unwrap_or_default())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative number or a dollar amount string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Amount::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Amount::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        let value = Decimal::from_f64(v)
            .ok_or_else(|| E::custom(format!("{v} cannot be represented as an amount")))?;
        Amount::new(value.round_dp(2)).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::from_str(v).map_err(E::custom)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_dollar_sign_and_commas() {
        let amount = Amount::from_str("$1,050.25").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("1050.25").unwrap());
    }

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str(" 42 ").unwrap();
        assert_eq!(amount.value(), Decimal::from(42));
    }

    #[test]
    fn test_parse_negative_is_rejected() {
        assert_eq!(
            Amount::from_str("-$50.00"),
            Err(AmountError::Negative(Decimal::from_str("-50.00").unwrap()))
        );
        assert!(Amount::from_str("-3").is_err());
    }

    #[test]
    fn test_parse_doubled_sign_is_rejected() {
        for input in ["--5", "-$-5", "$-5", "-+5", "+5"] {
            assert!(
                matches!(Amount::from_str(input), Err(AmountError::Unparseable(_))),
                "{input} should not parse"
            );
        }
    }

    #[test]
    fn test_above_max_is_rejected() {
        assert_eq!(Amount::MAX.value(), Decimal::from(1_000_000_000_000u64));
        assert!(Amount::from_str("1000000000000").is_ok());
        assert!(matches!(
            Amount::from_str("1000000000000.01"),
            Err(AmountError::TooLarge(_))
        ));
        assert!(matches!(
            Amount::from_str("79228162514264337593543950335"),
            Err(AmountError::TooLarge(_))
        ));
        assert!(serde_json::from_str::<Amount>("1e20").is_err());
    }

    #[test]
    fn test_from_cents_saturates() {
        assert_eq!(Amount::from_cents(u64::MAX), Amount::MAX);
        assert_eq!(Amount::from_cents(12_345).value(), Decimal::new(12_345, 2));
    }

    #[test]
    fn test_parse_negative_zero_is_zero() {
        let amount = Amount::from_str("-0.00").unwrap();
        assert!(amount.is_zero());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            Amount::from_str("twelve"),
            Err(AmountError::Unparseable(_))
        ));
        assert!(matches!(Amount::from_str(""), Err(AmountError::Unparseable(_))));
        assert!(matches!(Amount::from_str("$"), Err(AmountError::Unparseable(_))));
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::from_cents(6_000_000).to_string(), "$60,000.00");
        assert_eq!(Amount::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&Amount::from_cents(1999)).unwrap();
        assert_eq!(json, "19.99");
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let a: Amount = serde_json::from_str("125.5").unwrap();
        assert_eq!(a.value(), Decimal::from_str("125.5").unwrap());
        let b: Amount = serde_json::from_str("\"$1,000\"").unwrap();
        assert_eq!(b.value(), Decimal::from(1000));
        let c: Amount = serde_json::from_str("80").unwrap();
        assert_eq!(c.value(), Decimal::from(80));
    }

    #[test]
    fn test_deserialize_negative_fails() {
        assert!(serde_json::from_str::<Amount>("-12.5").is_err());
        assert!(serde_json::from_str::<Amount>("\"-$1\"").is_err());
    }
}
