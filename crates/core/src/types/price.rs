//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog prices are stored as `NUMERIC(12, 2)` and must be strictly positive.
//! Amounts the column would round or overflow are rejected up front, so a
//! stored price always reads back exactly as it was written.
//! On the wire a price is a JSON number (`15`, `4.99`); decimal strings are
//! accepted on input as well.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors that can occur when constructing a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// Zero or negative amount.
    #[error("Price must be a positive number")]
    NotPositive,
    /// More than two decimal places.
    #[error("Price must have at most two decimal places")]
    TooPrecise,
    /// At or above the column limit.
    #[error("Price must be less than 10000000000")]
    TooLarge,
}

/// Exclusive upper bound imposed by `NUMERIC(12, 2)`.
const MAX_EXCLUSIVE: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);
const MAX_SCALE: u32 = 2;

/// A strictly positive catalog price.
///
/// ```
/// use rust_decimal::Decimal;
/// use tinystore_core::Price;
///
/// assert!(Price::new(Decimal::new(1599, 2)).is_ok());
/// assert!(Price::new(Decimal::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotPositive` if `amount <= 0`,
    /// `PriceError::TooPrecise` if it has more than two significant decimal
    /// places, and `PriceError::TooLarge` if it is `10^10` or more.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }
        if amount.normalize().scale() > MAX_SCALE {
            return Err(PriceError::TooPrecise);
        }
        if amount >= MAX_EXCLUSIVE {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(Price::new(Decimal::ZERO), Err(PriceError::NotPositive));
        assert_eq!(Price::new(Decimal::new(-1, 0)), Err(PriceError::NotPositive));
    }

    #[test]
    fn test_serializes_as_number() {
        let price = Price::new(Decimal::new(15, 0)).unwrap();
        let value = serde_json::to_value(price).unwrap();
        assert!(value.is_number());
        assert!((value.as_f64().unwrap() - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_deserializes_numbers_and_strings() {
        let from_number: Price = serde_json::from_str("4.99").unwrap();
        let from_string: Price = serde_json::from_str("\"4.99\"").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(from_number.amount(), Decimal::new(499, 2));
    }

    #[test]
    fn test_deserialize_rejects_non_positive() {
        let err = serde_json::from_str::<Price>("0").unwrap_err();
        assert!(err.to_string().contains("Price must be a positive number"));
    }

    #[test]
    fn test_rejects_amounts_the_column_would_round() {
        for raw in ["0.001", "1.005", "19.999"] {
            let amount: Decimal = raw.parse().unwrap();
            assert_eq!(Price::new(amount), Err(PriceError::TooPrecise), "{raw}");
        }
        // Trailing zeros are not extra precision
        assert!(Price::new("15.100".parse().unwrap()).is_ok());
    }

    #[test]
    fn test_rejects_amounts_the_column_cannot_hold() {
        assert_eq!(
            Price::new(Decimal::new(1_000_000_000_000, 0)),
            Err(PriceError::TooLarge)
        );
        assert_eq!(
            Price::new(Decimal::new(10_000_000_000, 0)),
            Err(PriceError::TooLarge)
        );
        assert!(Price::new(Decimal::new(999_999_999_999, 2)).is_ok());
    }

    #[test]
    fn test_max_bound_is_ten_billion() {
        assert_eq!(MAX_EXCLUSIVE, Decimal::new(10_000_000_000, 0));
    }

    #[test]
    fn test_deserialize_rejects_three_decimals() {
        let err = serde_json::from_str::<Price>("1.005").unwrap_err();
        assert!(err.to_string().contains("at most two decimal places"));
    }

    #[test]
    fn test_display_normalizes() {
        let price = Price::new(Decimal::new(1500, 2)).unwrap();
        assert_eq!(price.to_string(), "15");
    }
}
