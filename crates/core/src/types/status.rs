//! Order status.
//!
//! Orders start `active` and move to `complete` when checked out. Only
//! `active` orders accept new line items.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status string that is neither `active` nor `complete`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Status must be either 'active' or 'complete'")]
pub struct OrderStatusError;

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Open order that still accepts line items.
    #[default]
    Active,
    /// Checked-out order; line items are frozen.
    Complete,
}

impl OrderStatus {
    /// The stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Complete => "complete",
        }
    }

    /// Whether line items may still be added.
    #[must_use]
    pub const fn accepts_items(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = OrderStatusError;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "complete" => Ok(Self::Complete),
            _ => Err(OrderStatusError),
        }
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <str as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(raw.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_exact() {
        assert_eq!("active".parse::<OrderStatus>().unwrap(), OrderStatus::Active);
        assert_eq!(
            "complete".parse::<OrderStatus>().unwrap(),
            OrderStatus::Complete
        );
        for bad in ["Active", "COMPLETE", "completed", "", " active"] {
            assert_eq!(bad.parse::<OrderStatus>(), Err(OrderStatusError));
        }
    }

    #[test]
    fn test_only_active_accepts_items() {
        assert!(OrderStatus::Active.accepts_items());
        assert!(!OrderStatus::Complete.accepts_items());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Complete).unwrap(),
            "\"complete\""
        );
        let status: OrderStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(status, OrderStatus::Active);
    }
}
